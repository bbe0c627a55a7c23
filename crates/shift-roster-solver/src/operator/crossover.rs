// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::err::{InvalidParameterError, NotInitializedError, OperatorError};
use crate::operator::Operator;
use rand::Rng;
use shift_roster_model::prelude::Solution;

/// Uniform block crossover of two parents: the child starts as a clone of
/// the first parent; walking the days left to right, alternating blocks of
/// randomly drawn length are either kept or overwritten column-wise with
/// the second parent.
///
/// The child may violate coverage and carries no evaluation; the memetic
/// loop reconstructs and improves it afterwards.
pub struct BlockCrossover<'p, R> {
    rng: R,
    block_sizes: Vec<usize>,
    parent1: Option<Solution<'p>>,
    parent2: Option<Solution<'p>>,
    child: Option<Solution<'p>>,
    done: bool,
}

impl<'p, R> BlockCrossover<'p, R>
where
    R: Rng,
{
    pub fn new(rng: R, block_sizes: Vec<usize>) -> Result<Self, InvalidParameterError> {
        if block_sizes.is_empty() || block_sizes.iter().any(|size| *size < 1) {
            return Err(InvalidParameterError::new(
                "block_sizes",
                "must be non-empty with sizes of at least 1",
            ));
        }
        Ok(Self {
            rng,
            block_sizes,
            parent1: None,
            parent2: None,
            child: None,
            done: false,
        })
    }

    fn cross(&mut self) -> Solution<'p> {
        let parent1 = self.parent1.as_ref().expect("crossover initialized");
        let parent2 = self.parent2.as_ref().expect("crossover initialized");
        let mut child = parent1.clone();
        child.invalidate_evaluation();

        let days = child.num_days();
        let employees = child.num_employees();
        let mut copy_block = false;
        let mut start_day = 0;
        while start_day < days {
            let block_size = self.block_sizes[self.rng.random_range(0..self.block_sizes.len())];
            if copy_block {
                let end = days.min(start_day + block_size);
                for day in start_day..end {
                    for employee in 0..employees {
                        child.set_assignment(day, employee, parent2.assignment(day, employee));
                    }
                }
            }
            start_day += block_size;
            copy_block = !copy_block;
        }
        child
    }
}

impl<'p, R> Operator<'p> for BlockCrossover<'p, R>
where
    R: Rng,
{
    fn name(&self) -> &str {
        "BlockCrossover"
    }

    fn init(&mut self, mut seeds: Vec<Solution<'p>>) -> Result<(), OperatorError> {
        if seeds.len() != 2 {
            return Err(InvalidParameterError::new(
                "seeds",
                "crossover expects exactly two parent solutions",
            )
            .into());
        }
        self.parent2 = Some(seeds.pop().expect("two seeds"));
        self.parent1 = Some(seeds.pop().expect("two seeds"));
        self.child = None;
        self.done = false;
        Ok(())
    }

    fn next_step(&mut self) -> Result<bool, OperatorError> {
        if self.parent1.is_none() || self.parent2.is_none() {
            return Err(NotInitializedError::new("BlockCrossover").into());
        }
        self.child = Some(self.cross());
        self.done = true;
        Ok(false)
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn take_result(&mut self) -> Option<Solution<'p>> {
        if !self.done {
            return None;
        }
        self.child.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shift_roster_model::constraint::coverage::ShiftCoverageConstraint;
    use shift_roster_model::prelude::{DayOfWeek, Problem, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(10, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", 14);
        for e in 0..4 {
            builder.add_employee(format!("E{}", e), c);
        }
        for day in 0..10 {
            builder.set_demand(s, day, 1);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    fn worked_by(problem: &Problem, employee: usize) -> Solution<'_> {
        let s = problem.shifts()[0].id();
        let mut solution = Solution::new(problem);
        for day in 0..problem.num_days() {
            solution.pop_unassigned_slot(day);
            solution.set_assignment(day, employee, Some(s));
        }
        solution
    }

    #[test]
    fn identical_parents_produce_an_assignment_equal_child() {
        let problem = problem();
        let parent = worked_by(&problem, 0);
        let rng = ChaCha8Rng::seed_from_u64(2);
        let mut crossover = BlockCrossover::new(rng, vec![1, 5, 7]).expect("valid block sizes");
        crossover
            .init(vec![parent.clone(), parent.clone()])
            .expect("two parents");
        crossover.run_to_completion().expect("crossover runs");

        let child = crossover.take_result().expect("result present");
        assert!(child.equal_assignments(&parent));
        assert!(!child.is_evaluated());
    }

    #[test]
    fn child_interleaves_both_parents() {
        let problem = problem();
        let parent1 = worked_by(&problem, 0);
        let parent2 = worked_by(&problem, 1);

        let rng = ChaCha8Rng::seed_from_u64(3);
        let mut crossover = BlockCrossover::new(rng, vec![1, 2]).expect("valid block sizes");
        crossover
            .init(vec![parent1.clone(), parent2.clone()])
            .expect("two parents");
        crossover.run_to_completion().expect("crossover runs");
        let child = crossover.take_result().expect("result present");

        // Every column comes from one of the parents.
        for day in 0..problem.num_days() {
            let from_parent1 = (0..4).all(|e| child.assignment(day, e) == parent1.assignment(day, e));
            let from_parent2 = (0..4).all(|e| child.assignment(day, e) == parent2.assignment(day, e));
            assert!(from_parent1 || from_parent2);
        }
        // With block sizes 1..2 over 10 days both parents contribute.
        assert!(!child.equal_assignments(&parent1));
        assert!(!child.equal_assignments(&parent2));
    }

    #[test]
    fn crossover_is_deterministic_for_a_seed() {
        let problem = problem();
        let parent1 = worked_by(&problem, 0);
        let parent2 = worked_by(&problem, 1);

        let mut children = Vec::new();
        for _ in 0..2 {
            let rng = ChaCha8Rng::seed_from_u64(1234);
            let mut crossover = BlockCrossover::new(rng, vec![1, 5, 7]).expect("valid block sizes");
            crossover
                .init(vec![parent1.clone(), parent2.clone()])
                .expect("two parents");
            crossover.run_to_completion().expect("crossover runs");
            children.push(crossover.take_result().expect("result present"));
        }
        assert!(children[0].equal_assignments(&children[1]));
    }

    #[test]
    fn wrong_parent_count_is_rejected() {
        let problem = problem();
        let parent = worked_by(&problem, 0);
        let rng = ChaCha8Rng::seed_from_u64(0);
        let mut crossover = BlockCrossover::new(rng, vec![1]).expect("valid block sizes");
        assert!(crossover.init(vec![parent]).is_err());
    }
}

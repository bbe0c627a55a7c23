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

use crate::descent::NeighborSelectionPolicy;
use crate::err::{InvalidParameterError, NotInitializedError};
use crate::neighborhood::SwapNeighborhood;
use rand::{Rng, SeedableRng};
use shift_roster_model::prelude::Solution;

/// Variable neighborhood descent over a ladder of swap block sizes.
///
/// The descent walks the ladder in order: whenever a neighborhood yields an
/// improving move the move is applied and the ladder resets to its first
/// rung; when a neighborhood is exhausted the descent climbs to the next
/// block size. It terminates once the last rung yields nothing.
///
/// The descent owns the solution while it runs; callers read it through
/// [`current`](VariableNeighborhoodDescent::current) and reclaim it with
/// [`take_solution`](VariableNeighborhoodDescent::take_solution).
pub struct VariableNeighborhoodDescent<'p, R> {
    block_sizes: Vec<usize>,
    policy: NeighborSelectionPolicy,
    rng: R,
    ladder_index: usize,
    neighborhood: Option<SwapNeighborhood<'p, R>>,
}

impl<'p, R> VariableNeighborhoodDescent<'p, R>
where
    R: Rng + SeedableRng,
{
    pub fn new(
        block_sizes: Vec<usize>,
        policy: NeighborSelectionPolicy,
        rng: R,
    ) -> Result<Self, InvalidParameterError> {
        if block_sizes.is_empty() {
            return Err(InvalidParameterError::new("block_sizes", "must not be empty"));
        }
        if block_sizes.iter().any(|size| *size < 1) {
            return Err(InvalidParameterError::new(
                "block_sizes",
                "every block size must be at least 1",
            ));
        }
        Ok(Self {
            block_sizes,
            policy,
            rng,
            ladder_index: 0,
            neighborhood: None,
        })
    }

    /// (Re)initializes the descent on a solution.
    pub fn init(&mut self, solution: Solution<'p>) {
        self.ladder_index = 0;
        self.neighborhood = Some(self.make_neighborhood(solution, 0));
    }

    fn make_neighborhood(
        &mut self,
        solution: Solution<'p>,
        ladder_index: usize,
    ) -> SwapNeighborhood<'p, R> {
        let child = R::from_rng(&mut self.rng);
        SwapNeighborhood::new(solution, self.block_sizes[ladder_index], true, Some(child))
            .expect("validated block sizes")
    }

    /// Performs one descent step. Returns `true` while more steps remain.
    pub fn next_step(&mut self) -> Result<bool, NotInitializedError> {
        if self.neighborhood.is_none() {
            return Err(NotInitializedError::new("VariableNeighborhoodDescent"));
        }
        if self.ladder_index >= self.block_sizes.len() {
            return Ok(false);
        }

        let improved = {
            let neighborhood = self.neighborhood.as_mut().expect("descent initialized");
            match self.policy {
                NeighborSelectionPolicy::FirstImproving => {
                    if neighborhood.next_neighbor_evaluation().is_some() {
                        neighborhood
                            .move_to_last_evaluated_neighbor()
                            .expect("neighbor was just evaluated");
                        true
                    } else {
                        false
                    }
                }
                NeighborSelectionPolicy::BestImproving => neighborhood.move_to_best_neighbor(),
            }
        };

        if improved {
            if self.ladder_index != 0 {
                self.ladder_index = 0;
                self.rebuild_neighborhood();
            }
            Ok(true)
        } else {
            self.ladder_index += 1;
            if self.ladder_index < self.block_sizes.len() {
                self.rebuild_neighborhood();
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }

    fn rebuild_neighborhood(&mut self) {
        let ladder_index = self.ladder_index;
        let solution = self
            .neighborhood
            .take()
            .expect("descent initialized")
            .into_origin();
        self.neighborhood = Some(self.make_neighborhood(solution, ladder_index));
    }

    /// `true` once the ladder is exhausted (or before `init`).
    #[inline]
    pub fn is_done(&self) -> bool {
        self.neighborhood.is_none() || self.ladder_index >= self.block_sizes.len()
    }

    /// The solution the descent is currently improving.
    #[inline]
    pub fn current(&self) -> Option<&Solution<'p>> {
        self.neighborhood.as_ref().map(|n| n.origin())
    }

    /// Moves the solution out of the descent; `init` must run again before
    /// further stepping.
    #[inline]
    pub fn take_solution(&mut self) -> Option<Solution<'p>> {
        self.neighborhood.take().map(|n| n.into_origin())
    }

    #[inline]
    pub fn block_sizes(&self) -> &[usize] {
        &self.block_sizes
    }

    #[inline]
    pub fn policy(&self) -> NeighborSelectionPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shift_roster_model::constraint::consecutive::MaxConsecutiveWorkDaysConstraint;
    use shift_roster_model::constraint::coverage::ShiftCoverageConstraint;
    use shift_roster_model::constraint::requests::DayOffRequestsConstraint;
    use shift_roster_model::prelude::{DayOfWeek, Problem, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(7, DayOfWeek::Monday);
        let s1 = builder.add_shift("Early");
        let s2 = builder.add_shift("Late");
        let c = builder.add_contract("c", 3);
        for e in 0..4 {
            builder.add_employee(format!("E{}", e), c);
        }
        for day in 0..7 {
            builder.set_demand(s1, day, 1);
            builder.set_demand(s2, day, 1);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.add_constraint(
            1,
            Box::new(
                DayOffRequestsConstraint::new(1)
                    .with_request(0, 2)
                    .with_request(1, 4),
            ),
        );
        builder.add_constraint(1, Box::new(MaxConsecutiveWorkDaysConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    fn dense_solution(problem: &Problem) -> Solution<'_> {
        // Employees 0 and 1 take everything; plenty to improve on.
        let s1 = problem.shifts()[0].id();
        let s2 = problem.shifts()[1].id();
        let mut solution = Solution::new(problem);
        for day in 0..problem.num_days() {
            solution.clear_unassigned_slots(day);
            solution.set_assignment(day, 0, Some(s1));
            solution.set_assignment(day, 1, Some(s2));
        }
        solution
    }

    #[test]
    fn rejects_bad_ladders() {
        let rng = ChaCha8Rng::seed_from_u64(0);
        assert!(
            VariableNeighborhoodDescent::<ChaCha8Rng>::new(
                vec![],
                NeighborSelectionPolicy::FirstImproving,
                rng.clone()
            )
            .is_err()
        );
        assert!(
            VariableNeighborhoodDescent::<ChaCha8Rng>::new(
                vec![1, 0],
                NeighborSelectionPolicy::FirstImproving,
                rng
            )
            .is_err()
        );
    }

    #[test]
    fn stepping_before_init_fails() {
        let rng = ChaCha8Rng::seed_from_u64(0);
        let mut vnd = VariableNeighborhoodDescent::<ChaCha8Rng>::new(
            vec![1],
            NeighborSelectionPolicy::FirstImproving,
            rng,
        )
        .expect("valid ladder");
        assert!(vnd.next_step().is_err());
        assert!(vnd.is_done());
    }

    #[test]
    fn descent_terminates_and_never_worsens() {
        for policy in [
            NeighborSelectionPolicy::FirstImproving,
            NeighborSelectionPolicy::BestImproving,
        ] {
            let problem = problem();
            let mut solution = dense_solution(&problem);
            let initial = solution.evaluation().clone();

            let rng = ChaCha8Rng::seed_from_u64(42);
            let mut vnd = VariableNeighborhoodDescent::new(vec![1, 2, 3], policy, rng)
                .expect("valid ladder");
            vnd.init(solution);

            let mut steps = 0;
            while vnd.next_step().expect("initialized") {
                steps += 1;
                assert!(steps < 100_000, "descent must terminate");
            }
            assert!(vnd.is_done());

            let result = vnd.take_solution().expect("solution comes back");
            let final_eval = result.cached_evaluation().cloned().expect("evaluated");
            assert!(final_eval <= initial, "descent never worsens ({})", policy);
        }
    }

    #[test]
    fn take_solution_resets_the_descent() {
        let problem = problem();
        let solution = dense_solution(&problem);
        let rng = ChaCha8Rng::seed_from_u64(1);
        let mut vnd = VariableNeighborhoodDescent::new(
            vec![1],
            NeighborSelectionPolicy::FirstImproving,
            rng,
        )
        .expect("valid ladder");
        vnd.init(solution);
        assert!(vnd.current().is_some());
        let _ = vnd.take_solution().expect("solution owned");
        assert!(vnd.current().is_none());
        assert!(vnd.next_step().is_err());
    }
}

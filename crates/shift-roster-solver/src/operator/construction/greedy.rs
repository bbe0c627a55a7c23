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

use crate::err::{InvalidParameterError, NoFeasibleSolutionError, OperatorError};
use crate::operator::Operator;
use rand::Rng;
use rand::seq::SliceRandom;
use shift_roster_model::prelude::{
    Evaluation, Problem, RemoveReplaceMove, ShiftId, Solution,
};

/// Greedy construction and reconstruction: assigns every unassigned slot to
/// the free employee with the lowest estimated assignment cost, a
/// lexicographic vector summed from the constraint evaluators' estimates.
///
/// Given an existing solution, staffing is reconciled first: over-staffed
/// assignments are dropped at random and missing demand is re-materialized
/// into the unassigned-slot buckets. Days and slots are visited in
/// randomized order; cost ties go to the first candidate encountered.
pub struct GreedyConstruction<'p, R> {
    problem: &'p Problem,
    rng: R,
    current: Option<Solution<'p>>,
    done: bool,
}

impl<'p, R> GreedyConstruction<'p, R>
where
    R: Rng,
{
    pub fn new(problem: &'p Problem, rng: R) -> Result<Self, InvalidParameterError> {
        if problem.num_employees() < 1 {
            return Err(InvalidParameterError::new(
                "problem",
                "construction needs at least one employee",
            ));
        }
        Ok(Self {
            problem,
            rng,
            current: None,
            done: false,
        })
    }

    fn generate(
        &mut self,
        initial: Option<Solution<'p>>,
    ) -> Result<Solution<'p>, NoFeasibleSolutionError> {
        let mut solution = match initial {
            None => Solution::new(self.problem),
            Some(mut seed) => {
                if reconcile_staffing(self.problem, &mut seed, &mut self.rng) {
                    return Ok(seed);
                }
                seed
            }
        };

        let mut day_indexes: Vec<usize> = (0..self.problem.num_days()).collect();
        day_indexes.shuffle(&mut self.rng);

        for day_index in day_indexes {
            let mut open_slots: Vec<ShiftId> = solution.unassigned_slots(day_index).to_vec();
            open_slots.shuffle(&mut self.rng);

            for slot in open_slots {
                let mut best: Option<(usize, Evaluation)> = None;
                for employee_index in 0..solution.num_employees() {
                    if !solution.is_employee_free(day_index, employee_index) {
                        continue;
                    }
                    let estimate = estimated_assignment_evaluation(
                        self.problem,
                        &solution,
                        employee_index,
                        slot,
                        day_index,
                    );
                    match &best {
                        None => best = Some((employee_index, estimate)),
                        Some((_, incumbent)) if estimate < *incumbent => {
                            best = Some((employee_index, estimate));
                        }
                        Some(_) => {}
                    }
                }
                let Some((employee_index, _)) = best else {
                    return Err(NoFeasibleSolutionError::new(day_index));
                };
                solution
                    .apply_remove_replace(&RemoveReplaceMove::new(
                        None,
                        Some(employee_index),
                        slot,
                        day_index,
                    ))
                    .expect("slot was drawn from the unassigned bucket");
            }
            solution.clear_unassigned_slots(day_index);
        }

        solution.invalidate_evaluation();
        Ok(solution)
    }
}

/// Estimated cost vector of assigning `shift` to an employee on a day,
/// summed per rank over all constraint evaluators.
fn estimated_assignment_evaluation(
    problem: &Problem,
    solution: &Solution<'_>,
    employee_index: usize,
    shift: ShiftId,
    day_index: usize,
) -> Evaluation {
    let mut estimate = Evaluation::zero(problem.rank_count());
    for rank in 0..problem.rank_count() {
        for constraint in problem.constraints(rank) {
            estimate.add_at(
                rank,
                constraint.evaluator().estimated_assignment_cost(
                    solution,
                    employee_index,
                    shift,
                    day_index,
                ),
            );
        }
    }
    estimate
}

/// Rebuilds the unassigned-slot buckets from the demand matrix: drops
/// over-staffed assignments at random and records under-staffing as open
/// slots. Returns `true` when the solution already covers the demand
/// exactly.
fn reconcile_staffing<R: Rng>(
    problem: &Problem,
    solution: &mut Solution<'_>,
    rng: &mut R,
) -> bool {
    let mut complete = true;
    for day_index in 0..solution.num_days() {
        solution.clear_unassigned_slots(day_index);
        for shift in problem.shifts() {
            let demand = problem.demand(shift.id(), day_index) as usize;
            let assigned = solution.assigned_count(day_index, shift.id());
            if assigned > demand {
                solution.invalidate_evaluation();
                let mut over_staffed = assigned - demand;
                while over_staffed > 0 {
                    let mut to_remove = rng.random_range(0..(demand + over_staffed));
                    for employee_index in 0..solution.num_employees() {
                        if solution.assignment(day_index, employee_index) == Some(shift.id()) {
                            if to_remove == 0 {
                                solution.set_assignment(day_index, employee_index, None);
                                over_staffed -= 1;
                                break;
                            }
                            to_remove -= 1;
                        }
                    }
                }
            } else if assigned < demand {
                complete = false;
                for _ in 0..(demand - assigned) {
                    solution.push_unassigned_slot(day_index, shift.id());
                }
            }
        }
    }
    complete
}

impl<'p, R> Operator<'p> for GreedyConstruction<'p, R>
where
    R: Rng,
{
    fn name(&self) -> &str {
        "GreedyConstruction"
    }

    fn init(&mut self, mut seeds: Vec<Solution<'p>>) -> Result<(), OperatorError> {
        if seeds.len() > 1 {
            tracing::warn!(
                seeds = seeds.len(),
                "GreedyConstruction takes at most one seed solution"
            );
        }
        self.current = if seeds.is_empty() {
            None
        } else {
            Some(seeds.swap_remove(0))
        };
        self.done = false;
        Ok(())
    }

    fn next_step(&mut self) -> Result<bool, OperatorError> {
        let seed = self.current.take();
        self.current = Some(self.generate(seed)?);
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
        self.current.take()
    }
}

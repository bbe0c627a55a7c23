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
use shift_roster_model::prelude::{Problem, Solution};

const MAX_BLOCK_SIZE: usize = 7;

/// Constructs a coverage-complete timetable by repeatedly assigning random
/// blocks: pick a day with uncovered demand, pick an employee free on that
/// day, and hand the employee one slot on each of the next few days
/// (wrapping around the period) while they are free and demand remains.
///
/// Fast and oblivious to soft constraints; local search cleans up after it.
pub struct FastBlockConstruction<'p, R> {
    problem: &'p Problem,
    rng: R,
    current: Option<Solution<'p>>,
    done: bool,
}

impl<'p, R> FastBlockConstruction<'p, R>
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

    fn generate(&mut self) -> Result<(), NoFeasibleSolutionError> {
        if self.current.is_none() {
            self.current = Some(Solution::new(self.problem));
        }
        let solution = self.current.as_mut().expect("current solution present");
        solution.invalidate_evaluation();

        while let Some(day_index) = random_day_with_demand(solution, &mut self.rng) {
            let block_size = self.rng.random_range(0..MAX_BLOCK_SIZE) + 1;
            let employee_index = random_free_employee(solution, day_index, &mut self.rng)
                .ok_or(NoFeasibleSolutionError::new(day_index))?;
            for offset in 0..block_size {
                let day = (day_index + offset) % solution.num_days();
                if solution.has_unassigned_slots(day) && solution.is_employee_free(day, employee_index)
                {
                    let shift = solution
                        .pop_unassigned_slot(day)
                        .expect("day has unassigned slots");
                    solution.set_assignment(day, employee_index, Some(shift));
                }
            }
        }
        Ok(())
    }
}

/// Random day that still has uncovered demand, scanning forward (with
/// wraparound) from a random probe. `None` once the demand is fully
/// covered.
fn random_day_with_demand<R: Rng>(solution: &Solution<'_>, rng: &mut R) -> Option<usize> {
    let days = solution.num_days();
    let probe = rng.random_range(0..days);
    if solution.has_unassigned_slots(probe) {
        return Some(probe);
    }
    let mut day = (probe + 1) % days;
    while !solution.has_unassigned_slots(day) {
        day = (day + 1) % days;
        if day == probe {
            return None;
        }
    }
    Some(day)
}

/// Random employee free on the day, scanning forward (with wraparound)
/// from a random probe. `None` when every employee already works that day.
fn random_free_employee<R: Rng>(
    solution: &Solution<'_>,
    day_index: usize,
    rng: &mut R,
) -> Option<usize> {
    let employees = solution.num_employees();
    let probe = rng.random_range(0..employees);
    if solution.is_employee_free(day_index, probe) {
        return Some(probe);
    }
    let mut employee = (probe + 1) % employees;
    while !solution.is_employee_free(day_index, employee) {
        employee = (employee + 1) % employees;
        if employee == probe {
            return None;
        }
    }
    Some(employee)
}

impl<'p, R> Operator<'p> for FastBlockConstruction<'p, R>
where
    R: Rng,
{
    fn name(&self) -> &str {
        "FastBlockConstruction"
    }

    fn init(&mut self, mut seeds: Vec<Solution<'p>>) -> Result<(), OperatorError> {
        if seeds.len() > 1 {
            tracing::warn!(
                seeds = seeds.len(),
                "FastBlockConstruction takes at most one seed solution"
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
        self.generate()?;
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

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
use crate::operator::construction::GreedyConstruction;
use crate::operator::perturbation::min_slot_exchanges;
use rand::{Rng, SeedableRng};
use shift_roster_model::prelude::{Problem, Solution};

/// Ruin-and-recreate: removes random assignment blocks (pushing the slots
/// back into the unassigned buckets) until enough cells changed, then runs
/// greedy construction to rebuild coverage.
pub struct RuinAndRecreate<'p, R> {
    max_block_size: usize,
    min_slot_removals: usize,
    solution: Option<Solution<'p>>,
    done: bool,
    rng: R,
    reconstruction: GreedyConstruction<'p, R>,
}

impl<'p, R> RuinAndRecreate<'p, R>
where
    R: Rng + SeedableRng,
{
    pub fn new(
        problem: &'p Problem,
        max_block_size: usize,
        strength: f64,
        mut rng: R,
    ) -> Result<Self, InvalidParameterError> {
        if problem.num_employees() < 1 {
            return Err(InvalidParameterError::new(
                "problem",
                "perturbation needs at least one employee",
            ));
        }
        if max_block_size < 1 {
            return Err(InvalidParameterError::new(
                "max_block_size",
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&strength) {
            return Err(InvalidParameterError::new(
                "strength",
                "must lie in [0, 1]",
            ));
        }
        let reconstruction = GreedyConstruction::new(problem, R::from_rng(&mut rng))?;
        Ok(Self {
            max_block_size,
            min_slot_removals: min_slot_exchanges(problem, strength),
            solution: None,
            done: false,
            rng,
            reconstruction,
        })
    }

    /// Drops random assignment blocks back into the unassigned buckets.
    fn ruin(&mut self) {
        let solution = self.solution.as_mut().expect("perturbation initialized");
        solution.invalidate_evaluation();
        let days = solution.num_days();
        let employees = solution.num_employees();

        let mut removals = 0;
        while removals < self.min_slot_removals {
            let mut block_size = self.rng.random_range(0..self.max_block_size) + 1;
            let mut start_day = self.rng.random_range(0..days);
            let mut employee_index = self.rng.random_range(0..employees);

            // If the probe lands on an empty cell, walk forward (day-major,
            // wrapping) to the next assignment.
            if solution.is_employee_free(start_day, employee_index) {
                let probe_day = start_day;
                let probe_employee = employee_index;
                let mut day = start_day + 1;
                let mut employee = employee_index;
                let mut adjusted = false;
                loop {
                    if day == days {
                        day = 0;
                        employee = (employee + 1) % employees;
                    }
                    if day == probe_day && employee == probe_employee {
                        // No assignments remain anywhere.
                        removals = self.min_slot_removals;
                        break;
                    }
                    if !solution.is_employee_free(day, employee) {
                        start_day = day;
                        employee_index = employee;
                        adjusted = true;
                    }
                    if adjusted {
                        break;
                    }
                    day += 1;
                }
                if !adjusted {
                    continue;
                }
            }

            // Center the block on the drawn day and clamp it to the period.
            start_day = start_day.saturating_sub(block_size / 2);
            if start_day + block_size > days {
                block_size = days - start_day;
            }

            let end_day = start_day + block_size - 1;
            for day in start_day..=end_day {
                if let Some(shift) = solution.assignment(day, employee_index) {
                    solution.set_assignment(day, employee_index, None);
                    solution.push_unassigned_slot(day, shift);
                    removals += 1;
                }
            }
        }
    }
}

impl<'p, R> Operator<'p> for RuinAndRecreate<'p, R>
where
    R: Rng + SeedableRng,
{
    fn name(&self) -> &str {
        "RuinAndRecreate"
    }

    fn init(&mut self, mut seeds: Vec<Solution<'p>>) -> Result<(), OperatorError> {
        if seeds.len() != 1 {
            return Err(InvalidParameterError::new(
                "seeds",
                "perturbation expects exactly one solution",
            )
            .into());
        }
        self.solution = Some(seeds.swap_remove(0));
        self.done = false;
        Ok(())
    }

    fn next_step(&mut self) -> Result<bool, OperatorError> {
        if self.solution.is_none() {
            return Err(NotInitializedError::new("RuinAndRecreate").into());
        }
        self.ruin();
        let ruined = self.solution.take().expect("perturbation initialized");
        self.reconstruction.init(vec![ruined])?;
        self.reconstruction.run_to_completion()?;
        self.solution = self.reconstruction.take_result();
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
        self.solution.take()
    }
}

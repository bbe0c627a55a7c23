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
use crate::operator::perturbation::min_slot_exchanges;
use rand::Rng;
use shift_roster_model::prelude::{Problem, Solution};

/// Perturbation by random 3-cycle rotations: three distinct employees
/// (nudged apart so their start-day assignments differ where possible)
/// rotate their assignment blocks until enough cells have changed.
pub struct ExchangePerturbation<'p, R> {
    block_sizes: Vec<usize>,
    min_slot_exchanges: usize,
    solution: Option<Solution<'p>>,
    done: bool,
    rng: R,
}

impl<'p, R> ExchangePerturbation<'p, R>
where
    R: Rng,
{
    pub fn new(
        problem: &'p Problem,
        block_sizes: Vec<usize>,
        strength: f64,
        rng: R,
    ) -> Result<Self, InvalidParameterError> {
        if problem.num_employees() < 3 {
            return Err(InvalidParameterError::new(
                "problem",
                "3-cycle rotations need at least three employees",
            ));
        }
        if !(0.0..=1.0).contains(&strength) {
            return Err(InvalidParameterError::new(
                "strength",
                "must lie in [0, 1]",
            ));
        }
        if block_sizes.is_empty() || block_sizes.iter().any(|size| *size < 1) {
            return Err(InvalidParameterError::new(
                "block_sizes",
                "must be non-empty with sizes of at least 1",
            ));
        }
        Ok(Self {
            block_sizes,
            min_slot_exchanges: min_slot_exchanges(problem, strength),
            solution: None,
            done: false,
            rng,
        })
    }

    fn perturb(&mut self) {
        let solution = self.solution.as_mut().expect("perturbation initialized");
        let days = solution.num_days();
        let employees = solution.num_employees();

        let mut exchanged = 0;
        while exchanged < self.min_slot_exchanges {
            let mut block_size = self.block_sizes[self.rng.random_range(0..self.block_sizes.len())];
            let mut start_day = self.rng.random_range(0..days);

            let employee1 = self.rng.random_range(0..employees);

            // Second employee: distinct, preferring a different shift on the
            // start day.
            let mut employee2 = self.rng.random_range(0..employees);
            if employee2 == employee1 {
                employee2 = (employee2 + 1) % employees;
            }
            let mut probe = employee2;
            while solution.assignment(start_day, employee1) == solution.assignment(start_day, probe)
            {
                probe = (probe + 1) % employees;
                if probe == employee2 {
                    break;
                }
            }
            employee2 = probe;

            // Third employee: distinct from both, again preferring differing
            // start-day assignments.
            let mut employee3 = self.rng.random_range(0..employees);
            while employee3 == employee1 || employee3 == employee2 {
                employee3 = (employee3 + 1) % employees;
            }
            let mut probe = employee3;
            while solution.assignment(start_day, employee1) == solution.assignment(start_day, probe)
                || solution.assignment(start_day, employee2)
                    == solution.assignment(start_day, probe)
            {
                probe = (probe + 1) % employees;
                if probe == employee3 {
                    break;
                }
            }
            employee3 = probe;

            // Center the block on the drawn day and clamp it to the period.
            start_day = start_day.saturating_sub(block_size / 2);
            if start_day + block_size > days {
                block_size = days - start_day;
            }

            let end_day = start_day + block_size - 1;
            for day in start_day..=end_day {
                let to_employee1 = solution.assignment(day, employee2);
                let to_employee2 = solution.assignment(day, employee3);
                let to_employee3 = solution.assignment(day, employee1);
                solution.set_assignment(day, employee1, to_employee1);
                solution.set_assignment(day, employee2, to_employee2);
                solution.set_assignment(day, employee3, to_employee3);
                exchanged += 3;
            }
        }
        solution.invalidate_evaluation();
    }
}

impl<'p, R> Operator<'p> for ExchangePerturbation<'p, R>
where
    R: Rng,
{
    fn name(&self) -> &str {
        "ExchangePerturbation"
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
            return Err(NotInitializedError::new("ExchangePerturbation").into());
        }
        self.perturb();
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

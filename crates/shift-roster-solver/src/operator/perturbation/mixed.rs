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
use crate::operator::perturbation::{ExchangePerturbation, RuinAndRecreate};
use rand::{Rng, SeedableRng};
use shift_roster_model::prelude::{Problem, Solution};

const RUIN_MAX_BLOCK_SIZE: usize = 7;
const RUIN_STRENGTH: f64 = 0.1;
const EXCHANGE_STRENGTH: f64 = 0.03;

/// Coin-flip combination of the two basic perturbations: each invocation
/// runs either ruin-and-recreate or the exchange rotation, with equal
/// probability.
pub struct MixedPerturbation<'p, R> {
    solution: Option<Solution<'p>>,
    done: bool,
    rng: R,
    ruin_recreate: RuinAndRecreate<'p, R>,
    exchange: ExchangePerturbation<'p, R>,
}

impl<'p, R> MixedPerturbation<'p, R>
where
    R: Rng + SeedableRng,
{
    pub fn new(problem: &'p Problem, mut rng: R) -> Result<Self, InvalidParameterError> {
        let ruin_recreate = RuinAndRecreate::new(
            problem,
            RUIN_MAX_BLOCK_SIZE,
            RUIN_STRENGTH,
            R::from_rng(&mut rng),
        )?;
        let exchange = ExchangePerturbation::new(
            problem,
            (1..=7).collect(),
            EXCHANGE_STRENGTH,
            R::from_rng(&mut rng),
        )?;
        Ok(Self {
            solution: None,
            done: false,
            rng,
            ruin_recreate,
            exchange,
        })
    }
}

impl<'p, R> Operator<'p> for MixedPerturbation<'p, R>
where
    R: Rng + SeedableRng,
{
    fn name(&self) -> &str {
        "MixedPerturbation"
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
        let Some(solution) = self.solution.take() else {
            return Err(NotInitializedError::new("MixedPerturbation").into());
        };
        let perturbation: &mut dyn Operator<'p> = if self.rng.random_bool(0.5) {
            &mut self.ruin_recreate
        } else {
            &mut self.exchange
        };
        perturbation.init(vec![solution])?;
        perturbation.run_to_completion()?;
        self.solution = perturbation.take_result();
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use shift_roster_model::constraint::coverage::ShiftCoverageConstraint;
    use shift_roster_model::prelude::{DayOfWeek, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(14, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", 14);
        for e in 0..6 {
            builder.add_employee(format!("E{}", e), c);
        }
        for day in 0..14 {
            builder.set_demand(s, day, 3);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    fn covered(problem: &Problem) -> Solution<'_> {
        let s = problem.shifts()[0].id();
        let mut solution = Solution::new(problem);
        for day in 0..problem.num_days() {
            for e in 0..3 {
                solution.pop_unassigned_slot(day);
                solution.set_assignment(day, e, Some(s));
            }
        }
        solution
    }

    #[test]
    fn both_branches_keep_coverage() {
        let problem = problem();
        let s = problem.shifts()[0].id();
        let mut perturbation =
            MixedPerturbation::new(&problem, ChaCha8Rng::seed_from_u64(6)).expect("valid problem");

        // Several invocations take both branches of the coin flip.
        let mut solution = covered(&problem);
        for _ in 0..6 {
            perturbation.init(vec![solution]).expect("init");
            perturbation.run_to_completion().expect("perturbation runs");
            solution = perturbation.take_result().expect("result present");
            assert_eq!(solution.total_unassigned_slots(), 0);
            for day in 0..problem.num_days() {
                assert_eq!(solution.assigned_count(day, s), 3);
            }
        }
    }

    #[test]
    fn stepping_before_init_fails() {
        let problem = problem();
        let mut perturbation =
            MixedPerturbation::new(&problem, ChaCha8Rng::seed_from_u64(0)).expect("valid problem");
        assert!(matches!(
            perturbation.next_step(),
            Err(OperatorError::NotInitialized(_))
        ));
    }
}

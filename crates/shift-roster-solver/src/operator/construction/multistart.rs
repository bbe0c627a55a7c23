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

use crate::err::{InvalidParameterError, OperatorError};
use crate::operator::Operator;
use crate::operator::construction::GreedyConstruction;
use rand::Rng;
use shift_roster_model::prelude::{Problem, Solution};

/// Multi-start wrapper around greedy construction: runs N independent
/// greedy generations and keeps the best by evaluation. One generation per
/// step.
pub struct MultistartGreedyConstruction<'p, R> {
    nb_generations: usize,
    remaining_generations: usize,
    best_found: Option<Solution<'p>>,
    generation: GreedyConstruction<'p, R>,
}

impl<'p, R> MultistartGreedyConstruction<'p, R>
where
    R: Rng,
{
    pub fn new(
        problem: &'p Problem,
        rng: R,
        nb_generations: usize,
    ) -> Result<Self, InvalidParameterError> {
        if nb_generations == 0 {
            return Err(InvalidParameterError::new(
                "nb_generations",
                "must be positive",
            ));
        }
        Ok(Self {
            nb_generations,
            remaining_generations: nb_generations,
            best_found: None,
            generation: GreedyConstruction::new(problem, rng)?,
        })
    }
}

impl<'p, R> Operator<'p> for MultistartGreedyConstruction<'p, R>
where
    R: Rng,
{
    fn name(&self) -> &str {
        "MultistartGreedyConstruction"
    }

    fn init(&mut self, seeds: Vec<Solution<'p>>) -> Result<(), OperatorError> {
        if !seeds.is_empty() {
            tracing::warn!("MultistartGreedyConstruction ignores seed solutions");
        }
        self.remaining_generations = self.nb_generations;
        self.best_found = None;
        Ok(())
    }

    fn next_step(&mut self) -> Result<bool, OperatorError> {
        if self.is_done() {
            return Ok(false);
        }
        self.generation.init(Vec::new())?;
        self.generation.run_to_completion()?;
        self.remaining_generations -= 1;

        let mut generated = self
            .generation
            .take_result()
            .expect("completed generation has a result");
        generated.evaluation();
        let replace = match &mut self.best_found {
            None => true,
            Some(best) => *generated.cached_evaluation().expect("evaluated") < *best.evaluation(),
        };
        if replace {
            self.best_found = Some(generated);
        }
        Ok(!self.is_done())
    }

    fn is_done(&self) -> bool {
        self.remaining_generations == 0
    }

    fn take_result(&mut self) -> Option<Solution<'p>> {
        if !self.is_done() {
            return None;
        }
        self.best_found.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shift_roster_model::constraint::coverage::ShiftCoverageConstraint;
    use shift_roster_model::constraint::requests::DayOffRequestsConstraint;
    use shift_roster_model::prelude::{DayOfWeek, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(5, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", 14);
        for e in 0..3 {
            builder.add_employee(format!("E{}", e), c);
        }
        for day in 0..5 {
            builder.set_demand(s, day, 1);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.add_constraint(1, Box::new(DayOffRequestsConstraint::new(1).with_request(0, 0)));
        builder.build().expect("problem builds")
    }

    #[test]
    fn zero_generations_is_rejected() {
        let problem = problem();
        let rng = ChaCha8Rng::seed_from_u64(0);
        assert!(MultistartGreedyConstruction::new(&problem, rng, 0).is_err());
    }

    #[test]
    fn runs_the_requested_number_of_generations() {
        let problem = problem();
        let rng = ChaCha8Rng::seed_from_u64(4);
        let mut multistart =
            MultistartGreedyConstruction::new(&problem, rng, 3).expect("valid configuration");
        multistart.init(Vec::new()).expect("init");

        let mut steps = 0;
        while multistart.next_step().expect("feasible instance") {
            steps += 1;
        }
        assert_eq!(steps + 1, 3);
        assert!(multistart.is_done());

        let best = multistart.take_result().expect("result present");
        assert_eq!(best.total_unassigned_slots(), 0);
        assert!(best.is_evaluated());
    }

    #[test]
    fn reinit_restarts_the_generations() {
        let problem = problem();
        let rng = ChaCha8Rng::seed_from_u64(4);
        let mut multistart =
            MultistartGreedyConstruction::new(&problem, rng, 2).expect("valid configuration");
        multistart.init(Vec::new()).expect("init");
        multistart.run_to_completion().expect("feasible instance");
        assert!(multistart.is_done());

        multistart.init(Vec::new()).expect("init");
        assert!(!multistart.is_done());
        assert!(multistart.take_result().is_none());
    }
}

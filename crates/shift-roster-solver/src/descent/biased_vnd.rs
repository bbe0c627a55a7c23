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

use crate::err::{InvalidParameterError, NotInitializedError};
use crate::neighborhood::BiasedSwapNeighborhood;
use rand::{Rng, SeedableRng};
use shift_roster_model::prelude::{Constraint, Solution};

/// Variable neighborhood descent over the biased swap neighborhood: moves
/// are priced against the supplied active constraints only and accepted
/// when their partial delta beats the zero delta. Selection is always
/// first-improving, matching the randomized enumeration.
pub struct BiasedVariableNeighborhoodDescent<'p, R> {
    block_sizes: Vec<usize>,
    rng: R,
    active_constraints: Vec<Vec<&'p dyn Constraint>>,
    ladder_index: usize,
    neighborhood: Option<BiasedSwapNeighborhood<'p, R>>,
}

impl<'p, R> BiasedVariableNeighborhoodDescent<'p, R>
where
    R: Rng + SeedableRng,
{
    pub fn new(
        block_sizes: Vec<usize>,
        rng: R,
        active_constraints: Vec<Vec<&'p dyn Constraint>>,
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
            rng,
            active_constraints,
            ladder_index: 0,
            neighborhood: None,
        })
    }

    pub fn init(&mut self, solution: Solution<'p>) {
        self.ladder_index = 0;
        self.neighborhood = Some(self.make_neighborhood(solution, 0));
    }

    fn make_neighborhood(
        &mut self,
        solution: Solution<'p>,
        ladder_index: usize,
    ) -> BiasedSwapNeighborhood<'p, R> {
        let child = R::from_rng(&mut self.rng);
        BiasedSwapNeighborhood::new(
            solution,
            self.block_sizes[ladder_index],
            true,
            child,
            self.active_constraints.clone(),
        )
        .expect("validated block sizes")
    }

    /// Performs one descent step. Returns `true` while more steps remain.
    pub fn next_step(&mut self) -> Result<bool, NotInitializedError> {
        if self.neighborhood.is_none() {
            return Err(NotInitializedError::new(
                "BiasedVariableNeighborhoodDescent",
            ));
        }
        if self.ladder_index >= self.block_sizes.len() {
            return Ok(false);
        }

        let improved = {
            let neighborhood = self.neighborhood.as_mut().expect("descent initialized");
            if neighborhood.next_neighbor_delta().is_some() {
                neighborhood
                    .move_to_last_evaluated_neighbor()
                    .expect("delta was just evaluated");
                true
            } else {
                false
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

    #[inline]
    pub fn is_done(&self) -> bool {
        self.neighborhood.is_none() || self.ladder_index >= self.block_sizes.len()
    }

    #[inline]
    pub fn current(&self) -> Option<&Solution<'p>> {
        self.neighborhood.as_ref().map(|n| n.origin())
    }

    #[inline]
    pub fn take_solution(&mut self) -> Option<Solution<'p>> {
        self.neighborhood.take().map(|n| n.into_origin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shift_roster_model::constraint::coverage::ShiftCoverageConstraint;
    use shift_roster_model::constraint::requests::DayOffRequestsConstraint;
    use shift_roster_model::prelude::{DayOfWeek, Problem, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(5, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", 14);
        builder.add_employee("E0", c);
        builder.add_employee("E1", c);
        builder.add_employee("E2", c);
        for day in 0..5 {
            builder.set_demand(s, day, 1);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.add_constraint(
            1,
            Box::new(
                DayOffRequestsConstraint::new(1)
                    .with_request(0, 0)
                    .with_request(0, 1),
            ),
        );
        builder.build().expect("problem builds")
    }

    fn covered(problem: &Problem) -> Solution<'_> {
        let s = problem.shifts()[0].id();
        let mut solution = Solution::new(problem);
        for day in 0..problem.num_days() {
            solution.pop_unassigned_slot(day);
            solution.set_assignment(day, 0, Some(s));
        }
        solution
    }

    fn active_lists(problem: &Problem) -> Vec<Vec<&dyn Constraint>> {
        (0..problem.rank_count())
            .map(|rank| {
                problem
                    .constraints(rank)
                    .iter()
                    .map(|c| c.as_ref())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn biased_descent_reaches_a_partial_local_optimum() {
        let problem = problem();
        let mut solution = covered(&problem);
        let initial = solution.evaluation().clone();

        let rng = ChaCha8Rng::seed_from_u64(5);
        let mut vnd =
            BiasedVariableNeighborhoodDescent::new(vec![1, 2], rng, active_lists(&problem))
                .expect("valid ladder");
        vnd.init(solution);
        let mut steps = 0;
        while vnd.next_step().expect("initialized") {
            steps += 1;
            assert!(steps < 10_000, "descent must terminate");
        }
        assert!(vnd.is_done());

        let mut result = vnd.take_solution().expect("solution comes back");
        assert!(*result.evaluation() <= initial);
        // Both day-off violations can be swapped away.
        assert_eq!(result.evaluation().cost(1), 0);
    }

    #[test]
    fn stepping_before_init_fails() {
        let problem = problem();
        let rng = ChaCha8Rng::seed_from_u64(0);
        let mut vnd =
            BiasedVariableNeighborhoodDescent::new(vec![1], rng, active_lists(&problem))
                .expect("valid ladder");
        assert!(vnd.next_step().is_err());
    }
}

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

use crate::err::{InvalidParameterError, NoSuchNeighborError};
use rand::Rng;
use shift_roster_model::prelude::{Constraint, Evaluation, Solution, SwapMove};
use std::collections::VecDeque;

/// Swap neighborhood that prices moves against a caller-supplied subset of
/// active constraints only, grouped by rank. Candidates are reported as
/// delta vectors; with `only_improving`, a candidate must beat the zero
/// delta lexicographically.
///
/// Because the deltas are partial, committing a move invalidates the
/// origin's evaluation cache instead of installing a value.
pub struct BiasedSwapNeighborhood<'p, R> {
    origin: Solution<'p>,
    block_size: usize,
    only_improving: bool,
    rng: R,
    active_constraints: Vec<Vec<&'p dyn Constraint>>,
    null_delta: Evaluation,
    remaining_moves: VecDeque<SwapMove>,
    remaining_start_days: VecDeque<usize>,
    current_move: Option<SwapMove>,
    current_delta: Option<Evaluation>,
}

impl<'p, R> BiasedSwapNeighborhood<'p, R>
where
    R: Rng,
{
    pub fn new(
        origin: Solution<'p>,
        block_size: usize,
        only_improving: bool,
        rng: R,
        active_constraints: Vec<Vec<&'p dyn Constraint>>,
    ) -> Result<Self, InvalidParameterError> {
        if block_size < 1 {
            return Err(InvalidParameterError::new("block_size", "must be at least 1"));
        }
        let null_delta = Evaluation::zero(active_constraints.len());
        let mut neighborhood = Self {
            origin,
            block_size,
            only_improving,
            rng,
            active_constraints,
            null_delta,
            remaining_moves: VecDeque::new(),
            remaining_start_days: VecDeque::new(),
            current_move: None,
            current_delta: None,
        };
        neighborhood.reset_exploration();
        Ok(neighborhood)
    }

    pub fn reset_exploration(&mut self) {
        self.current_move = None;
        self.current_delta = None;
        self.remaining_moves.clear();
        self.remaining_start_days.clear();
        let days = self.origin.num_days();
        let mut day = 0;
        while day + self.block_size <= days {
            self.remaining_start_days.push_back(day);
            day += 1;
        }
    }

    fn complete_move_list(&mut self) {
        if !self.remaining_moves.is_empty() || self.remaining_start_days.is_empty() {
            return;
        }
        let index = self.rng.random_range(0..self.remaining_start_days.len());
        let start_day = self
            .remaining_start_days
            .remove(index)
            .expect("start day index in range");
        let employees = self.origin.num_employees();
        for employee1 in 0..employees {
            for employee2 in (employee1 + 1)..employees {
                self.remaining_moves
                    .push_back(SwapMove::new(employee1, employee2, start_day, self.block_size));
            }
        }
    }

    fn draw_next_move(&mut self) -> Option<SwapMove> {
        if self.remaining_moves.is_empty() && self.remaining_start_days.is_empty() {
            return None;
        }
        if self.remaining_moves.is_empty() {
            self.complete_move_list();
        }
        let index = self.rng.random_range(0..self.remaining_moves.len());
        self.remaining_moves.remove(index)
    }

    /// Delta of a move over the active constraints, by rank.
    fn biased_delta(&self, mv: &SwapMove) -> Evaluation {
        let mut delta = Evaluation::zero(self.active_constraints.len());
        for (rank, constraints) in self.active_constraints.iter().enumerate() {
            let mut rank_delta = 0i64;
            for constraint in constraints {
                rank_delta += constraint
                    .evaluator()
                    .swap_cost_difference(&self.origin, mv);
            }
            delta.add_at(rank, rank_delta);
        }
        delta
    }

    /// Partial delta of the next candidate, or `None` once exhausted.
    pub fn next_neighbor_delta(&mut self) -> Option<Evaluation> {
        loop {
            let Some(mv) = self.draw_next_move() else {
                self.current_move = None;
                self.current_delta = None;
                return None;
            };
            let delta = if mv.alters(&self.origin) {
                self.biased_delta(&mv)
            } else {
                self.null_delta.clone()
            };
            if self.only_improving && delta >= self.null_delta {
                continue;
            }
            self.current_move = Some(mv);
            self.current_delta = Some(delta.clone());
            return Some(delta);
        }
    }

    /// Applies the last evaluated move to the origin, invalidates its
    /// evaluation and restarts enumeration.
    pub fn move_to_last_evaluated_neighbor(&mut self) -> Result<(), NoSuchNeighborError> {
        let mv = self.current_move.take().ok_or(NoSuchNeighborError)?;
        self.origin.apply_swap(&mv);
        self.origin.invalidate_evaluation();
        self.reset_exploration();
        Ok(())
    }

    #[inline]
    pub fn origin(&self) -> &Solution<'p> {
        &self.origin
    }

    #[inline]
    pub fn into_origin(self) -> Solution<'p> {
        self.origin
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
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
        builder.scheduling_period(3, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", 14);
        builder.add_employee("E0", c);
        builder.add_employee("E1", c);
        for day in 0..3 {
            builder.set_demand(s, day, 1);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.add_constraint(1, Box::new(DayOffRequestsConstraint::new(1).with_request(0, 0)));
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
    fn improving_deltas_beat_the_zero_delta() {
        let problem = problem();
        let solution = covered(&problem);
        let active = active_lists(&problem);
        let rng = ChaCha8Rng::seed_from_u64(1);
        let mut neighborhood = BiasedSwapNeighborhood::new(solution, 1, true, rng, active)
            .expect("valid block size");

        let zero = Evaluation::zero(problem.rank_count());
        let mut seen = 0;
        while let Some(delta) = neighborhood.next_neighbor_delta() {
            assert!(delta < zero);
            seen += 1;
            neighborhood
                .move_to_last_evaluated_neighbor()
                .expect("delta was evaluated");
        }
        // The single day-off violation is the only thing to improve.
        assert_eq!(seen, 1);
        assert!(neighborhood.origin().is_employee_free(0, 0));
    }

    #[test]
    fn committing_invalidates_the_evaluation_cache() {
        let problem = problem();
        let mut solution = covered(&problem);
        solution.evaluation();
        let active = active_lists(&problem);
        let rng = ChaCha8Rng::seed_from_u64(2);
        let mut neighborhood = BiasedSwapNeighborhood::new(solution, 1, false, rng, active)
            .expect("valid block size");

        neighborhood
            .next_neighbor_delta()
            .expect("neighborhood not empty");
        neighborhood
            .move_to_last_evaluated_neighbor()
            .expect("delta was evaluated");
        assert!(!neighborhood.origin().is_evaluated());
    }

    #[test]
    fn empty_active_set_yields_null_deltas() {
        let problem = problem();
        let solution = covered(&problem);
        let active: Vec<Vec<&dyn Constraint>> = vec![Vec::new(), Vec::new()];
        let rng = ChaCha8Rng::seed_from_u64(3);
        let mut neighborhood = BiasedSwapNeighborhood::new(solution, 1, false, rng, active)
            .expect("valid block size");
        let delta = neighborhood
            .next_neighbor_delta()
            .expect("neighborhood not empty");
        assert!(delta.is_zero());
    }
}

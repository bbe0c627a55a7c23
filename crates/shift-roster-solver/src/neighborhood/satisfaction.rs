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

use crate::err::InvalidParameterError;
use crate::neighborhood::filter::SwapMoveFilter;
use rand::Rng;
use shift_roster_model::prelude::{SatisfactionDelta, Solution, SwapMove};
use std::collections::VecDeque;

/// Swap neighborhood scored by constraint satisfaction counts: each
/// candidate reports how many constraint units it newly satisfies and newly
/// unsatisfies, summed over every constraint of every rank. A
/// [`SwapMoveFilter`] prunes the enumeration; guided perturbation plugs a
/// tabu-like no-return filter in here.
///
/// The neighborhood only reads the origin; callers apply the selected move
/// themselves.
pub struct SwapSatisfactionNeighborhood<'s, 'p, R, F> {
    origin: &'s Solution<'p>,
    block_size: usize,
    rng: Option<R>,
    filter: F,
    remaining_moves: VecDeque<SwapMove>,
    remaining_start_days: VecDeque<usize>,
    current_move: Option<SwapMove>,
}

impl<'s, 'p, R, F> SwapSatisfactionNeighborhood<'s, 'p, R, F>
where
    R: Rng,
    F: SwapMoveFilter,
{
    pub fn new(
        origin: &'s Solution<'p>,
        block_size: usize,
        rng: Option<R>,
        filter: F,
    ) -> Result<Self, InvalidParameterError> {
        if block_size < 1 {
            return Err(InvalidParameterError::new("block_size", "must be at least 1"));
        }
        let mut neighborhood = Self {
            origin,
            block_size,
            rng,
            filter,
            remaining_moves: VecDeque::new(),
            remaining_start_days: VecDeque::new(),
            current_move: None,
        };
        neighborhood.reset_exploration();
        Ok(neighborhood)
    }

    pub fn reset_exploration(&mut self) {
        self.current_move = None;
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
        let index = match self.rng.as_mut() {
            Some(rng) => rng.random_range(0..self.remaining_start_days.len()),
            None => 0,
        };
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
        let index = match self.rng.as_mut() {
            Some(rng) => rng.random_range(0..self.remaining_moves.len()),
            None => 0,
        };
        self.remaining_moves.remove(index)
    }

    /// Satisfaction counts of the next candidate accepted by the filter, or
    /// `None` once the neighborhood is exhausted.
    pub fn next_neighbor_evaluation(&mut self) -> Option<SatisfactionDelta> {
        self.current_move = None;
        let mv = loop {
            let Some(candidate) = self.draw_next_move() else {
                return None;
            };
            if self.filter.accepts(&candidate) {
                break candidate;
            }
        };
        let delta = if mv.alters(self.origin) {
            self.satisfaction_difference(&mv)
        } else {
            SatisfactionDelta::zero()
        };
        self.current_move = Some(mv);
        Some(delta)
    }

    fn satisfaction_difference(&self, mv: &SwapMove) -> SatisfactionDelta {
        let problem = self.origin.problem();
        let mut total = SatisfactionDelta::zero();
        for rank in 0..problem.rank_count() {
            for constraint in problem.constraints(rank) {
                total += constraint
                    .evaluator()
                    .satisfaction_difference(self.origin, mv);
            }
        }
        total
    }

    /// The move behind the last returned evaluation.
    #[inline]
    pub fn last_evaluated_move(&self) -> Option<SwapMove> {
        self.current_move
    }

    #[inline]
    pub fn origin(&self) -> &Solution<'p> {
        self.origin
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

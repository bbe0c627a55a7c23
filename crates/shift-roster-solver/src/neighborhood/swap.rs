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
use shift_roster_model::prelude::{Evaluation, Solution, SwapMove};
use std::collections::VecDeque;

/// Swap-based neighborhood of an origin solution, explored like an
/// iterator: [`next_neighbor_evaluation`](SwapNeighborhood::next_neighbor_evaluation)
/// prices the next candidate move,
/// [`move_to_last_evaluated_neighbor`](SwapNeighborhood::move_to_last_evaluated_neighbor)
/// commits it to the origin, and
/// [`last_evaluated_neighbor`](SwapNeighborhood::last_evaluated_neighbor)
/// materializes it as a fresh solution without touching the origin.
///
/// Enumeration walks the period one start day at a time: when the per-day
/// move queue drains, the next start day is drawn (at random if a generator
/// is present, in order otherwise) and all employee pairs are queued for
/// it. Moves are priced incrementally by summing per-constraint swap deltas
/// onto the origin's cached evaluation.
pub struct SwapNeighborhood<'p, R> {
    origin: Solution<'p>,
    block_size: usize,
    only_improving: bool,
    rng: Option<R>,
    remaining_moves: VecDeque<SwapMove>,
    remaining_start_days: VecDeque<usize>,
    current_move: Option<SwapMove>,
    current_evaluation: Option<Evaluation>,
    best_move: Option<SwapMove>,
    best_evaluation: Option<Evaluation>,
    best_checked: bool,
}

impl<'p, R> SwapNeighborhood<'p, R>
where
    R: Rng,
{
    /// Creates the neighborhood around `origin`. The origin is evaluated
    /// eagerly so move deltas always have a base to build on.
    ///
    /// With `only_improving`, enumeration silently skips moves that do not
    /// strictly improve on the origin. Without a generator, neighbors come
    /// out in deterministic order.
    pub fn new(
        mut origin: Solution<'p>,
        block_size: usize,
        only_improving: bool,
        rng: Option<R>,
    ) -> Result<Self, InvalidParameterError> {
        if block_size < 1 {
            return Err(InvalidParameterError::new("block_size", "must be at least 1"));
        }
        origin.evaluation();
        let mut neighborhood = Self {
            origin,
            block_size,
            only_improving,
            rng,
            remaining_moves: VecDeque::new(),
            remaining_start_days: VecDeque::new(),
            current_move: None,
            current_evaluation: None,
            best_move: None,
            best_evaluation: None,
            best_checked: false,
        };
        neighborhood.reset_exploration();
        Ok(neighborhood)
    }

    /// Restarts enumeration from the current origin.
    pub fn reset_exploration(&mut self) {
        self.current_move = None;
        self.current_evaluation = None;
        self.remaining_moves.clear();
        self.remaining_start_days.clear();
        let days = self.origin.num_days();
        let mut day = 0;
        while day + self.block_size <= days {
            self.remaining_start_days.push_back(day);
            day += 1;
        }
    }

    /// Refills the move queue with all employee pairs of the next start day.
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

    /// Full post-move evaluation of a candidate, from per-constraint deltas.
    fn evaluate_move(&mut self, mv: &SwapMove) -> Evaluation {
        if !mv.alters(&self.origin) {
            return self.origin.evaluation().clone();
        }
        let mut evaluation = self.origin.evaluation().clone();
        let problem = self.origin.problem();
        for rank in 0..problem.rank_count() {
            let mut delta = 0i64;
            for constraint in problem.constraints(rank) {
                delta += constraint
                    .evaluator()
                    .swap_cost_difference(&self.origin, mv);
            }
            evaluation.add_at(rank, delta);
        }
        evaluation
    }

    fn update_best(&mut self, mv: SwapMove, evaluation: Evaluation) {
        match &self.best_evaluation {
            None => {
                let improves = match self.origin.cached_evaluation() {
                    Some(origin_eval) => evaluation < *origin_eval,
                    None => false,
                };
                if !self.only_improving || improves {
                    self.best_move = Some(mv);
                    self.best_evaluation = Some(evaluation);
                }
            }
            Some(best) => {
                if evaluation < *best {
                    self.best_move = Some(mv);
                    self.best_evaluation = Some(evaluation);
                }
            }
        }
    }

    /// Evaluation of the next candidate, or `None` once the neighborhood is
    /// exhausted (or, with `only_improving`, once no improving move
    /// remains).
    pub fn next_neighbor_evaluation(&mut self) -> Option<Evaluation> {
        loop {
            let Some(mv) = self.draw_next_move() else {
                self.current_move = None;
                self.current_evaluation = None;
                return None;
            };
            let evaluation = self.evaluate_move(&mv);
            if self.only_improving {
                let improving = match self.origin.cached_evaluation() {
                    Some(origin_eval) => evaluation < *origin_eval,
                    None => false,
                };
                if !improving {
                    continue;
                }
            }
            if !self.best_checked {
                self.update_best(mv, evaluation.clone());
            }
            self.current_move = Some(mv);
            self.current_evaluation = Some(evaluation.clone());
            return Some(evaluation);
        }
    }

    /// Evaluation of the best neighbor, scanning whatever enumeration has
    /// not visited yet. Does not disturb the iterative exploration. Returns
    /// `None` for an empty neighborhood, or when `only_improving` is set
    /// and nothing beats the origin.
    pub fn best_neighbor_evaluation(&mut self) -> Option<Evaluation> {
        if self.best_checked {
            return self.best_evaluation.clone();
        }
        let queued: Vec<SwapMove> = self.remaining_moves.iter().copied().collect();
        for mv in queued {
            let evaluation = self.evaluate_move(&mv);
            self.update_best(mv, evaluation);
        }
        let days: Vec<usize> = self.remaining_start_days.iter().copied().collect();
        let employees = self.origin.num_employees();
        for start_day in days {
            for employee1 in 0..employees {
                for employee2 in (employee1 + 1)..employees {
                    let mv = SwapMove::new(employee1, employee2, start_day, self.block_size);
                    let evaluation = self.evaluate_move(&mv);
                    self.update_best(mv, evaluation);
                }
            }
        }
        self.best_checked = true;
        self.best_evaluation.clone()
    }

    /// Applies the best move to the origin and restarts enumeration.
    /// Returns `false` when there is no (improving) neighbor to move to.
    pub fn move_to_best_neighbor(&mut self) -> bool {
        if self.best_neighbor_evaluation().is_none() {
            return false;
        }
        let mv = self.best_move.take().expect("best move present");
        let evaluation = self.best_evaluation.take().expect("best evaluation present");
        self.commit_move(&mv, evaluation);
        self.best_checked = false;
        true
    }

    /// Applies the last evaluated move to the origin and restarts
    /// enumeration.
    pub fn move_to_last_evaluated_neighbor(&mut self) -> Result<(), NoSuchNeighborError> {
        let mv = self.current_move.take().ok_or(NoSuchNeighborError)?;
        let evaluation = self
            .current_evaluation
            .take()
            .ok_or(NoSuchNeighborError)?;
        self.commit_move(&mv, evaluation);
        self.best_move = None;
        self.best_evaluation = None;
        self.best_checked = false;
        Ok(())
    }

    fn commit_move(&mut self, mv: &SwapMove, evaluation: Evaluation) {
        self.origin.apply_swap(mv);
        // Cross-check the incremental prediction against a full
        // recomputation; partial swap deltas are where evaluation bugs hide.
        #[cfg(debug_assertions)]
        {
            let mut recomputed = self.origin.clone();
            recomputed.invalidate_evaluation();
            debug_assert_eq!(
                recomputed.evaluation(),
                &evaluation,
                "incremental swap evaluation diverged from full recomputation for {}",
                mv
            );
        }
        self.origin.set_evaluation(evaluation);
        self.reset_exploration();
    }

    /// The solution of the last evaluated move, leaving the origin and the
    /// exploration untouched.
    pub fn last_evaluated_neighbor(&self) -> Result<Solution<'p>, NoSuchNeighborError> {
        let mv = self.current_move.as_ref().ok_or(NoSuchNeighborError)?;
        let evaluation = self
            .current_evaluation
            .as_ref()
            .ok_or(NoSuchNeighborError)?;
        let mut neighbor = self.origin.clone();
        neighbor.apply_swap(mv);
        neighbor.set_evaluation(evaluation.clone());
        Ok(neighbor)
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

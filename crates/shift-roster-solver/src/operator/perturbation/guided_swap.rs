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
use crate::neighborhood::{SwapMoveFilter, SwapSatisfactionNeighborhood};
use crate::operator::Operator;
use crate::operator::perturbation::min_slot_exchanges;
use rand::{Rng, SeedableRng};
use shift_roster_model::prelude::{Problem, SatisfactionDelta, Solution, SwapMove};

/// How the guided perturbation picks among satisfying moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuidedSelectionPolicy {
    /// First move that newly satisfies at least one constraint unit.
    FirstSatisfying,
    /// Best such move: minimal net loss, ties to the higher satisfied
    /// count.
    BestSatisfying,
}

/// Perturbation guided by constraint satisfaction: repeatedly picks a swap
/// move that newly satisfies constraint units, rejecting moves that would
/// restore the pre-perturbation origin (a tabu-like no-return filter).
/// When no satisfying move exists, any solution-altering move is taken as a
/// fallback.
pub struct GuidedSwapPerturbation<'p, R> {
    block_sizes: Vec<usize>,
    min_slot_exchanges: usize,
    selection_policy: GuidedSelectionPolicy,
    origin: Option<Solution<'p>>,
    solution: Option<Solution<'p>>,
    done: bool,
    rng: R,
}

/// Rejects swap moves that would hand an employee back the assignment the
/// pre-perturbation origin had on any day of the window.
struct NoReturnFilter<'a, 'p> {
    origin: &'a Solution<'p>,
    current: &'a Solution<'p>,
}

impl SwapMoveFilter for NoReturnFilter<'_, '_> {
    fn accepts(&self, mv: &SwapMove) -> bool {
        for day in mv.start_day()..=mv.end_day() {
            let origin1 = self.origin.assignment(day, mv.employee1());
            let origin2 = self.origin.assignment(day, mv.employee2());
            let current1 = self.current.assignment(day, mv.employee1());
            let current2 = self.current.assignment(day, mv.employee2());
            if origin1 != current1 && origin1 == current2 {
                return false;
            }
            if origin2 != current2 && origin2 == current1 {
                return false;
            }
        }
        true
    }
}

impl<'p, R> GuidedSwapPerturbation<'p, R>
where
    R: Rng + SeedableRng,
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
                "guided perturbation needs at least three employees",
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
            selection_policy: GuidedSelectionPolicy::BestSatisfying,
            origin: None,
            solution: None,
            done: false,
            rng,
        })
    }

    pub fn with_selection_policy(mut self, policy: GuidedSelectionPolicy) -> Self {
        self.selection_policy = policy;
        self
    }

    /// Selects a perturbation move in the satisfaction neighborhood of the
    /// current solution, or `None` when the filtered neighborhood offers
    /// neither a satisfying nor an altering move.
    fn find_perturbation_move(&mut self, block_size: usize) -> Option<SwapMove> {
        let nh_rng = R::from_rng(&mut self.rng);
        let origin = self.origin.as_ref().expect("perturbation initialized");
        let solution = self.solution.as_ref().expect("perturbation initialized");
        let filter = NoReturnFilter {
            origin,
            current: solution,
        };
        let mut neighborhood =
            SwapSatisfactionNeighborhood::new(solution, block_size, Some(nh_rng), filter)
                .expect("validated block sizes");

        let mut altering_move: Option<SwapMove> = None;
        let mut selected_move: Option<SwapMove> = None;
        let mut selected_delta: Option<SatisfactionDelta> = None;

        while let Some(delta) = neighborhood.next_neighbor_evaluation() {
            let mv = neighborhood
                .last_evaluated_move()
                .expect("evaluation has a move");
            if delta.newly_satisfied > 0 {
                let replace = match &selected_delta {
                    None => true,
                    Some(incumbent) => {
                        delta.net_loss() < incumbent.net_loss()
                            || (delta.net_loss() == incumbent.net_loss()
                                && delta.newly_satisfied > incumbent.newly_satisfied)
                    }
                };
                if replace {
                    selected_move = Some(mv);
                    selected_delta = Some(delta);
                }
                if self.selection_policy == GuidedSelectionPolicy::FirstSatisfying {
                    break;
                }
            } else if altering_move.is_none() && mv.resulting_distance(solution) > 0 {
                altering_move = Some(mv);
            }
        }

        selected_move.or(altering_move)
    }

    fn perturb(&mut self) {
        if let Some(solution) = self.solution.as_mut() {
            solution.invalidate_evaluation();
        }
        let mut exchanged = 0;
        while exchanged < self.min_slot_exchanges {
            let block_size = self.block_sizes[self.rng.random_range(0..self.block_sizes.len())];
            let Some(mv) = self.find_perturbation_move(block_size) else {
                tracing::warn!("no perturbation move available; stopping early");
                break;
            };
            let solution = self.solution.as_mut().expect("perturbation initialized");
            exchanged += mv.resulting_distance(solution);
            solution.apply_swap(&mv);
        }
    }
}

impl<'p, R> Operator<'p> for GuidedSwapPerturbation<'p, R>
where
    R: Rng + SeedableRng,
{
    fn name(&self) -> &str {
        "GuidedSwapPerturbation"
    }

    fn init(&mut self, mut seeds: Vec<Solution<'p>>) -> Result<(), OperatorError> {
        if seeds.len() != 1 {
            return Err(InvalidParameterError::new(
                "seeds",
                "perturbation expects exactly one solution",
            )
            .into());
        }
        let solution = seeds.swap_remove(0);
        self.origin = Some(solution.clone());
        self.solution = Some(solution);
        self.done = false;
        Ok(())
    }

    fn next_step(&mut self) -> Result<bool, OperatorError> {
        if self.solution.is_none() {
            return Err(NotInitializedError::new("GuidedSwapPerturbation").into());
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

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

use crate::descent::{NeighborSelectionPolicy, VariableNeighborhoodDescent};
use crate::err::{InvalidParameterError, NotInitializedError, OperatorError};
use crate::operator::Operator;
use crate::operator::construction::{FastBlockConstruction, GreedyConstruction};
use crate::operator::perturbation::ExchangePerturbation;
use rand::{Rng, SeedableRng};
use shift_roster_model::prelude::{Problem, Solution};

/// Single-thread iterated local search, driven as an explicit state
/// machine: one [`next_step`](IteratedLocalSearch::next_step) call advances
/// the machine by one small unit of work (one descent move, one acceptance
/// decision, one construction), so the owning worker can poll its stop
/// predicate between steps.
///
/// Iteration 0 builds (or greedily reconstructs) the starting solution.
/// Each subsequent iteration descends to a local optimum, applies the
/// acceptance criterion against the best solution found since the last
/// restart, perturbs, and descends again. After `restart_iterations`
/// iterations without improvement the search restarts from a fresh random
/// construction.
pub struct IteratedLocalSearch<'p, R> {
    max_iterations: u64,
    worse_solution_acceptance_rate: f64,
    restart_iterations: u64,
    rng: R,
    initial: Option<Solution<'p>>,
    overall_best: Option<Solution<'p>>,
    restart_best: Option<Solution<'p>>,
    restart_best_iteration: u64,
    current_is_restart_best: bool,
    last_accepted: Option<Solution<'p>>,
    current_iteration: u64,
    local_search: VariableNeighborhoodDescent<'p, R>,
    perturbation: ExchangePerturbation<'p, R>,
    generation: FastBlockConstruction<'p, R>,
    reconstruction: GreedyConstruction<'p, R>,
}

impl<'p, R> IteratedLocalSearch<'p, R>
where
    R: Rng + SeedableRng,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        problem: &'p Problem,
        max_iterations: u64,
        perturbation_strength: f64,
        worse_solution_acceptance_rate: f64,
        block_sizes: Vec<usize>,
        mut rng: R,
        selection_policy: NeighborSelectionPolicy,
        restart_iterations: u64,
    ) -> Result<Self, InvalidParameterError> {
        if max_iterations < 1 {
            return Err(InvalidParameterError::new(
                "max_iterations",
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&worse_solution_acceptance_rate) {
            return Err(InvalidParameterError::new(
                "worse_solution_acceptance_rate",
                "must lie in [0, 1]",
            ));
        }
        let local_search = VariableNeighborhoodDescent::new(
            block_sizes.clone(),
            selection_policy,
            R::from_rng(&mut rng),
        )?;
        let perturbation = ExchangePerturbation::new(
            problem,
            block_sizes,
            perturbation_strength,
            R::from_rng(&mut rng),
        )?;
        let generation = FastBlockConstruction::new(problem, R::from_rng(&mut rng))?;
        let reconstruction = GreedyConstruction::new(problem, R::from_rng(&mut rng))?;
        Ok(Self {
            max_iterations,
            worse_solution_acceptance_rate,
            restart_iterations,
            rng,
            initial: None,
            overall_best: None,
            restart_best: None,
            restart_best_iteration: 0,
            current_is_restart_best: false,
            last_accepted: None,
            current_iteration: 0,
            local_search,
            perturbation,
            generation,
            reconstruction,
        })
    }

    /// (Re)initializes the search. With `None`, the starting solution is
    /// generated by fast block construction; an explicit initial solution
    /// is greedily reconstructed instead.
    pub fn init(&mut self, initial: Option<Solution<'p>>) {
        self.initial = initial;
        self.overall_best = None;
        self.restart_best = None;
        self.restart_best_iteration = 0;
        self.current_is_restart_best = false;
        self.last_accepted = None;
        self.current_iteration = 0;
    }

    /// Advances the machine by one step. Returns `false` once the iteration
    /// budget is exhausted.
    pub fn next_step(&mut self) -> Result<bool, OperatorError> {
        if self.current_iteration == 0 {
            self.current_iteration = 1;
            let mut current = match self.initial.take() {
                None => {
                    self.generation.init(Vec::new())?;
                    self.generation.run_to_completion()?;
                    self.generation
                        .take_result()
                        .expect("completed construction has a result")
                }
                Some(seed) => {
                    self.reconstruction.init(vec![seed])?;
                    self.reconstruction.run_to_completion()?;
                    self.reconstruction
                        .take_result()
                        .expect("completed reconstruction has a result")
                }
            };
            current.evaluation();
            self.consider_best_found(&current, true);
            self.last_accepted = Some(current.clone());
            self.local_search.init(current);
            return Ok(true);
        }

        if self.current_iteration > self.max_iterations {
            return Ok(false);
        }

        if self.local_search.is_done() {
            let current = self
                .local_search
                .take_solution()
                .ok_or_else(|| NotInitializedError::new("IteratedLocalSearch"))?;
            let accepted = self.apply_acceptance(current)?;
            self.local_search.init(accepted);
            return Ok(true);
        }

        self.local_search.next_step()?;
        self.update_best_from_descent();
        if self.local_search.is_done() {
            self.current_iteration += 1;
        }
        Ok(true)
    }

    /// Acceptance criterion applied once the descent has converged; returns
    /// the solution the next iteration starts from (already perturbed where
    /// the criterion asks for it).
    fn apply_acceptance(
        &mut self,
        mut current: Solution<'p>,
    ) -> Result<Solution<'p>, OperatorError> {
        if self.current_iteration - self.restart_best_iteration > self.restart_iterations {
            // Restart from scratch.
            self.generation.init(Vec::new())?;
            self.generation.run_to_completion()?;
            let mut generated = self
                .generation
                .take_result()
                .expect("completed construction has a result");
            generated.evaluation();
            tracing::debug!(
                iteration = self.current_iteration,
                evaluation = %generated.cached_evaluation().expect("just evaluated"),
                "restarting from a fresh construction"
            );
            self.restart_best = Some(generated.clone());
            self.restart_best_iteration = self.current_iteration;
            self.current_is_restart_best = false;
            self.last_accepted = Some(generated.clone());
            return Ok(generated);
        }

        if self.current_is_restart_best {
            // The descent ended on the restart best; keep it as the accepted
            // solution and perturb a copy of it.
            current = self
                .restart_best
                .as_ref()
                .expect("restart best tracked since iteration 0")
                .clone();
            self.last_accepted = Some(current.clone());
            self.current_is_restart_best = false;
            return self.perturb(current);
        }

        let restart_best_eval = self
            .restart_best
            .as_mut()
            .expect("restart best tracked since iteration 0")
            .evaluation()
            .clone();
        if *current.evaluation() > restart_best_eval {
            // Worse than the incumbent: fall back to it unless the
            // acceptance rate lets the worse solution through.
            if self.rng.random::<f64>() > self.worse_solution_acceptance_rate {
                current = self
                    .restart_best
                    .as_ref()
                    .expect("restart best tracked since iteration 0")
                    .clone();
            }
            self.last_accepted = Some(current.clone());
        }
        self.current_is_restart_best = false;
        self.perturb(current)
    }

    fn perturb(&mut self, current: Solution<'p>) -> Result<Solution<'p>, OperatorError> {
        self.perturbation.init(vec![current])?;
        self.perturbation.run_to_completion()?;
        Ok(self
            .perturbation
            .take_result()
            .expect("completed perturbation has a result"))
    }

    fn update_best_from_descent(&mut self) {
        let improves = {
            let Some(current) = self.local_search.current() else {
                return;
            };
            let Some(evaluation) = current.cached_evaluation() else {
                return;
            };
            let beats_restart = match &self.restart_best {
                None => true,
                Some(best) => best
                    .cached_evaluation()
                    .is_none_or(|best_eval| evaluation < best_eval),
            };
            let beats_overall = match &self.overall_best {
                None => true,
                Some(best) => best
                    .cached_evaluation()
                    .is_none_or(|best_eval| evaluation < best_eval),
            };
            beats_restart || beats_overall
        };
        if improves {
            let candidate = self
                .local_search
                .current()
                .expect("descent owns a solution")
                .clone();
            self.consider_best_found(&candidate, true);
        }
    }

    /// Updates the overall and restart best-found solutions with an
    /// evaluated candidate. `from_current` marks candidates coming from
    /// this machine's own descent; external solutions (shared by sibling
    /// threads) never mark the current solution as the restart best.
    fn consider_best_found(&mut self, candidate: &Solution<'p>, from_current: bool) -> bool {
        let Some(candidate_eval) = candidate.cached_evaluation() else {
            return false;
        };
        let mut updated = false;

        let replace_overall = match &mut self.overall_best {
            None => {
                updated = true;
                true
            }
            Some(best) => *best.evaluation() > *candidate_eval,
        };
        if replace_overall {
            self.overall_best = Some(candidate.clone());
        }

        let replace_restart = match &mut self.restart_best {
            None => true,
            Some(best) => *best.evaluation() > *candidate_eval,
        };
        if replace_restart {
            self.restart_best = Some(candidate.clone());
            self.restart_best_iteration = self.current_iteration;
            if from_current {
                self.current_is_restart_best = true;
            }
            updated = true;
        }
        updated
    }

    /// Merges a solution found by another thread into this machine's
    /// best-found state.
    pub fn update_best_found_external(&mut self, solution: Solution<'p>) -> bool {
        let mut candidate = solution;
        candidate.evaluation();
        self.consider_best_found(&candidate, false)
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.current_iteration > self.max_iterations
    }

    #[inline]
    pub fn current_iteration(&self) -> u64 {
        self.current_iteration
    }

    /// Best solution found so far, `None` before the initial construction.
    #[inline]
    pub fn best_found(&self) -> Option<&Solution<'p>> {
        self.overall_best.as_ref()
    }

    /// The accepted solution the running iteration started from.
    #[inline]
    pub fn last_accepted(&self) -> Option<&Solution<'p>> {
        self.last_accepted.as_ref()
    }

    /// The solution the descent is currently working on.
    #[inline]
    pub fn current_solution(&self) -> Option<&Solution<'p>> {
        self.local_search.current()
    }
}

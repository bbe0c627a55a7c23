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
use crate::engine::pool::{InsertionStrategy, SolutionPool};
use crate::engine::shared::{CancelToken, SharedBestFound};
use crate::err::{InvalidParameterError, OperatorError};
use crate::operator::Operator;
use crate::operator::construction::FastBlockConstruction;
use crate::operator::perturbation::ExchangePerturbation;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shift_roster_model::prelude::{Evaluation, Problem, Solution};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

const DRIVER_POLL_PERIOD: Duration = Duration::from_millis(500);

/// Parameter set for the memetic worker.
#[derive(Debug, Clone, PartialEq)]
pub struct MemeticSettings {
    pub max_iterations: u64,
    pub time_limit: Duration,
    pub perturbation_strength: f64,
    pub local_search_block_sizes: Vec<usize>,
    pub crossover_block_sizes: Vec<usize>,
    pub rng_seed: u64,
    pub nb_threads: usize,
    pub population_size: usize,
    pub worst_set_ratio: f64,
    pub insertion_strategy: InsertionStrategy,
}

impl Default for MemeticSettings {
    fn default() -> Self {
        Self {
            max_iterations: u64::MAX,
            time_limit: Duration::from_secs(400),
            perturbation_strength: 0.03,
            local_search_block_sizes: (1..=7).collect(),
            crossover_block_sizes: vec![1, 5, 7],
            rng_seed: 0,
            nb_threads: 3,
            population_size: 30,
            worst_set_ratio: 0.1,
            insertion_strategy: InsertionStrategy::ReplaceInWorstSet,
        }
    }
}

impl MemeticSettings {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    #[inline]
    pub fn with_perturbation_strength(mut self, strength: f64) -> Self {
        self.perturbation_strength = strength;
        self
    }

    #[inline]
    pub fn with_local_search_block_sizes(mut self, block_sizes: Vec<usize>) -> Self {
        self.local_search_block_sizes = block_sizes;
        self
    }

    #[inline]
    pub fn with_crossover_block_sizes(mut self, block_sizes: Vec<usize>) -> Self {
        self.crossover_block_sizes = block_sizes;
        self
    }

    #[inline]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    #[inline]
    pub fn with_nb_threads(mut self, nb_threads: usize) -> Self {
        self.nb_threads = nb_threads;
        self
    }

    #[inline]
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    #[inline]
    pub fn with_worst_set_ratio(mut self, ratio: f64) -> Self {
        self.worst_set_ratio = ratio;
        self
    }

    #[inline]
    pub fn with_insertion_strategy(mut self, strategy: InsertionStrategy) -> Self {
        self.insertion_strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        if self.max_iterations < 1 {
            return Err(InvalidParameterError::new(
                "max_iterations",
                "must be at least 1",
            ));
        }
        if self.time_limit.is_zero() {
            return Err(InvalidParameterError::new(
                "time_limit",
                "must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.perturbation_strength) {
            return Err(InvalidParameterError::new(
                "perturbation_strength",
                "must lie in [0, 1]",
            ));
        }
        if self.local_search_block_sizes.is_empty()
            || self.local_search_block_sizes.iter().any(|size| *size < 1)
        {
            return Err(InvalidParameterError::new(
                "local_search_block_sizes",
                "must be non-empty with sizes of at least 1",
            ));
        }
        if self.crossover_block_sizes.is_empty()
            || self.crossover_block_sizes.iter().any(|size| *size < 1)
        {
            return Err(InvalidParameterError::new(
                "crossover_block_sizes",
                "must be non-empty with sizes of at least 1",
            ));
        }
        if self.nb_threads < 1 {
            return Err(InvalidParameterError::new(
                "nb_threads",
                "must be at least 1",
            ));
        }
        if self.population_size < 1 {
            return Err(InvalidParameterError::new(
                "population_size",
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.worst_set_ratio) {
            return Err(InvalidParameterError::new(
                "worst_set_ratio",
                "must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemeticStep {
    GetSolution,
    Mutation,
    LocalSearch,
}

/// Threaded memetic search: a bounded solution pool plus N identical
/// threads, each looping offspring selection (crossover of two random
/// parents), mutation (exchange perturbation) and local search (VND),
/// submitting every refined solution back to the pool and the shared
/// best-found slot.
pub struct MemeticAlgorithmWorker<'p> {
    problem: &'p Problem,
    settings: MemeticSettings,
    pool: SolutionPool<'p>,
    best_found: SharedBestFound<'p>,
    iteration_count: AtomicU64,
    progress: AtomicU32,
    cancel: CancelToken,
    done: AtomicBool,
}

impl<'p> MemeticAlgorithmWorker<'p> {
    pub fn new(
        problem: &'p Problem,
        initial: Option<Solution<'p>>,
        settings: MemeticSettings,
    ) -> Result<Self, InvalidParameterError> {
        settings.validate()?;
        // Fail fast on anything the per-thread operators would reject.
        ExchangePerturbation::new(
            problem,
            settings.local_search_block_sizes.clone(),
            settings.perturbation_strength,
            ChaCha8Rng::seed_from_u64(settings.rng_seed),
        )?;
        let pool = SolutionPool::new(
            settings.population_size,
            settings.insertion_strategy,
            settings.worst_set_ratio,
            settings.crossover_block_sizes.clone(),
            settings.rng_seed,
        )?;
        if let Some(initial) = initial {
            pool.select(initial);
        }
        Ok(Self {
            problem,
            settings,
            pool,
            best_found: SharedBestFound::new(),
            iteration_count: AtomicU64::new(0),
            progress: AtomicU32::new(0),
            cancel: CancelToken::new(),
            done: AtomicBool::new(false),
        })
    }

    /// Runs the optimization to the stop predicate and returns a copy of
    /// the best solution found.
    pub fn run(&self) -> Option<Solution<'p>> {
        let start = Instant::now();
        self.iteration_count.store(0, Ordering::Relaxed);
        self.progress.store(0, Ordering::Relaxed);
        self.done.store(false, Ordering::Relaxed);

        std::thread::scope(|scope| {
            for thread_index in 0..self.settings.nb_threads {
                scope.spawn(move || self.run_search_thread(thread_index, start));
            }
            while !self.stop_optimization(start) {
                self.update_progress(start);
                std::thread::sleep(DRIVER_POLL_PERIOD);
            }
        });

        self.done.store(true, Ordering::Relaxed);
        self.progress.store(100, Ordering::Relaxed);
        self.best_found()
    }

    fn run_search_thread(&self, thread_index: usize, start: Instant) {
        let mut rng = ChaCha8Rng::seed_from_u64(
            self.settings.rng_seed.wrapping_add(thread_index as u64),
        );
        let operators: Result<_, InvalidParameterError> = (|| {
            let generation =
                FastBlockConstruction::new(self.problem, ChaCha8Rng::from_rng(&mut rng))?;
            let mutation = ExchangePerturbation::new(
                self.problem,
                self.settings.local_search_block_sizes.clone(),
                self.settings.perturbation_strength,
                ChaCha8Rng::from_rng(&mut rng),
            )?;
            let local_search = VariableNeighborhoodDescent::new(
                self.settings.local_search_block_sizes.clone(),
                NeighborSelectionPolicy::FirstImproving,
                ChaCha8Rng::from_rng(&mut rng),
            )?;
            Ok((generation, mutation, local_search))
        })();
        let (mut generation, mut mutation, mut local_search) = match operators {
            Ok(operators) => operators,
            Err(error) => {
                tracing::error!(%error, thread_index, "failed to build a memetic thread");
                return;
            }
        };

        let mut step = MemeticStep::GetSolution;
        let mut last_completed: Option<Solution<'p>> = None;

        while !self.stop_optimization(start) {
            let advanced: Result<(), OperatorError> = match step {
                MemeticStep::GetSolution => match self.pool.offspring() {
                    None => (|| {
                        generation.init(Vec::new())?;
                        generation.run_to_completion()?;
                        let solution = generation
                            .take_result()
                            .expect("completed construction has a result");
                        local_search.init(solution);
                        step = MemeticStep::LocalSearch;
                        Ok(())
                    })(),
                    Some(offspring) => (|| {
                        mutation.init(vec![offspring])?;
                        step = MemeticStep::Mutation;
                        Ok(())
                    })(),
                },
                MemeticStep::Mutation => (|| {
                    if !mutation.is_done() {
                        mutation.next_step()?;
                    } else {
                        let solution = mutation
                            .take_result()
                            .expect("completed mutation has a result");
                        local_search.init(solution);
                        step = MemeticStep::LocalSearch;
                    }
                    Ok(())
                })(),
                MemeticStep::LocalSearch => (|| {
                    if !local_search.is_done() {
                        local_search.next_step()?;
                    } else {
                        let mut solution = local_search
                            .take_solution()
                            .expect("descent owns the solution");
                        solution.evaluation();
                        self.pool.select(solution.clone());
                        if self.best_found.try_update(&solution) {
                            self.update_progress(start);
                        }
                        self.iteration_count.fetch_add(1, Ordering::Relaxed);
                        last_completed = Some(solution);
                        step = MemeticStep::GetSolution;
                    }
                    Ok(())
                })(),
            };
            if let Err(error) = advanced {
                // Drop the solution in flight and go back to selection.
                tracing::warn!(%error, thread_index, "memetic step failed; dropping the solution");
                step = MemeticStep::GetSolution;
            }
        }
        if let Some(solution) = last_completed {
            self.best_found.try_update(&solution);
        }
    }

    /// Global stop predicate, polled by every thread between steps.
    pub fn stop_optimization(&self, start: Instant) -> bool {
        if self.is_done() {
            return true;
        }
        if start.elapsed() > self.settings.time_limit {
            return true;
        }
        if self.iteration_count.load(Ordering::Relaxed) > self.settings.max_iterations {
            return true;
        }
        false
    }

    fn update_progress(&self, start: Instant) {
        let iteration_progress = if self.settings.max_iterations == u64::MAX {
            0.0
        } else {
            self.iteration_count.load(Ordering::Relaxed) as f64
                / self.settings.max_iterations as f64
                * 100.0
        };
        let time_progress =
            start.elapsed().as_secs_f64() / self.settings.time_limit.as_secs_f64() * 100.0;
        let progress = iteration_progress.max(time_progress).clamp(0.0, 99.0) as u32;
        self.progress.store(progress, Ordering::Relaxed);
    }

    #[inline]
    pub fn best_found(&self) -> Option<Solution<'p>> {
        self.best_found.best_found()
    }

    #[inline]
    pub fn best_found_better_than(&self, limit: Option<&Evaluation>) -> Option<Solution<'p>> {
        self.best_found.best_found_better_than(limit)
    }

    #[inline]
    pub fn best_found_evaluation(&self) -> Option<Evaluation> {
        self.best_found.best_evaluation()
    }

    #[inline]
    pub fn progress(&self) -> u32 {
        self.progress.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_iterations(&self) -> u64 {
        self.iteration_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Relaxed) || self.cancel.is_cancelled()
    }

    #[inline]
    pub fn pool(&self) -> &SolutionPool<'p> {
        &self.pool
    }

    #[inline]
    pub fn settings(&self) -> &MemeticSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shift_roster_model::constraint::consecutive::MaxConsecutiveWorkDaysConstraint;
    use shift_roster_model::constraint::coverage::ShiftCoverageConstraint;
    use shift_roster_model::constraint::requests::DayOffRequestsConstraint;
    use shift_roster_model::prelude::{DayOfWeek, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(7, DayOfWeek::Monday);
        let s1 = builder.add_shift("Early");
        let s2 = builder.add_shift("Late");
        let c = builder.add_contract("c", 3);
        for e in 0..5 {
            builder.add_employee(format!("E{}", e), c);
        }
        for day in 0..7 {
            builder.set_demand(s1, day, 1);
            builder.set_demand(s2, day, 1);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.add_constraint(
            1,
            Box::new(
                DayOffRequestsConstraint::new(1)
                    .with_request(1, 2)
                    .with_request(4, 6),
            ),
        );
        builder.add_constraint(1, Box::new(MaxConsecutiveWorkDaysConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    fn settings() -> MemeticSettings {
        MemeticSettings::new()
            .with_time_limit(Duration::from_millis(300))
            .with_nb_threads(2)
            .with_population_size(8)
            .with_local_search_block_sizes(vec![1, 2])
            .with_rng_seed(19)
    }

    #[test]
    fn invalid_settings_are_rejected_at_construction() {
        let problem = problem();
        assert!(
            MemeticAlgorithmWorker::new(&problem, None, settings().with_population_size(0))
                .is_err()
        );
        assert!(
            MemeticAlgorithmWorker::new(
                &problem,
                None,
                settings().with_crossover_block_sizes(vec![])
            )
            .is_err()
        );
    }

    #[test]
    fn run_fills_the_pool_and_returns_a_covered_best() {
        let problem = problem();
        let worker =
            MemeticAlgorithmWorker::new(&problem, None, settings()).expect("valid settings");
        let best = worker.run().expect("a solution was found");

        assert_eq!(best.total_unassigned_slots(), 0);
        assert!(worker.is_done());
        assert_eq!(worker.progress(), 100);
        assert!(worker.total_iterations() > 0);
        assert!(worker.pool().len() > 0);
        assert!(worker.pool().len() <= worker.settings().population_size);
    }

    #[test]
    fn initial_solution_joins_the_pool() {
        let problem = problem();
        let worker =
            MemeticAlgorithmWorker::new(&problem, Some(Solution::new(&problem)), settings())
                .expect("valid settings");
        assert_eq!(worker.pool().len(), 1);
    }

    #[test]
    fn best_found_is_at_least_as_good_as_every_pool_member() {
        let problem = problem();
        let worker =
            MemeticAlgorithmWorker::new(&problem, None, settings()).expect("valid settings");
        worker.run().expect("a solution was found");

        let best_eval = worker.best_found_evaluation().expect("best recorded");
        for member_eval in worker.pool().evaluations() {
            assert!(best_eval <= member_eval);
        }
    }

    #[test]
    fn cancellation_stops_all_threads_promptly() {
        let problem = problem();
        let worker = MemeticAlgorithmWorker::new(
            &problem,
            None,
            settings().with_time_limit(Duration::from_secs(120)),
        )
        .expect("valid settings");
        let token = worker.cancel_token();

        let started = Instant::now();
        std::thread::scope(|scope| {
            let handle = scope.spawn(|| worker.run());
            std::thread::sleep(Duration::from_millis(100));
            token.cancel();
            let _ = handle.join().expect("worker thread joins");
        });
        assert!(started.elapsed() < Duration::from_secs(30));
        assert!(worker.is_done());
    }
}

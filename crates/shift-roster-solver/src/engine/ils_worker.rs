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

use crate::engine::shared::{CancelToken, SharedBestFound};
use crate::err::InvalidParameterError;
use crate::search::{IlsSettings, IteratedLocalSearch};
use crate::trace::{IlsIterationRecord, Trace, TraceRecord};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shift_roster_model::prelude::{Evaluation, Problem, Solution};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

const DRIVER_POLL_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct WorkerTraces {
    solving: Option<Trace<Evaluation>>,
    iteration: Option<Trace<IlsIterationRecord>>,
}

/// Threaded iterated local search: N independent search threads, each
/// stepping its own [`IteratedLocalSearch`] machine with an unlimited
/// iteration budget, coordinated by a shared best-found slot and a global
/// stop predicate (cancellation, wall-clock limit, total iterations).
///
/// The calling thread acts as the driver: it refreshes progress every
/// ~500 ms until the stop predicate fires, then joins the search threads.
pub struct IteratedLocalSearchWorker<'p> {
    problem: &'p Problem,
    settings: IlsSettings,
    best_found: SharedBestFound<'p>,
    total_iterations: AtomicU64,
    progress: AtomicU32,
    cancel: CancelToken,
    done: AtomicBool,
    traces: Mutex<WorkerTraces>,
}

impl<'p> IteratedLocalSearchWorker<'p> {
    pub fn new(problem: &'p Problem, settings: IlsSettings) -> Result<Self, InvalidParameterError> {
        settings.validate()?;
        // Fail fast on anything the per-thread machines would reject.
        IteratedLocalSearch::new(
            problem,
            u64::MAX,
            settings.perturbation_strength,
            settings.worse_solution_acceptance_rate,
            settings.block_sizes.clone(),
            ChaCha8Rng::seed_from_u64(settings.rng_seed),
            settings.selection_policy,
            settings.restart_iterations,
        )?;
        Ok(Self {
            problem,
            settings,
            best_found: SharedBestFound::new(),
            total_iterations: AtomicU64::new(0),
            progress: AtomicU32::new(0),
            cancel: CancelToken::new(),
            done: AtomicBool::new(false),
            traces: Mutex::new(WorkerTraces::default()),
        })
    }

    /// Runs the optimization to the stop predicate and returns a copy of
    /// the best solution found, `None` when cancelled before the first
    /// construction completed.
    pub fn run(&self, initial: Option<&Solution<'p>>) -> Option<Solution<'p>> {
        let start = Instant::now();
        {
            let mut traces = self.traces.lock();
            traces.solving = self
                .settings
                .record_trace
                .then(|| Trace::new("iterated-local-search"));
            traces.iteration = self
                .settings
                .record_full_iteration_trace
                .then(|| Trace::new("iterated-local-search"));
        }
        self.total_iterations.store(0, Ordering::Relaxed);
        self.progress.store(0, Ordering::Relaxed);
        self.done.store(false, Ordering::Relaxed);

        std::thread::scope(|scope| {
            for thread_index in 0..self.settings.nb_threads {
                let thread_initial = initial.cloned();
                scope.spawn(move || self.run_search_thread(thread_index, start, thread_initial));
            }
            // Driver loop: progress and cancellation only.
            while !self.stop_optimization(start) {
                self.update_progress(start);
                std::thread::sleep(DRIVER_POLL_PERIOD);
            }
        });

        self.update_trace_record(start, true);
        self.done.store(true, Ordering::Relaxed);
        self.progress.store(100, Ordering::Relaxed);
        self.best_found()
    }

    fn run_search_thread(
        &self,
        thread_index: usize,
        start: Instant,
        initial: Option<Solution<'p>>,
    ) {
        let rng = ChaCha8Rng::seed_from_u64(
            self.settings.rng_seed.wrapping_add(thread_index as u64),
        );
        let mut search = match IteratedLocalSearch::new(
            self.problem,
            u64::MAX,
            self.settings.perturbation_strength,
            self.settings.worse_solution_acceptance_rate,
            self.settings.block_sizes.clone(),
            rng,
            self.settings.selection_policy,
            self.settings.restart_iterations,
        ) {
            Ok(search) => search,
            Err(error) => {
                tracing::error!(%error, thread_index, "failed to build a search thread");
                return;
            }
        };
        search.init(initial);
        let share_best_found = self.settings.share_best_found && self.settings.nb_threads > 1;

        while !self.stop_optimization(start) {
            let iteration_before = search.current_iteration();
            if let Err(error) = search.next_step() {
                // Never let a steady-state failure kill the thread: drop the
                // solution and restart from a fresh construction.
                tracing::warn!(%error, thread_index, "search step failed; restarting the machine");
                search.init(None);
                continue;
            }
            if search.current_iteration() > iteration_before {
                let global_iteration = self.total_iterations.fetch_add(1, Ordering::Relaxed) + 1;
                self.add_iteration_record(start, global_iteration, &search);
            }
            if let Some(best) = search.best_found()
                && self.best_found.try_update(best)
            {
                self.update_progress(start);
            }
            if share_best_found {
                let limit = search
                    .best_found()
                    .and_then(|best| best.cached_evaluation().cloned());
                if let Some(better) = self.best_found.best_found_better_than(limit.as_ref()) {
                    search.update_best_found_external(better);
                }
            }
            self.update_trace_record(start, false);
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
        if self.total_iterations.load(Ordering::Relaxed) > self.settings.max_iterations {
            return true;
        }
        false
    }

    fn update_progress(&self, start: Instant) {
        let iteration_progress = if self.settings.max_iterations == u64::MAX {
            0.0
        } else {
            self.total_iterations.load(Ordering::Relaxed) as f64
                / self.settings.max_iterations as f64
                * 100.0
        };
        let time_progress =
            start.elapsed().as_secs_f64() / self.settings.time_limit.as_secs_f64() * 100.0;
        let progress = iteration_progress.max(time_progress).clamp(0.0, 99.0) as u32;
        self.progress.store(progress, Ordering::Relaxed);
    }

    /// Appends a best-found record subject to the force/period/changed
    /// rules.
    fn update_trace_record(&self, start: Instant, force: bool) {
        let Some(best_eval) = self.best_found.best_evaluation() else {
            return;
        };
        let mut traces = self.traces.lock();
        let Some(trace) = traces.solving.as_mut() else {
            return;
        };
        let elapsed_nanos = start.elapsed().as_nanos() as u64;
        let period_nanos = self.settings.trace_record_period.as_nanos() as u64;
        let push = if force || trace.is_empty() {
            true
        } else {
            let last = trace.last_record().expect("trace not empty");
            elapsed_nanos.saturating_sub(last.elapsed_nanos()) > period_nanos
                || *last.value() != best_eval
        };
        if push {
            trace.push(TraceRecord::new(elapsed_nanos, best_eval));
        }
    }

    fn add_iteration_record(
        &self,
        start: Instant,
        iteration: u64,
        search: &IteratedLocalSearch<'p, ChaCha8Rng>,
    ) {
        let mut traces = self.traces.lock();
        let Some(trace) = traces.iteration.as_mut() else {
            return;
        };
        let (Some(best), Some(accepted), Some(current)) = (
            search.best_found(),
            search.last_accepted(),
            search.current_solution(),
        ) else {
            return;
        };
        let (Some(best_eval), Some(accepted_eval), Some(current_eval)) = (
            best.cached_evaluation(),
            accepted.cached_evaluation(),
            current.cached_evaluation(),
        ) else {
            return;
        };
        trace.push(TraceRecord::new(
            start.elapsed().as_nanos() as u64,
            IlsIterationRecord::new(
                iteration,
                best_eval.clone(),
                accepted_eval.clone(),
                current_eval.clone(),
                current.distance_to(accepted),
            ),
        ));
    }

    /// A copy of the best solution found so far.
    #[inline]
    pub fn best_found(&self) -> Option<Solution<'p>> {
        self.best_found.best_found()
    }

    /// A copy of the best solution, only when strictly better than `limit`.
    #[inline]
    pub fn best_found_better_than(&self, limit: Option<&Evaluation>) -> Option<Solution<'p>> {
        self.best_found.best_found_better_than(limit)
    }

    #[inline]
    pub fn best_found_evaluation(&self) -> Option<Evaluation> {
        self.best_found.best_evaluation()
    }

    /// Progress percentage: `max(iteration progress, time progress)`,
    /// clamped to 99 while running, 100 once done.
    #[inline]
    pub fn progress(&self) -> u32 {
        self.progress.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_iterations(&self) -> u64 {
        self.total_iterations.load(Ordering::Relaxed)
    }

    /// Token callers use to cancel the optimization from another thread.
    #[inline]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Relaxed) || self.cancel.is_cancelled()
    }

    /// Best-found-value trace of the last run, when recording was enabled.
    pub fn solving_trace(&self) -> Option<Trace<Evaluation>> {
        self.traces.lock().solving.clone()
    }

    /// Per-iteration trace of the last run, when recording was enabled.
    pub fn iteration_trace(&self) -> Option<Trace<IlsIterationRecord>> {
        self.traces.lock().iteration.clone()
    }

    #[inline]
    pub fn settings(&self) -> &IlsSettings {
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
                    .with_request(0, 1)
                    .with_request(3, 2),
            ),
        );
        builder.add_constraint(1, Box::new(MaxConsecutiveWorkDaysConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    fn settings() -> IlsSettings {
        IlsSettings::new()
            .with_time_limit(Duration::from_millis(300))
            .with_nb_threads(2)
            .with_block_sizes(vec![1, 2])
            .with_rng_seed(7)
            .with_record_trace(true)
            .with_trace_record_period(Duration::from_millis(10))
    }

    #[test]
    fn invalid_settings_are_rejected_at_construction() {
        let problem = problem();
        let bad = IlsSettings::new().with_nb_threads(0);
        assert!(IteratedLocalSearchWorker::new(&problem, bad).is_err());
    }

    #[test]
    fn run_returns_a_covered_solution_and_finishes() {
        let problem = problem();
        let worker =
            IteratedLocalSearchWorker::new(&problem, settings()).expect("valid settings");
        let best = worker.run(None).expect("a solution was found");
        assert_eq!(best.total_unassigned_slots(), 0);
        assert!(worker.is_done());
        assert_eq!(worker.progress(), 100);
        assert!(worker.total_iterations() > 0);
        assert_eq!(
            worker.best_found_evaluation(),
            best.cached_evaluation().cloned()
        );
    }

    #[test]
    fn trace_records_are_time_ordered_and_monotone() {
        let problem = problem();
        let worker =
            IteratedLocalSearchWorker::new(&problem, settings()).expect("valid settings");
        worker.run(None).expect("a solution was found");

        let trace = worker.solving_trace().expect("trace recorded");
        assert!(!trace.is_empty());
        let mut previous_time = 0;
        let mut previous_value: Option<Evaluation> = None;
        for record in trace.iter() {
            assert!(record.elapsed_nanos() >= previous_time);
            previous_time = record.elapsed_nanos();
            if let Some(previous) = &previous_value {
                assert!(record.value() <= previous, "best-found never worsens");
            }
            previous_value = Some(record.value().clone());
        }
    }

    #[test]
    fn iteration_trace_carries_global_iteration_numbers() {
        let problem = problem();
        let worker = IteratedLocalSearchWorker::new(
            &problem,
            settings().with_record_full_iteration_trace(true),
        )
        .expect("valid settings");
        worker.run(None).expect("a solution was found");

        let trace = worker.iteration_trace().expect("trace recorded");
        assert!(!trace.is_empty());
        for record in trace.iter() {
            assert!(record.value().iteration() >= 1);
        }
    }

    #[test]
    fn iteration_budget_stops_the_worker() {
        let problem = problem();
        let worker = IteratedLocalSearchWorker::new(
            &problem,
            settings()
                .with_time_limit(Duration::from_secs(60))
                .with_max_iterations(5),
        )
        .expect("valid settings");
        let started = Instant::now();
        worker.run(None).expect("a solution was found");
        assert!(started.elapsed() < Duration::from_secs(30));
        assert!(worker.total_iterations() > 5);
    }

    #[test]
    fn cancellation_stops_all_threads_promptly() {
        let problem = problem();
        let worker = IteratedLocalSearchWorker::new(
            &problem,
            settings().with_time_limit(Duration::from_secs(120)),
        )
        .expect("valid settings");
        let token = worker.cancel_token();

        let started = Instant::now();
        std::thread::scope(|scope| {
            let handle = scope.spawn(|| worker.run(None));
            std::thread::sleep(Duration::from_millis(100));
            token.cancel();
            let _ = handle.join().expect("worker thread joins");
        });
        // Threads observe the token at their next poll; nowhere near the
        // 120 s time limit.
        assert!(started.elapsed() < Duration::from_secs(30));
        assert!(worker.is_done());
    }

    #[test]
    fn initial_solution_seeds_the_search() {
        let problem = problem();
        let worker =
            IteratedLocalSearchWorker::new(&problem, settings()).expect("valid settings");
        let initial = Solution::new(&problem);
        let best = worker.run(Some(&initial)).expect("a solution was found");
        // The empty seed was reconstructed into full coverage.
        assert_eq!(best.total_unassigned_slots(), 0);
    }
}

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

use parking_lot::Mutex;
use shift_roster_model::prelude::{Evaluation, Solution};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cheap cooperative cancellation token shared across threads. Search
/// threads poll it between steps; there is no forced preemption.
#[derive(Clone, Default, Debug)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed)
    }
}

impl PartialEq for CancelToken {
    /// Equality is based on identity (same underlying Arc), not current
    /// value.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for CancelToken {}

impl std::fmt::Display for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CancelToken(cancelled: {})", self.is_cancelled())
    }
}

/// Shared best-found slot of a worker. Replacement is monotone: a stored
/// solution only ever gives way to a strictly better one, and every
/// solution crossing the boundary is deep-copied inside the critical
/// section so callers never observe a torn timetable.
#[derive(Debug, Default)]
pub struct SharedBestFound<'p> {
    best: Mutex<Option<Solution<'p>>>,
}

impl<'p> SharedBestFound<'p> {
    #[inline]
    pub fn new() -> Self {
        Self {
            best: Mutex::new(None),
        }
    }

    /// A copy of the stored best, or `None` before the first update.
    pub fn best_found(&self) -> Option<Solution<'p>> {
        self.best.lock().clone()
    }

    /// A copy of the stored best only when it is strictly better than
    /// `limit`; the limit avoids copying a solution the caller would
    /// discard anyway. Without a limit this equals
    /// [`best_found`](SharedBestFound::best_found).
    pub fn best_found_better_than(&self, limit: Option<&Evaluation>) -> Option<Solution<'p>> {
        let guard = self.best.lock();
        let best = guard.as_ref()?;
        match limit {
            None => Some(best.clone()),
            Some(limit) => {
                let best_eval = best.cached_evaluation()?;
                if best_eval < limit { Some(best.clone()) } else { None }
            }
        }
    }

    /// Evaluation of the stored best.
    pub fn best_evaluation(&self) -> Option<Evaluation> {
        self.best.lock().as_ref().and_then(|s| s.cached_evaluation().cloned())
    }

    /// Installs a copy of `candidate` when it is strictly better than the
    /// stored best. Returns whether the slot changed.
    pub fn try_update(&self, candidate: &Solution<'p>) -> bool {
        let mut copy = candidate.clone();
        let candidate_eval = copy.evaluation().clone();

        let mut guard = self.best.lock();
        let replace = match guard.as_ref() {
            None => true,
            Some(best) => best
                .cached_evaluation()
                .is_none_or(|best_eval| candidate_eval < *best_eval),
        };
        if replace {
            tracing::info!(evaluation = %candidate_eval, "new best-found solution");
            *guard = Some(copy);
        }
        replace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shift_roster_model::constraint::coverage::ShiftCoverageConstraint;
    use shift_roster_model::prelude::{DayOfWeek, Problem, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(2, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", 5);
        builder.add_employee("E0", c);
        builder.add_employee("E1", c);
        for day in 0..2 {
            builder.set_demand(s, day, 1);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    #[test]
    fn cancel_token_is_shared_by_identity() {
        let a = CancelToken::new();
        let b = a.clone();
        let c = CancelToken::new();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_cancelled());
        b.cancel();
        assert!(a.is_cancelled());
        assert!(!c.is_cancelled());
    }

    #[test]
    fn replacement_is_monotone() {
        let problem = problem();
        let shared = SharedBestFound::new();
        assert!(shared.best_found().is_none());

        // Empty timetable: two uncovered slots.
        let empty = Solution::new(&problem);
        assert!(shared.try_update(&empty));
        assert_eq!(shared.best_evaluation(), Some(Evaluation::new([2])));

        // Partially covered: strictly better, replaces.
        let s = problem.shifts()[0].id();
        let mut partial = Solution::new(&problem);
        partial.pop_unassigned_slot(0);
        partial.set_assignment(0, 0, Some(s));
        assert!(shared.try_update(&partial));
        assert_eq!(shared.best_evaluation(), Some(Evaluation::new([1])));

        // Equal candidate: rejected.
        let mut other = Solution::new(&problem);
        other.pop_unassigned_slot(1);
        other.set_assignment(1, 1, Some(s));
        assert!(!shared.try_update(&other));

        // Worse candidate: rejected.
        assert!(!shared.try_update(&Solution::new(&problem)));
        assert_eq!(shared.best_evaluation(), Some(Evaluation::new([1])));
    }

    #[test]
    fn limited_reads_only_copy_improvements() {
        let problem = problem();
        let shared = SharedBestFound::new();
        let empty = Solution::new(&problem);
        shared.try_update(&empty);

        // Limit equal to the stored evaluation: nothing to gain.
        assert!(
            shared
                .best_found_better_than(Some(&Evaluation::new([2])))
                .is_none()
        );
        // Looser limit: the stored solution helps.
        assert!(
            shared
                .best_found_better_than(Some(&Evaluation::new([3])))
                .is_some()
        );
        assert!(shared.best_found_better_than(None).is_some());
    }

    #[test]
    fn reader_receives_an_independent_copy() {
        let problem = problem();
        let shared = SharedBestFound::new();
        shared.try_update(&Solution::new(&problem));

        let mut copy = shared.best_found().expect("stored");
        let s = problem.shifts()[0].id();
        copy.pop_unassigned_slot(0);
        copy.set_assignment(0, 0, Some(s));
        // Mutating the copy does not affect the stored best.
        assert_eq!(shared.best_evaluation(), Some(Evaluation::new([2])));
    }
}

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
use crate::operator::Operator;
use crate::operator::crossover::BlockCrossover;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shift_roster_model::prelude::{Evaluation, Solution};

/// How the pool replaces a member once it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertionStrategy {
    /// Round-robin overwrite.
    ReplaceNext,
    /// Random pick among the members tied at the worst evaluation.
    ReplaceOneOfWorst,
    /// Random pick within the worst fraction of the pool, after a
    /// shuffle-tiebreak sort (worst first).
    ReplaceInWorstSet,
}

impl std::fmt::Display for InsertionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsertionStrategy::ReplaceNext => write!(f, "ReplaceNext"),
            InsertionStrategy::ReplaceOneOfWorst => write!(f, "ReplaceOneOfWorst"),
            InsertionStrategy::ReplaceInWorstSet => write!(f, "ReplaceInWorstSet"),
        }
    }
}

struct PoolInner<'p> {
    solutions: Vec<Solution<'p>>,
    rng: ChaCha8Rng,
    crossover: BlockCrossover<'p, ChaCha8Rng>,
    insertion_index: usize,
}

/// Bounded population of the memetic search. Every method is mutually
/// exclusive; offspring are produced inside the pool so parents can never
/// be mutated mid-crossover, and candidates are compared on evaluation
/// *and* assignments so assignment-equal duplicates are rejected.
pub struct SolutionPool<'p> {
    capacity: usize,
    strategy: InsertionStrategy,
    worst_set_ratio: f64,
    inner: Mutex<PoolInner<'p>>,
}

impl<'p> SolutionPool<'p> {
    pub fn new(
        capacity: usize,
        strategy: InsertionStrategy,
        worst_set_ratio: f64,
        crossover_block_sizes: Vec<usize>,
        rng_seed: u64,
    ) -> Result<Self, InvalidParameterError> {
        if capacity == 0 {
            return Err(InvalidParameterError::new("capacity", "must be positive"));
        }
        if !(0.0..=1.0).contains(&worst_set_ratio) {
            return Err(InvalidParameterError::new(
                "worst_set_ratio",
                "must lie in [0, 1]",
            ));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
        let crossover =
            BlockCrossover::new(ChaCha8Rng::from_rng(&mut rng), crossover_block_sizes)?;
        Ok(Self {
            capacity,
            strategy,
            worst_set_ratio,
            inner: Mutex::new(PoolInner {
                solutions: Vec::with_capacity(capacity),
                rng,
                crossover,
                insertion_index: 0,
            }),
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().solutions.is_empty()
    }

    /// Evaluations of the current members, in pool order.
    pub fn evaluations(&self) -> Vec<Evaluation> {
        let inner = &mut *self.inner.lock();
        inner
            .solutions
            .iter_mut()
            .map(|s| s.evaluation().clone())
            .collect()
    }

    /// An offspring bred from two random distinct parents, or `None` while
    /// the pool holds at most one member.
    pub fn offspring(&self) -> Option<Solution<'p>> {
        let inner = &mut *self.inner.lock();
        let len = inner.solutions.len();
        if len <= 1 {
            return None;
        }
        let first = inner.rng.random_range(0..len);
        let mut second = inner.rng.random_range(0..len);
        while second == first {
            second = inner.rng.random_range(0..len);
        }
        let parent1 = inner.solutions[first].clone();
        let parent2 = inner.solutions[second].clone();
        inner.crossover.init(vec![parent1, parent2]).ok()?;
        inner.crossover.run_to_completion().ok()?;
        inner.crossover.take_result()
    }

    /// Submits a candidate. The candidate enters the pool unless it
    /// duplicates a member (equal evaluation and equal assignments); a full
    /// pool evicts a member according to the configured strategy.
    pub fn select(&self, mut candidate: Solution<'p>) {
        candidate.evaluation();
        let inner = &mut *self.inner.lock();

        if inner.solutions.is_empty() {
            tracing::debug!(evaluation = %candidate.cached_evaluation().expect("evaluated"), "pool seeded");
            inner.solutions.push(candidate);
            return;
        }

        for member in inner.solutions.iter_mut() {
            member.evaluation();
        }
        let candidate_eval = candidate
            .cached_evaluation()
            .expect("candidate evaluated")
            .clone();

        // One scan: locate the worst-evaluation members and detect
        // duplicates.
        let mut is_best = true;
        let mut worst_eval: Option<Evaluation> = None;
        let mut worst_indexes: Vec<usize> = Vec::new();
        for (index, member) in inner.solutions.iter().enumerate() {
            let member_eval = member.cached_evaluation().expect("member evaluated");
            match &worst_eval {
                None => {
                    worst_eval = Some(member_eval.clone());
                    worst_indexes.push(index);
                }
                Some(worst) => match worst.cmp(member_eval) {
                    std::cmp::Ordering::Equal => worst_indexes.push(index),
                    std::cmp::Ordering::Less => {
                        worst_eval = Some(member_eval.clone());
                        worst_indexes.clear();
                        worst_indexes.push(index);
                    }
                    std::cmp::Ordering::Greater => {}
                },
            }
            match member_eval.cmp(&candidate_eval) {
                std::cmp::Ordering::Equal => {
                    is_best = false;
                    if candidate.equal_assignments(member) {
                        tracing::debug!(evaluation = %candidate_eval, "duplicate rejected by the pool");
                        return;
                    }
                }
                std::cmp::Ordering::Less => is_best = false,
                std::cmp::Ordering::Greater => {}
            }
        }

        if inner.solutions.len() < self.capacity {
            tracing::debug!(
                evaluation = %candidate_eval,
                is_best,
                size = inner.solutions.len() + 1,
                "pool appended"
            );
            inner.solutions.push(candidate);
            return;
        }

        let replaced_index = match self.strategy {
            InsertionStrategy::ReplaceNext => {
                let index = inner.insertion_index % inner.solutions.len();
                inner.solutions[index] = candidate;
                inner.insertion_index = (index + 1) % inner.solutions.len();
                index
            }
            InsertionStrategy::ReplaceOneOfWorst => {
                let pick = inner.rng.random_range(0..worst_indexes.len());
                let index = worst_indexes[pick];
                inner.solutions[index] = candidate;
                index
            }
            InsertionStrategy::ReplaceInWorstSet => {
                let PoolInner { solutions, rng, .. } = inner;
                // Shuffle before the stable sort so equal evaluations land
                // in random order, then sort worst-first.
                solutions.shuffle(rng);
                solutions.sort_by(|a, b| b.cached_evaluation().cmp(&a.cached_evaluation()));
                let mut worst_set_size =
                    (self.worst_set_ratio * solutions.len() as f64) as usize;
                if worst_set_size == 0 {
                    worst_set_size = 1;
                }
                let index = rng.random_range(0..worst_set_size);
                solutions[index] = candidate;
                index
            }
        };
        tracing::debug!(
            evaluation = %candidate_eval,
            is_best,
            replaced_index,
            strategy = %self.strategy,
            "pool replacement"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shift_roster_model::constraint::coverage::ShiftCoverageConstraint;
    use shift_roster_model::prelude::{DayOfWeek, Problem, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(6, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", 14);
        for e in 0..4 {
            builder.add_employee(format!("E{}", e), c);
        }
        for day in 0..6 {
            builder.set_demand(s, day, 1);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    fn worked_by(problem: &Problem, employee: usize, days: usize) -> Solution<'_> {
        let s = problem.shifts()[0].id();
        let mut solution = Solution::new(problem);
        for day in 0..days {
            solution.pop_unassigned_slot(day);
            solution.set_assignment(day, employee, Some(s));
        }
        solution
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(SolutionPool::new(0, InsertionStrategy::ReplaceNext, 0.1, vec![1], 0).is_err());
        assert!(
            SolutionPool::new(5, InsertionStrategy::ReplaceNext, 1.5, vec![1], 0).is_err()
        );
        assert!(SolutionPool::new(5, InsertionStrategy::ReplaceNext, 0.1, vec![], 0).is_err());
    }

    #[test]
    fn offspring_needs_two_members() {
        let problem = problem();
        let pool = SolutionPool::new(4, InsertionStrategy::ReplaceInWorstSet, 0.1, vec![1, 5, 7], 3)
            .expect("valid configuration");
        assert!(pool.offspring().is_none());
        pool.select(worked_by(&problem, 0, 6));
        assert!(pool.offspring().is_none());
        pool.select(worked_by(&problem, 1, 6));
        let child = pool.offspring().expect("two parents available");
        assert_eq!(child.num_days(), 6);
        assert!(!child.is_evaluated());
    }

    #[test]
    fn duplicates_are_rejected() {
        let problem = problem();
        let pool = SolutionPool::new(4, InsertionStrategy::ReplaceInWorstSet, 0.1, vec![1], 3)
            .expect("valid configuration");
        let member = worked_by(&problem, 0, 6);
        pool.select(member.clone());
        pool.select(worked_by(&problem, 1, 6));
        assert_eq!(pool.len(), 2);
        let evaluations_before = pool.evaluations();

        // Same evaluation, identical assignments: rejected.
        pool.select(member);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.evaluations(), evaluations_before);
    }

    #[test]
    fn equal_evaluation_different_assignments_is_kept() {
        let problem = problem();
        let pool = SolutionPool::new(4, InsertionStrategy::ReplaceInWorstSet, 0.1, vec![1], 3)
            .expect("valid configuration");
        pool.select(worked_by(&problem, 0, 6));
        // Same cost structure, different timetable.
        pool.select(worked_by(&problem, 1, 6));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn pool_grows_to_capacity_then_replaces() {
        let problem = problem();
        let pool = SolutionPool::new(2, InsertionStrategy::ReplaceNext, 0.5, vec![1], 9)
            .expect("valid configuration");
        pool.select(worked_by(&problem, 0, 6));
        pool.select(worked_by(&problem, 1, 6));
        assert_eq!(pool.len(), 2);

        // Full pool: the next submission replaces instead of growing.
        pool.select(worked_by(&problem, 2, 6));
        assert_eq!(pool.len(), 2);
        pool.select(worked_by(&problem, 3, 6));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn replace_in_worst_set_evicts_a_worst_member() {
        let problem = problem();
        let pool = SolutionPool::new(3, InsertionStrategy::ReplaceInWorstSet, 0.34, vec![1], 5)
            .expect("valid configuration");
        // Three members covering 4 of 6 days: evaluation [2] each.
        for e in 0..3 {
            pool.select(worked_by(&problem, e, 4));
        }
        // A fully covering candidate replaces inside the worst set.
        pool.select(worked_by(&problem, 0, 6));
        let evaluations = pool.evaluations();
        assert_eq!(evaluations.len(), 3);
        assert!(evaluations.contains(&Evaluation::new([0])));
    }

    #[test]
    fn replace_one_of_worst_targets_the_worst_tier() {
        let problem = problem();
        let pool = SolutionPool::new(3, InsertionStrategy::ReplaceOneOfWorst, 0.1, vec![1], 5)
            .expect("valid configuration");
        pool.select(worked_by(&problem, 0, 6)); // [0]
        pool.select(worked_by(&problem, 1, 4)); // [2]
        pool.select(worked_by(&problem, 2, 4)); // [2]

        pool.select(worked_by(&problem, 3, 5)); // [1] evicts a [2]
        let evaluations = pool.evaluations();
        assert!(evaluations.contains(&Evaluation::new([0])));
        assert!(evaluations.contains(&Evaluation::new([1])));
        // Exactly one of the two worst members survived.
        let worst_count = evaluations
            .iter()
            .filter(|e| **e == Evaluation::new([2]))
            .count();
        assert_eq!(worst_count, 1);
    }
}

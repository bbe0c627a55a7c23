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

use crate::descent::NeighborSelectionPolicy;
use crate::err::InvalidParameterError;
use std::time::Duration;

/// Parameter set for the threaded iterated local search. Built with
/// builder-style setters; workers validate the whole set once at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct IlsSettings {
    pub max_iterations: u64,
    pub time_limit: Duration,
    pub perturbation_strength: f64,
    pub worse_solution_acceptance_rate: f64,
    pub block_sizes: Vec<usize>,
    pub rng_seed: u64,
    pub selection_policy: NeighborSelectionPolicy,
    pub nb_threads: usize,
    pub share_best_found: bool,
    pub trace_record_period: Duration,
    pub record_trace: bool,
    pub record_full_iteration_trace: bool,
    /// Iterations without improvement before the search restarts from a
    /// fresh construction (0 restarts at every iteration).
    pub restart_iterations: u64,
}

impl Default for IlsSettings {
    fn default() -> Self {
        Self {
            max_iterations: u64::MAX,
            time_limit: Duration::from_secs(400),
            perturbation_strength: 0.03,
            worse_solution_acceptance_rate: 0.1,
            block_sizes: (1..=7).collect(),
            rng_seed: 0,
            selection_policy: NeighborSelectionPolicy::FirstImproving,
            nb_threads: 3,
            share_best_found: true,
            trace_record_period: Duration::from_secs(1),
            record_trace: false,
            record_full_iteration_trace: false,
            restart_iterations: 100,
        }
    }
}

impl IlsSettings {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    // Builder-style setters

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
    pub fn with_worse_solution_acceptance_rate(mut self, rate: f64) -> Self {
        self.worse_solution_acceptance_rate = rate;
        self
    }

    #[inline]
    pub fn with_block_sizes(mut self, block_sizes: Vec<usize>) -> Self {
        self.block_sizes = block_sizes;
        self
    }

    #[inline]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    #[inline]
    pub fn with_selection_policy(mut self, policy: NeighborSelectionPolicy) -> Self {
        self.selection_policy = policy;
        self
    }

    #[inline]
    pub fn with_nb_threads(mut self, nb_threads: usize) -> Self {
        self.nb_threads = nb_threads;
        self
    }

    #[inline]
    pub fn with_share_best_found(mut self, share: bool) -> Self {
        self.share_best_found = share;
        self
    }

    #[inline]
    pub fn with_trace_record_period(mut self, period: Duration) -> Self {
        self.trace_record_period = period;
        self
    }

    #[inline]
    pub fn with_record_trace(mut self, record: bool) -> Self {
        self.record_trace = record;
        self
    }

    #[inline]
    pub fn with_record_full_iteration_trace(mut self, record: bool) -> Self {
        self.record_full_iteration_trace = record;
        self
    }

    #[inline]
    pub fn with_restart_iterations(mut self, restart_iterations: u64) -> Self {
        self.restart_iterations = restart_iterations;
        self
    }

    /// Checks every parameter against its legal range.
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
        if !(0.0..=1.0).contains(&self.worse_solution_acceptance_rate) {
            return Err(InvalidParameterError::new(
                "worse_solution_acceptance_rate",
                "must lie in [0, 1]",
            ));
        }
        if self.block_sizes.is_empty() || self.block_sizes.iter().any(|size| *size < 1) {
            return Err(InvalidParameterError::new(
                "block_sizes",
                "must be non-empty with sizes of at least 1",
            ));
        }
        if self.nb_threads < 1 {
            return Err(InvalidParameterError::new(
                "nb_threads",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for IlsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IlsSettings{{ max_iterations: {}, time_limit: {:?}, strength: {}, acceptance: {}, \
             block_sizes: {:?}, seed: {}, policy: {}, threads: {}, share: {}, restarts: {} }}",
            self.max_iterations,
            self.time_limit,
            self.perturbation_strength,
            self.worse_solution_acceptance_rate,
            self.block_sizes,
            self.rng_seed,
            self.selection_policy,
            self.nb_threads,
            self.share_best_found,
            self.restart_iterations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(IlsSettings::default().validate().is_ok());
    }

    #[test]
    fn builder_roundtrip() {
        let settings = IlsSettings::new()
            .with_max_iterations(50)
            .with_time_limit(Duration::from_millis(250))
            .with_perturbation_strength(0.05)
            .with_worse_solution_acceptance_rate(0.2)
            .with_block_sizes(vec![1, 2, 3])
            .with_rng_seed(99)
            .with_selection_policy(NeighborSelectionPolicy::BestImproving)
            .with_nb_threads(2)
            .with_share_best_found(false)
            .with_record_trace(true)
            .with_restart_iterations(7);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_iterations, 50);
        assert_eq!(settings.nb_threads, 2);
        assert!(settings.record_trace);
        assert!(settings.to_string().contains("max_iterations: 50"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(
            IlsSettings::new()
                .with_time_limit(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            IlsSettings::new()
                .with_perturbation_strength(1.5)
                .validate()
                .is_err()
        );
        assert!(
            IlsSettings::new()
                .with_worse_solution_acceptance_rate(-0.1)
                .validate()
                .is_err()
        );
        assert!(
            IlsSettings::new()
                .with_block_sizes(vec![])
                .validate()
                .is_err()
        );
        assert!(IlsSettings::new().with_nb_threads(0).validate().is_err());
    }
}

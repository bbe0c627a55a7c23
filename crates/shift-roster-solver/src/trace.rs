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

use shift_roster_model::prelude::Evaluation;

/// A value observed at a point in time, measured as nanoseconds elapsed
/// since the start of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord<V> {
    elapsed_nanos: u64,
    value: V,
}

impl<V> TraceRecord<V> {
    #[inline]
    pub fn new(elapsed_nanos: u64, value: V) -> Self {
        Self {
            elapsed_nanos,
            value,
        }
    }

    #[inline]
    pub fn elapsed_nanos(&self) -> u64 {
        self.elapsed_nanos
    }

    #[inline]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_nanos / 1_000_000_000
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }
}

/// Append-only, time-stamped sequence of observations with a label.
/// Supports the "latest record at or before t" lookup used to read a run's
/// quality profile after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace<V> {
    label: String,
    records: Vec<TraceRecord<V>>,
}

impl<V> Trace<V> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            records: Vec::new(),
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn push(&mut self, record: TraceRecord<V>) {
        self.records.push(record);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&TraceRecord<V>> {
        self.records.get(index)
    }

    #[inline]
    pub fn last_record(&self) -> Option<&TraceRecord<V>> {
        self.records.last()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &TraceRecord<V>> {
        self.records.iter()
    }

    /// Latest record with a timestamp at or before `nanos`.
    pub fn last_record_at_nanos(&self, nanos: u64) -> Option<&TraceRecord<V>> {
        let mut latest: Option<&TraceRecord<V>> = None;
        for record in &self.records {
            if record.elapsed_nanos() <= nanos {
                latest = Some(match latest {
                    None => record,
                    Some(best) if best.elapsed_nanos() < record.elapsed_nanos() => record,
                    Some(best) => best,
                });
            }
        }
        latest
    }

    #[inline]
    pub fn last_record_at_secs(&self, secs: u64) -> Option<&TraceRecord<V>> {
        self.last_record_at_nanos(secs.saturating_mul(1_000_000_000))
    }

    /// Value of the latest record at or before `nanos`.
    #[inline]
    pub fn last_value_at_nanos(&self, nanos: u64) -> Option<&V> {
        self.last_record_at_nanos(nanos).map(|r| r.value())
    }
}

/// One completed search iteration of an iterated-local-search thread:
/// evaluations of the best found, the last accepted, and the current
/// solution, plus the distance the iteration travelled from its accepted
/// starting point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IlsIterationRecord {
    iteration: u64,
    best_found: Evaluation,
    last_accepted: Evaluation,
    current: Evaluation,
    distance_last_to_current: usize,
}

impl IlsIterationRecord {
    pub fn new(
        iteration: u64,
        best_found: Evaluation,
        last_accepted: Evaluation,
        current: Evaluation,
        distance_last_to_current: usize,
    ) -> Self {
        Self {
            iteration,
            best_found,
            last_accepted,
            current,
            distance_last_to_current,
        }
    }

    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    #[inline]
    pub fn best_found(&self) -> &Evaluation {
        &self.best_found
    }

    #[inline]
    pub fn last_accepted(&self) -> &Evaluation {
        &self.last_accepted
    }

    #[inline]
    pub fn current(&self) -> &Evaluation {
        &self.current
    }

    #[inline]
    pub fn distance_last_to_current(&self) -> usize {
        self.distance_last_to_current
    }
}

impl std::fmt::Display for IlsIterationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IlsIterationRecord(iteration: {}, best: {}, accepted: {}, current: {}, distance: {})",
            self.iteration,
            self.best_found,
            self.last_accepted,
            self.current,
            self.distance_last_to_current
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_preserve_insertion_order() {
        let mut trace: Trace<i64> = Trace::new("run");
        assert!(trace.is_empty());
        trace.push(TraceRecord::new(10, 5));
        trace.push(TraceRecord::new(20, 4));
        trace.push(TraceRecord::new(30, 3));
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.label(), "run");
        assert_eq!(trace.last_record().unwrap().value(), &3);
        assert_eq!(trace.get(1).unwrap().elapsed_nanos(), 20);
    }

    #[test]
    fn lookup_returns_latest_at_or_before() {
        let mut trace: Trace<i64> = Trace::new("run");
        trace.push(TraceRecord::new(10, 5));
        trace.push(TraceRecord::new(20, 4));
        trace.push(TraceRecord::new(30, 3));

        assert!(trace.last_record_at_nanos(5).is_none());
        assert_eq!(trace.last_value_at_nanos(10), Some(&5));
        assert_eq!(trace.last_value_at_nanos(25), Some(&4));
        assert_eq!(trace.last_value_at_nanos(1_000), Some(&3));
    }

    #[test]
    fn second_lookup_scales_to_nanos() {
        let mut trace: Trace<i64> = Trace::new("run");
        trace.push(TraceRecord::new(1_500_000_000, 9));
        assert!(trace.last_record_at_secs(1).is_none());
        assert_eq!(trace.last_record_at_secs(2).unwrap().value(), &9);
    }

    #[test]
    fn seconds_conversion_truncates() {
        let record = TraceRecord::new(2_999_999_999, ());
        assert_eq!(record.elapsed_secs(), 2);
    }
}

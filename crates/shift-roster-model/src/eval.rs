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

use smallvec::SmallVec;

/// Lexicographic cost vector of a solution, one entry per constraint rank
/// (rank 0 is the hardest). Lower is better; comparison runs from rank 0
/// upward and equality is componentwise.
///
/// The same type carries move deltas, whose entries may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Evaluation {
    costs: SmallVec<[i64; 8]>,
}

impl Evaluation {
    #[inline]
    pub fn new(costs: impl IntoIterator<Item = i64>) -> Self {
        Self {
            costs: costs.into_iter().collect(),
        }
    }

    /// An all-zero vector with one entry per rank.
    #[inline]
    pub fn zero(rank_count: usize) -> Self {
        Self {
            costs: smallvec::smallvec![0; rank_count],
        }
    }

    #[inline]
    pub fn rank_count(&self) -> usize {
        self.costs.len()
    }

    #[inline]
    pub fn cost(&self, rank_index: usize) -> i64 {
        self.costs[rank_index]
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.costs.iter().all(|c| *c == 0)
    }

    /// Adds `delta` onto the cost of a rank.
    ///
    /// # Panics
    ///
    /// Panics if the addition overflows `i64`.
    #[inline]
    pub fn add_at(&mut self, rank_index: usize, delta: i64) {
        self.costs[rank_index] = self.costs[rank_index]
            .checked_add(delta)
            .expect("Evaluation cost addition overflowed");
    }

    /// Returns `self + rhs` componentwise. Both vectors must have the same
    /// rank count.
    #[inline]
    pub fn plus(&self, rhs: &Evaluation) -> Evaluation {
        debug_assert_eq!(self.costs.len(), rhs.costs.len());
        Evaluation {
            costs: self
                .costs
                .iter()
                .zip(rhs.costs.iter())
                .map(|(a, b)| {
                    a.checked_add(*b)
                        .expect("Evaluation cost addition overflowed")
                })
                .collect(),
        }
    }

    /// Returns `self - rhs` componentwise, i.e. the delta that turns `rhs`
    /// into `self`.
    #[inline]
    pub fn minus(&self, rhs: &Evaluation) -> Evaluation {
        debug_assert_eq!(self.costs.len(), rhs.costs.len());
        Evaluation {
            costs: self
                .costs
                .iter()
                .zip(rhs.costs.iter())
                .map(|(a, b)| {
                    a.checked_sub(*b)
                        .expect("Evaluation cost subtraction overflowed")
                })
                .collect(),
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.costs.iter().copied()
    }
}

impl PartialOrd for Evaluation {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Evaluation {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.costs.iter().cmp(other.costs.iter())
    }
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.costs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_is_lexicographic() {
        let a = Evaluation::new([0, 5, 100]);
        let b = Evaluation::new([0, 6, 0]);
        let c = Evaluation::new([1, 0, 0]);
        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }

    #[test]
    fn comparison_is_a_total_order() {
        let evals = [
            Evaluation::new([0, 0]),
            Evaluation::new([0, 1]),
            Evaluation::new([1, 0]),
            Evaluation::new([1, 1]),
        ];
        // Reflexive by componentwise equality
        for e in &evals {
            assert_eq!(e, &e.clone());
            assert_eq!(e.cmp(e), std::cmp::Ordering::Equal);
        }
        // Antisymmetric
        for a in &evals {
            for b in &evals {
                if a < b {
                    assert!(b > a);
                }
            }
        }
        // Transitive
        for a in &evals {
            for b in &evals {
                for c in &evals {
                    if a < b && b < c {
                        assert!(a < c);
                    }
                }
            }
        }
    }

    #[test]
    fn delta_arithmetic_roundtrips() {
        let before = Evaluation::new([2, 10]);
        let after = Evaluation::new([2, 7]);
        let delta = after.minus(&before);
        assert_eq!(delta, Evaluation::new([0, -3]));
        assert_eq!(before.plus(&delta), after);
    }

    #[test]
    fn zero_is_zero() {
        let z = Evaluation::zero(3);
        assert!(z.is_zero());
        assert_eq!(z.rank_count(), 3);
        let mut nz = z.clone();
        nz.add_at(1, 4);
        assert!(!nz.is_zero());
        assert_eq!(nz.cost(1), 4);
    }

    #[test]
    fn display_renders_vector() {
        let e = Evaluation::new([1, -2, 3]);
        assert_eq!(e.to_string(), "[1, -2, 3]");
    }
}

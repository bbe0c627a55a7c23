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

//! Perturbation operators kicking a solution out of a local optimum. Every
//! operator honors a strength parameter: at least
//! `floor(strength * employees * days) + 1` cells change per invocation.

pub mod exchange;
pub mod guided_swap;
pub mod mixed;
pub mod ruin_recreate;

pub use exchange::ExchangePerturbation;
pub use guided_swap::GuidedSwapPerturbation;
pub use mixed::MixedPerturbation;
pub use ruin_recreate::RuinAndRecreate;

use shift_roster_model::prelude::Problem;

/// Minimum number of cells a perturbation must change, derived from the
/// strength ratio over the full matrix.
#[inline]
pub(crate) fn min_slot_exchanges(problem: &Problem, strength: f64) -> usize {
    (strength * (problem.num_employees() * problem.num_days()) as f64) as usize + 1
}

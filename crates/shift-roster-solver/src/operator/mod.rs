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

pub mod construction;
pub mod crossover;
pub mod perturbation;

use crate::err::OperatorError;
use shift_roster_model::prelude::Solution;

/// Uniform stepping interface for construction, perturbation and crossover
/// procedures. The engine's state machines drive every operator the same
/// way: `init` with zero or more seed solutions, then `next_step` until it
/// returns `false`, then `take_result`.
///
/// Stepping is deliberately fine-grained so workers can poll a cancellation
/// predicate between steps.
pub trait Operator<'p> {
    fn name(&self) -> &str;

    /// Initializes or reinitializes the procedure. Seed solutions are moved
    /// into the operator; how many are expected depends on the operator.
    fn init(&mut self, seeds: Vec<Solution<'p>>) -> Result<(), OperatorError>;

    /// Performs the next step. Returns `true` while the procedure has more
    /// steps, `false` once it is finished.
    fn next_step(&mut self) -> Result<bool, OperatorError>;

    fn is_done(&self) -> bool;

    /// Moves the result out of the operator. Returns `None` while the
    /// procedure has not finished.
    fn take_result(&mut self) -> Option<Solution<'p>>;

    /// Drives the operator until `next_step` reports completion.
    fn run_to_completion(&mut self) -> Result<(), OperatorError> {
        while self.next_step()? {}
        Ok(())
    }
}

impl<'p, 'a> std::fmt::Debug for dyn Operator<'p> + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Operator({})", self.name())
    }
}

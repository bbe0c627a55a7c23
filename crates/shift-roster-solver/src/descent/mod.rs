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

pub mod biased_vnd;
pub mod vnd;

pub use biased_vnd::BiasedVariableNeighborhoodDescent;
pub use vnd::VariableNeighborhoodDescent;

/// How a descent picks its next neighbor within a neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighborSelectionPolicy {
    /// Take the first strictly improving neighbor the enumeration yields.
    FirstImproving,
    /// Scan the whole neighborhood and take the best improving neighbor.
    BestImproving,
}

impl std::fmt::Display for NeighborSelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NeighborSelectionPolicy::FirstImproving => write!(f, "FirstImproving"),
            NeighborSelectionPolicy::BestImproving => write!(f, "BestImproving"),
        }
    }
}

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

//! Swap-based neighborhood iterators. All three flavors enumerate the same
//! move set (every employee pair over every window of the configured block
//! size) but differ in how they price a move: the full neighborhood sums
//! all constraint deltas into a complete evaluation, the biased one prices
//! only a caller-supplied subset of active constraints, and the
//! satisfaction neighborhood counts newly satisfied and newly unsatisfied
//! constraint units.

pub mod biased;
pub mod filter;
pub mod satisfaction;
pub mod swap;

pub use biased::BiasedSwapNeighborhood;
pub use filter::{AcceptAllMoves, SwapMoveFilter};
pub use satisfaction::SwapSatisfactionNeighborhood;
pub use swap::SwapNeighborhood;

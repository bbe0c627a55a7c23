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

//! Data model for the shift rostering problem: the problem description
//! (shifts, employees, contracts, demand, constraints), the timetable
//! [`Solution`](crate::solution::Solution), the lexicographic
//! [`Evaluation`](crate::eval::Evaluation), and the move types the solver
//! enumerates.

pub mod constraint;
pub mod eval;
pub mod moves;
pub mod problem;
pub mod solution;

pub mod prelude {
    pub use crate::constraint::{Constraint, ConstraintEvaluator, SatisfactionDelta};
    pub use crate::eval::Evaluation;
    pub use crate::moves::{RemoveReplaceMove, SwapMove};
    pub use crate::problem::{
        Contract, ContractId, DayOfWeek, Employee, EmployeeId, Problem, ProblemBuilder,
        SchedulingPeriod, Shift, ShiftId,
    };
    pub use crate::solution::Solution;
}

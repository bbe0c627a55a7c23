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

//! Constraint facade consumed by the search engine. The engine never
//! case-splits on concrete constraint kinds; everything it needs flows
//! through [`Constraint`] and [`ConstraintEvaluator`].

pub mod consecutive;
pub mod coverage;
pub mod requests;

use crate::moves::SwapMove;
use crate::problem::ShiftId;
use crate::solution::Solution;

/// Change in the number of satisfied constraint units a swap move induces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SatisfactionDelta {
    pub newly_satisfied: u32,
    pub newly_unsatisfied: u32,
}

impl SatisfactionDelta {
    #[inline]
    pub const fn new(newly_satisfied: u32, newly_unsatisfied: u32) -> Self {
        Self {
            newly_satisfied,
            newly_unsatisfied,
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Newly unsatisfied minus newly satisfied; lower is better.
    #[inline]
    pub fn net_loss(&self) -> i64 {
        self.newly_unsatisfied as i64 - self.newly_satisfied as i64
    }
}

impl std::ops::AddAssign for SatisfactionDelta {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.newly_satisfied += rhs.newly_satisfied;
        self.newly_unsatisfied += rhs.newly_unsatisfied;
    }
}

impl std::fmt::Display for SatisfactionDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SatisfactionDelta(+{}, -{})",
            self.newly_satisfied, self.newly_unsatisfied
        )
    }
}

/// A rostering constraint. Concrete kinds stay opaque to the engine; the
/// [`is_coverage`](Constraint::is_coverage) capability flag marks hard
/// coverage constraints that progressive-descent construction activates
/// from the start.
pub trait Constraint: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this constraint expresses hard demand coverage.
    fn is_coverage(&self) -> bool {
        false
    }

    fn evaluator(&self) -> &dyn ConstraintEvaluator;
}

impl<'a> std::fmt::Debug for dyn Constraint + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Constraint({})", self.name())
    }
}

/// Cost queries the engine issues against one constraint. The sign
/// convention for differences is: negative means the move improves this
/// constraint.
pub trait ConstraintEvaluator: Send + Sync {
    /// Full cost of the constraint on a solution.
    fn cost(&self, solution: &Solution<'_>) -> i64;

    /// Post-move cost minus pre-move cost under the swap.
    fn swap_cost_difference(&self, solution: &Solution<'_>, mv: &SwapMove) -> i64;

    /// Number of constraint units the swap newly satisfies / unsatisfies.
    fn satisfaction_difference(&self, solution: &Solution<'_>, mv: &SwapMove) -> SatisfactionDelta;

    /// Estimated cost of assigning `shift` to an employee on a day, used by
    /// greedy construction. Lower means prefer.
    fn estimated_assignment_cost(
        &self,
        solution: &Solution<'_>,
        employee_index: usize,
        shift: ShiftId,
        day_index: usize,
    ) -> i64;

    fn has_preferred_assignment(&self, _day_index: usize, _employee_index: usize) -> bool {
        false
    }

    fn has_unwanted_assignment(&self, _day_index: usize, _employee_index: usize) -> bool {
        false
    }

    fn is_preferred_assignment(
        &self,
        _day_index: usize,
        _employee_index: usize,
        _shift: ShiftId,
    ) -> bool {
        false
    }
}

/// Cell value of the matrix as it would read after applying `mv`, without
/// mutating the solution. Evaluators use this to price moves.
#[inline]
pub fn assignment_after_swap(
    solution: &Solution<'_>,
    mv: &SwapMove,
    day_index: usize,
    employee_index: usize,
) -> Option<ShiftId> {
    if day_index >= mv.start_day() && day_index <= mv.end_day() {
        if employee_index == mv.employee1() {
            return solution.assignment(day_index, mv.employee2());
        }
        if employee_index == mv.employee2() {
            return solution.assignment(day_index, mv.employee1());
        }
    }
    solution.assignment(day_index, employee_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::coverage::ShiftCoverageConstraint;
    use crate::problem::{DayOfWeek, ProblemBuilder};

    #[test]
    fn satisfaction_delta_accumulates() {
        let mut d = SatisfactionDelta::zero();
        d += SatisfactionDelta::new(2, 1);
        d += SatisfactionDelta::new(0, 3);
        assert_eq!(d, SatisfactionDelta::new(2, 4));
        assert_eq!(d.net_loss(), 2);
    }

    #[test]
    fn assignment_after_swap_reads_exchanged_cells() {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(2, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", 5);
        builder.add_employee("E0", c);
        builder.add_employee("E1", c);
        builder.set_demand(s, 0, 1);
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        let problem = builder.build().expect("problem builds");

        let mut solution = Solution::new(&problem);
        solution.pop_unassigned_slot(0);
        solution.set_assignment(0, 0, Some(s));

        let mv = SwapMove::new(0, 1, 0, 1);
        assert_eq!(assignment_after_swap(&solution, &mv, 0, 0), None);
        assert_eq!(assignment_after_swap(&solution, &mv, 0, 1), Some(s));
        // Outside the window the matrix reads unchanged.
        assert_eq!(assignment_after_swap(&solution, &mv, 1, 0), None);
    }
}

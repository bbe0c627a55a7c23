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

use crate::constraint::{Constraint, ConstraintEvaluator, SatisfactionDelta};
use crate::moves::SwapMove;
use crate::problem::ShiftId;
use crate::solution::Solution;

/// Hard coverage: every demand slot must be assigned. Cost is the weighted
/// number of uncovered slots. Swap moves exchange assignments within a day
/// column and therefore never change this cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShiftCoverageConstraint {
    weight: i64,
}

impl ShiftCoverageConstraint {
    #[inline]
    pub const fn new(weight: i64) -> Self {
        Self { weight }
    }

    #[inline]
    pub const fn weight(&self) -> i64 {
        self.weight
    }
}

impl Constraint for ShiftCoverageConstraint {
    fn name(&self) -> &str {
        "shift-coverage"
    }

    fn is_coverage(&self) -> bool {
        true
    }

    fn evaluator(&self) -> &dyn ConstraintEvaluator {
        self
    }
}

impl ConstraintEvaluator for ShiftCoverageConstraint {
    fn cost(&self, solution: &Solution<'_>) -> i64 {
        self.weight * solution.total_unassigned_slots() as i64
    }

    fn swap_cost_difference(&self, _solution: &Solution<'_>, _mv: &SwapMove) -> i64 {
        0
    }

    fn satisfaction_difference(
        &self,
        _solution: &Solution<'_>,
        _mv: &SwapMove,
    ) -> SatisfactionDelta {
        SatisfactionDelta::zero()
    }

    fn estimated_assignment_cost(
        &self,
        _solution: &Solution<'_>,
        _employee_index: usize,
        _shift: ShiftId,
        _day_index: usize,
    ) -> i64 {
        0
    }
}

/// Hard rule that an employee holds at most one assignment per day. The
/// matrix model satisfies it structurally, so the evaluator reports zero
/// everywhere; the constraint exists so the rank-0 slot of the evaluation
/// names every hard rule of the original formulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SingleAssignmentConstraint;

impl SingleAssignmentConstraint {
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl Constraint for SingleAssignmentConstraint {
    fn name(&self) -> &str {
        "single-assignment-per-day"
    }

    fn is_coverage(&self) -> bool {
        true
    }

    fn evaluator(&self) -> &dyn ConstraintEvaluator {
        self
    }
}

impl ConstraintEvaluator for SingleAssignmentConstraint {
    fn cost(&self, _solution: &Solution<'_>) -> i64 {
        0
    }

    fn swap_cost_difference(&self, _solution: &Solution<'_>, _mv: &SwapMove) -> i64 {
        0
    }

    fn satisfaction_difference(
        &self,
        _solution: &Solution<'_>,
        _mv: &SwapMove,
    ) -> SatisfactionDelta {
        SatisfactionDelta::zero()
    }

    fn estimated_assignment_cost(
        &self,
        _solution: &Solution<'_>,
        _employee_index: usize,
        _shift: ShiftId,
        _day_index: usize,
    ) -> i64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{DayOfWeek, Problem, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(2, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", 5);
        builder.add_employee("E0", c);
        builder.add_employee("E1", c);
        builder.set_demand(s, 0, 2);
        builder.set_demand(s, 1, 1);
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    #[test]
    fn coverage_cost_tracks_unassigned_slots() {
        let problem = problem();
        let constraint = ShiftCoverageConstraint::new(2);
        let mut solution = Solution::new(&problem);
        assert_eq!(constraint.cost(&solution), 6);

        let s = problem.shifts()[0].id();
        solution.pop_unassigned_slot(0);
        solution.set_assignment(0, 0, Some(s));
        assert_eq!(constraint.cost(&solution), 4);
    }

    #[test]
    fn swap_never_changes_coverage() {
        let problem = problem();
        let constraint = ShiftCoverageConstraint::new(1);
        let mut solution = Solution::new(&problem);
        let s = problem.shifts()[0].id();
        solution.pop_unassigned_slot(0);
        solution.set_assignment(0, 0, Some(s));

        let mv = SwapMove::new(0, 1, 0, 2);
        assert_eq!(constraint.swap_cost_difference(&solution, &mv), 0);
        assert!(constraint.is_coverage());
    }

    #[test]
    fn single_assignment_is_structurally_satisfied() {
        let problem = problem();
        let constraint = SingleAssignmentConstraint::new();
        let solution = Solution::new(&problem);
        assert_eq!(constraint.cost(&solution), 0);
        assert!(constraint.is_coverage());
    }
}

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

use crate::constraint::{Constraint, ConstraintEvaluator, SatisfactionDelta, assignment_after_swap};
use crate::moves::SwapMove;
use crate::problem::ShiftId;
use crate::solution::Solution;

/// Soft contract rule limiting consecutive working days. For each employee,
/// every maximal run of working days longer than the contract's limit costs
/// `weight` per excess day. One employee is one satisfiable unit.
///
/// The constraint decomposes per employee, so swap deltas re-evaluate only
/// the two employees the move touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaxConsecutiveWorkDaysConstraint {
    weight: i64,
}

impl MaxConsecutiveWorkDaysConstraint {
    #[inline]
    pub const fn new(weight: i64) -> Self {
        Self { weight }
    }

    fn run_excess(num_days: usize, limit: u32, working: impl Fn(usize) -> bool) -> i64 {
        let limit = limit as i64;
        let mut excess = 0;
        let mut run = 0i64;
        for day in 0..num_days {
            if working(day) {
                run += 1;
            } else {
                if run > limit {
                    excess += run - limit;
                }
                run = 0;
            }
        }
        if run > limit {
            excess += run - limit;
        }
        excess
    }

    fn employee_cost(&self, solution: &Solution<'_>, employee_index: usize) -> i64 {
        let limit = solution
            .problem()
            .contract_of(employee_index)
            .max_consecutive_work_days();
        self.weight
            * Self::run_excess(solution.num_days(), limit, |day| {
                solution.assignment(day, employee_index).is_some()
            })
    }

    fn employee_cost_after_swap(
        &self,
        solution: &Solution<'_>,
        mv: &SwapMove,
        employee_index: usize,
    ) -> i64 {
        let limit = solution
            .problem()
            .contract_of(employee_index)
            .max_consecutive_work_days();
        self.weight
            * Self::run_excess(solution.num_days(), limit, |day| {
                assignment_after_swap(solution, mv, day, employee_index).is_some()
            })
    }
}

impl Constraint for MaxConsecutiveWorkDaysConstraint {
    fn name(&self) -> &str {
        "max-consecutive-work-days"
    }

    fn evaluator(&self) -> &dyn ConstraintEvaluator {
        self
    }
}

impl ConstraintEvaluator for MaxConsecutiveWorkDaysConstraint {
    fn cost(&self, solution: &Solution<'_>) -> i64 {
        (0..solution.num_employees())
            .map(|employee| self.employee_cost(solution, employee))
            .sum()
    }

    fn swap_cost_difference(&self, solution: &Solution<'_>, mv: &SwapMove) -> i64 {
        let mut diff = 0;
        for employee in [mv.employee1(), mv.employee2()] {
            diff += self.employee_cost_after_swap(solution, mv, employee)
                - self.employee_cost(solution, employee);
        }
        diff
    }

    fn satisfaction_difference(&self, solution: &Solution<'_>, mv: &SwapMove) -> SatisfactionDelta {
        let mut delta = SatisfactionDelta::zero();
        for employee in [mv.employee1(), mv.employee2()] {
            let violated_before = self.employee_cost(solution, employee) > 0;
            let violated_after = self.employee_cost_after_swap(solution, mv, employee) > 0;
            if violated_before && !violated_after {
                delta.newly_satisfied += 1;
            } else if !violated_before && violated_after {
                delta.newly_unsatisfied += 1;
            }
        }
        delta
    }

    fn estimated_assignment_cost(
        &self,
        solution: &Solution<'_>,
        employee_index: usize,
        _shift: ShiftId,
        day_index: usize,
    ) -> i64 {
        let limit = solution
            .problem()
            .contract_of(employee_index)
            .max_consecutive_work_days();
        let before = Self::run_excess(solution.num_days(), limit, |day| {
            solution.assignment(day, employee_index).is_some()
        });
        let after = Self::run_excess(solution.num_days(), limit, |day| {
            day == day_index || solution.assignment(day, employee_index).is_some()
        });
        self.weight * (after - before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::coverage::ShiftCoverageConstraint;
    use crate::problem::{DayOfWeek, Problem, ProblemBuilder};

    fn problem(max_consecutive: u32) -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(7, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", max_consecutive);
        builder.add_employee("E0", c);
        builder.add_employee("E1", c);
        for day in 0..7 {
            builder.set_demand(s, day, 1);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    fn worked_days<'a>(problem: &'a Problem, employee: usize, days: &[usize]) -> Solution<'a> {
        let s = problem.shifts()[0].id();
        let mut solution = Solution::new(problem);
        for &day in days {
            solution.pop_unassigned_slot(day);
            solution.set_assignment(day, employee, Some(s));
        }
        solution
    }

    #[test]
    fn excess_run_days_are_charged() {
        let problem = problem(3);
        let constraint = MaxConsecutiveWorkDaysConstraint::new(4);
        // A 5-day run exceeds the limit of 3 by 2.
        let solution = worked_days(&problem, 0, &[0, 1, 2, 3, 4]);
        assert_eq!(constraint.cost(&solution), 8);
        // Two separate runs of 3 are fine.
        let ok = worked_days(&problem, 0, &[0, 1, 2, 4, 5, 6]);
        assert_eq!(constraint.cost(&ok), 0);
    }

    #[test]
    fn swap_delta_matches_full_recomputation() {
        let problem = problem(3);
        let constraint = MaxConsecutiveWorkDaysConstraint::new(4);
        let solution = worked_days(&problem, 0, &[0, 1, 2, 3, 4]);

        // Hand day 2 to the idle employee, splitting the run.
        let mv = SwapMove::new(0, 1, 2, 1);
        let predicted = constraint.swap_cost_difference(&solution, &mv);
        let mut moved = solution.clone();
        moved.apply_swap(&mv);
        assert_eq!(predicted, constraint.cost(&moved) - constraint.cost(&solution));
        assert!(predicted < 0);
        assert_eq!(
            constraint.satisfaction_difference(&solution, &mv),
            SatisfactionDelta::new(1, 0)
        );
    }

    #[test]
    fn estimate_charges_run_extension() {
        let problem = problem(3);
        let constraint = MaxConsecutiveWorkDaysConstraint::new(4);
        let solution = worked_days(&problem, 0, &[0, 1, 2]);
        let s = problem.shifts()[0].id();
        // Extending the run to 4 costs one excess day.
        assert_eq!(constraint.estimated_assignment_cost(&solution, 0, s, 3), 4);
        // A detached day costs nothing.
        assert_eq!(constraint.estimated_assignment_cost(&solution, 0, s, 5), 0);
    }
}

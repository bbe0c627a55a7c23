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
use std::collections::{HashMap, HashSet};

/// Soft constraint: employees asked for specific days off. Each assignment
/// on a requested day off costs `weight`; each requested cell is one
/// satisfiable unit.
#[derive(Debug, Clone)]
pub struct DayOffRequestsConstraint {
    weight: i64,
    // (employee_index, day_index)
    requests: HashSet<(usize, usize)>,
}

impl DayOffRequestsConstraint {
    #[inline]
    pub fn new(weight: i64) -> Self {
        Self {
            weight,
            requests: HashSet::new(),
        }
    }

    #[inline]
    pub fn with_request(mut self, employee_index: usize, day_index: usize) -> Self {
        self.requests.insert((employee_index, day_index));
        self
    }

    #[inline]
    fn requested(&self, employee_index: usize, day_index: usize) -> bool {
        self.requests.contains(&(employee_index, day_index))
    }
}

impl Constraint for DayOffRequestsConstraint {
    fn name(&self) -> &str {
        "day-off-requests"
    }

    fn evaluator(&self) -> &dyn ConstraintEvaluator {
        self
    }
}

impl ConstraintEvaluator for DayOffRequestsConstraint {
    fn cost(&self, solution: &Solution<'_>) -> i64 {
        let mut violations = 0;
        for &(employee, day) in &self.requests {
            if solution.assignment(day, employee).is_some() {
                violations += 1;
            }
        }
        self.weight * violations
    }

    fn swap_cost_difference(&self, solution: &Solution<'_>, mv: &SwapMove) -> i64 {
        let mut diff = 0;
        for day in mv.start_day()..=mv.end_day() {
            for employee in [mv.employee1(), mv.employee2()] {
                if !self.requested(employee, day) {
                    continue;
                }
                let before = solution.assignment(day, employee).is_some();
                let after = assignment_after_swap(solution, mv, day, employee).is_some();
                diff += after as i64 - before as i64;
            }
        }
        self.weight * diff
    }

    fn satisfaction_difference(&self, solution: &Solution<'_>, mv: &SwapMove) -> SatisfactionDelta {
        let mut delta = SatisfactionDelta::zero();
        for day in mv.start_day()..=mv.end_day() {
            for employee in [mv.employee1(), mv.employee2()] {
                if !self.requested(employee, day) {
                    continue;
                }
                let violated_before = solution.assignment(day, employee).is_some();
                let violated_after = assignment_after_swap(solution, mv, day, employee).is_some();
                if violated_before && !violated_after {
                    delta.newly_satisfied += 1;
                } else if !violated_before && violated_after {
                    delta.newly_unsatisfied += 1;
                }
            }
        }
        delta
    }

    fn estimated_assignment_cost(
        &self,
        _solution: &Solution<'_>,
        employee_index: usize,
        _shift: ShiftId,
        day_index: usize,
    ) -> i64 {
        if self.requested(employee_index, day_index) {
            self.weight
        } else {
            0
        }
    }

    fn has_unwanted_assignment(&self, day_index: usize, employee_index: usize) -> bool {
        self.requested(employee_index, day_index)
    }
}

/// Soft constraint: employees asked to work a specific shift on a specific
/// day. Each unmet request costs `weight`.
#[derive(Debug, Clone)]
pub struct ShiftOnRequestsConstraint {
    weight: i64,
    // (employee_index, day_index) -> requested shift
    requests: HashMap<(usize, usize), ShiftId>,
}

impl ShiftOnRequestsConstraint {
    #[inline]
    pub fn new(weight: i64) -> Self {
        Self {
            weight,
            requests: HashMap::new(),
        }
    }

    #[inline]
    pub fn with_request(mut self, employee_index: usize, day_index: usize, shift: ShiftId) -> Self {
        self.requests.insert((employee_index, day_index), shift);
        self
    }

    #[inline]
    fn requested(&self, employee_index: usize, day_index: usize) -> Option<ShiftId> {
        self.requests.get(&(employee_index, day_index)).copied()
    }
}

impl Constraint for ShiftOnRequestsConstraint {
    fn name(&self) -> &str {
        "shift-on-requests"
    }

    fn evaluator(&self) -> &dyn ConstraintEvaluator {
        self
    }
}

impl ConstraintEvaluator for ShiftOnRequestsConstraint {
    fn cost(&self, solution: &Solution<'_>) -> i64 {
        let mut unmet = 0;
        for (&(employee, day), &shift) in &self.requests {
            if solution.assignment(day, employee) != Some(shift) {
                unmet += 1;
            }
        }
        self.weight * unmet
    }

    fn swap_cost_difference(&self, solution: &Solution<'_>, mv: &SwapMove) -> i64 {
        let mut diff = 0;
        for day in mv.start_day()..=mv.end_day() {
            for employee in [mv.employee1(), mv.employee2()] {
                let Some(requested) = self.requested(employee, day) else {
                    continue;
                };
                let met_before = solution.assignment(day, employee) == Some(requested);
                let met_after = assignment_after_swap(solution, mv, day, employee) == Some(requested);
                diff += met_before as i64 - met_after as i64;
            }
        }
        self.weight * diff
    }

    fn satisfaction_difference(&self, solution: &Solution<'_>, mv: &SwapMove) -> SatisfactionDelta {
        let mut delta = SatisfactionDelta::zero();
        for day in mv.start_day()..=mv.end_day() {
            for employee in [mv.employee1(), mv.employee2()] {
                let Some(requested) = self.requested(employee, day) else {
                    continue;
                };
                let met_before = solution.assignment(day, employee) == Some(requested);
                let met_after = assignment_after_swap(solution, mv, day, employee) == Some(requested);
                if !met_before && met_after {
                    delta.newly_satisfied += 1;
                } else if met_before && !met_after {
                    delta.newly_unsatisfied += 1;
                }
            }
        }
        delta
    }

    fn estimated_assignment_cost(
        &self,
        _solution: &Solution<'_>,
        employee_index: usize,
        shift: ShiftId,
        day_index: usize,
    ) -> i64 {
        match self.requested(employee_index, day_index) {
            Some(requested) if requested == shift => 0,
            Some(_) => self.weight,
            None => 0,
        }
    }

    fn has_preferred_assignment(&self, day_index: usize, employee_index: usize) -> bool {
        self.requested(employee_index, day_index).is_some()
    }

    fn is_preferred_assignment(
        &self,
        day_index: usize,
        employee_index: usize,
        shift: ShiftId,
    ) -> bool {
        self.requested(employee_index, day_index) == Some(shift)
    }
}

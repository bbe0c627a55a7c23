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

use crate::constraint::Constraint;
use crate::problem::employee::{Contract, Employee};
use crate::problem::period::SchedulingPeriod;
use crate::problem::shift::{Shift, ShiftId};

/// An immutable shift rostering problem instance: the scheduling period, the
/// shift and employee catalogs, the per-day demand for each shift type, and
/// the constraints grouped by rank (rank 0 is the hardest).
///
/// Solutions borrow the problem for their whole life; the problem never
/// references solutions back.
pub struct Problem {
    shifts: Vec<Shift>,
    employees: Vec<Employee>,
    contracts: Vec<Contract>,
    period: SchedulingPeriod,
    // Demand matrix, day-major: demand[day][shift].
    demand: Vec<Vec<u32>>,
    constraints: Vec<Vec<Box<dyn Constraint>>>,
}

impl Problem {
    pub(crate) fn from_parts(
        shifts: Vec<Shift>,
        employees: Vec<Employee>,
        contracts: Vec<Contract>,
        period: SchedulingPeriod,
        demand: Vec<Vec<u32>>,
        constraints: Vec<Vec<Box<dyn Constraint>>>,
    ) -> Self {
        Self {
            shifts,
            employees,
            contracts,
            period,
            demand,
            constraints,
        }
    }

    #[inline]
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    #[inline]
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    #[inline]
    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    #[inline]
    pub fn scheduling_period(&self) -> &SchedulingPeriod {
        &self.period
    }

    #[inline]
    pub fn num_days(&self) -> usize {
        self.period.size()
    }

    #[inline]
    pub fn num_employees(&self) -> usize {
        self.employees.len()
    }

    #[inline]
    pub fn num_shifts(&self) -> usize {
        self.shifts.len()
    }

    /// Demand for a shift type on a day.
    #[inline]
    pub fn demand(&self, shift: ShiftId, day_index: usize) -> u32 {
        self.demand[day_index][shift.index()]
    }

    /// Total demand over all shift types on a day.
    #[inline]
    pub fn day_demand(&self, day_index: usize) -> u32 {
        self.demand[day_index].iter().sum()
    }

    /// Contract of the employee at the given column index.
    #[inline]
    pub fn contract_of(&self, employee_index: usize) -> &Contract {
        &self.contracts[self.employees[employee_index].contract().index()]
    }

    /// Constraints of a rank. Rank `0` is the hardest.
    #[inline]
    pub fn constraints(&self, rank_index: usize) -> &[Box<dyn Constraint>] {
        &self.constraints[rank_index]
    }

    /// Number of constraint ranks. This is the length of every
    /// [`Evaluation`](crate::eval::Evaluation) produced for this problem.
    #[inline]
    pub fn rank_count(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn max_constraint_rank_index(&self) -> usize {
        self.constraints.len().saturating_sub(1)
    }
}

impl std::fmt::Debug for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem")
            .field("shifts", &self.shifts.len())
            .field("employees", &self.employees.len())
            .field("days", &self.period.size())
            .field("ranks", &self.constraints.len())
            .finish()
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Problem({} employees, {} shifts, {} days, {} constraint ranks)",
            self.employees.len(),
            self.shifts.len(),
            self.period.size(),
            self.constraints.len()
        )
    }
}

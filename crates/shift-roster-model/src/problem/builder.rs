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
use crate::problem::employee::{Contract, ContractId, Employee, EmployeeId};
use crate::problem::err::{
    DemandOutOfRangeError, EmptySchedulingPeriodError, NoEmployeesError, ProblemBuildError,
    UnknownContractError,
};
use crate::problem::period::{DayOfWeek, SchedulingPeriod};
use crate::problem::prob::Problem;
use crate::problem::shift::{Shift, ShiftId};

/// Builder assembling a [`Problem`]. Identifiers are handed out in
/// registration order, so callers can wire demand and constraints against
/// the identifiers they received.
pub struct ProblemBuilder {
    shifts: Vec<Shift>,
    employees: Vec<Employee>,
    contracts: Vec<Contract>,
    period: Option<SchedulingPeriod>,
    demand: Vec<(ShiftId, usize, u32)>,
    constraints: Vec<Vec<Box<dyn Constraint>>>,
}

impl Default for ProblemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemBuilder {
    pub fn new() -> Self {
        Self {
            shifts: Vec::new(),
            employees: Vec::new(),
            contracts: Vec::new(),
            period: None,
            demand: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn scheduling_period(&mut self, num_days: usize, first_day: DayOfWeek) -> &mut Self {
        self.period = Some(SchedulingPeriod::new(num_days, first_day));
        self
    }

    pub fn add_shift(&mut self, label: impl Into<String>) -> ShiftId {
        let id = ShiftId::new(self.shifts.len() as u32);
        self.shifts.push(Shift::new(id, label));
        id
    }

    pub fn add_contract(
        &mut self,
        label: impl Into<String>,
        max_consecutive_work_days: u32,
    ) -> ContractId {
        let id = ContractId::new(self.contracts.len() as u32);
        self.contracts
            .push(Contract::new(id, label, max_consecutive_work_days));
        id
    }

    pub fn add_employee(&mut self, name: impl Into<String>, contract: ContractId) -> EmployeeId {
        let id = EmployeeId::new(self.employees.len() as u32);
        self.employees.push(Employee::new(id, name, contract));
        id
    }

    /// Records the demand for a shift type on a day. Unset entries default
    /// to zero.
    pub fn set_demand(&mut self, shift: ShiftId, day_index: usize, count: u32) -> &mut Self {
        self.demand.push((shift, day_index, count));
        self
    }

    /// Registers a constraint under the given rank. Rank `0` is the hardest;
    /// missing intermediate ranks are created empty.
    pub fn add_constraint(&mut self, rank_index: usize, constraint: Box<dyn Constraint>) -> &mut Self {
        if self.constraints.len() <= rank_index {
            self.constraints.resize_with(rank_index + 1, Vec::new);
        }
        self.constraints[rank_index].push(constraint);
        self
    }

    pub fn build(self) -> Result<Problem, ProblemBuildError> {
        let period = self.period.ok_or(EmptySchedulingPeriodError)?;
        if period.size() == 0 {
            return Err(EmptySchedulingPeriodError.into());
        }
        if self.employees.is_empty() {
            return Err(NoEmployeesError.into());
        }
        for e in &self.employees {
            if e.contract().index() >= self.contracts.len() {
                return Err(UnknownContractError::new(e.id(), e.contract()).into());
            }
        }

        let mut demand = vec![vec![0u32; self.shifts.len()]; period.size()];
        for (shift, day_index, count) in self.demand {
            if day_index >= period.size() || shift.index() >= self.shifts.len() {
                return Err(DemandOutOfRangeError::new(shift, day_index).into());
            }
            demand[day_index][shift.index()] = count;
        }

        Ok(Problem::from_parts(
            self.shifts,
            self.employees,
            self.contracts,
            period,
            demand,
            self.constraints,
        ))
    }
}

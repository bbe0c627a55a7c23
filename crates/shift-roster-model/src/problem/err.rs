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

use crate::problem::employee::{ContractId, EmployeeId};
use crate::problem::shift::ShiftId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmptySchedulingPeriodError;

impl std::fmt::Display for EmptySchedulingPeriodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "The scheduling period contains no days.")
    }
}

impl std::error::Error for EmptySchedulingPeriodError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoEmployeesError;

impl std::fmt::Display for NoEmployeesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "The problem contains no employees.")
    }
}

impl std::error::Error for NoEmployeesError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownContractError {
    employee: EmployeeId,
    contract: ContractId,
}

impl UnknownContractError {
    pub fn new(employee: EmployeeId, contract: ContractId) -> Self {
        Self { employee, contract }
    }

    pub fn employee(&self) -> EmployeeId {
        self.employee
    }

    pub fn contract(&self) -> ContractId {
        self.contract
    }
}

impl std::fmt::Display for UnknownContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Employee {} references unknown {}",
            self.employee, self.contract
        )
    }
}

impl std::error::Error for UnknownContractError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DemandOutOfRangeError {
    shift: ShiftId,
    day_index: usize,
}

impl DemandOutOfRangeError {
    pub fn new(shift: ShiftId, day_index: usize) -> Self {
        Self { shift, day_index }
    }

    pub fn shift(&self) -> ShiftId {
        self.shift
    }

    pub fn day_index(&self) -> usize {
        self.day_index
    }
}

impl std::fmt::Display for DemandOutOfRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Demand entry for {} on day {} lies outside the problem",
            self.shift, self.day_index
        )
    }
}

impl std::error::Error for DemandOutOfRangeError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProblemBuildError {
    EmptySchedulingPeriod(EmptySchedulingPeriodError),
    NoEmployees(NoEmployeesError),
    UnknownContract(UnknownContractError),
    DemandOutOfRange(DemandOutOfRangeError),
}

impl std::fmt::Display for ProblemBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemBuildError::EmptySchedulingPeriod(e) => write!(f, "{}", e),
            ProblemBuildError::NoEmployees(e) => write!(f, "{}", e),
            ProblemBuildError::UnknownContract(e) => write!(f, "{}", e),
            ProblemBuildError::DemandOutOfRange(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ProblemBuildError {}

impl From<EmptySchedulingPeriodError> for ProblemBuildError {
    fn from(err: EmptySchedulingPeriodError) -> Self {
        ProblemBuildError::EmptySchedulingPeriod(err)
    }
}

impl From<NoEmployeesError> for ProblemBuildError {
    fn from(err: NoEmployeesError) -> Self {
        ProblemBuildError::NoEmployees(err)
    }
}

impl From<UnknownContractError> for ProblemBuildError {
    fn from(err: UnknownContractError) -> Self {
        ProblemBuildError::UnknownContract(err)
    }
}

impl From<DemandOutOfRangeError> for ProblemBuildError {
    fn from(err: DemandOutOfRangeError) -> Self {
        ProblemBuildError::DemandOutOfRange(err)
    }
}

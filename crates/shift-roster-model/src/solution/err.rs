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

use crate::problem::ShiftId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotNotFoundError {
    shift: ShiftId,
    day_index: usize,
}

impl SlotNotFoundError {
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

impl std::fmt::Display for SlotNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "No slot for {} on day {} at the requested origin",
            self.shift, self.day_index
        )
    }
}

impl std::error::Error for SlotNotFoundError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmployeeAlreadyAssignedError {
    employee_index: usize,
    day_index: usize,
}

impl EmployeeAlreadyAssignedError {
    pub fn new(employee_index: usize, day_index: usize) -> Self {
        Self {
            employee_index,
            day_index,
        }
    }

    pub fn employee_index(&self) -> usize {
        self.employee_index
    }

    pub fn day_index(&self) -> usize {
        self.day_index
    }
}

impl std::fmt::Display for EmployeeAlreadyAssignedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Employee {} already holds an assignment on day {}",
            self.employee_index, self.day_index
        )
    }
}

impl std::error::Error for EmployeeAlreadyAssignedError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SolutionError {
    SlotNotFound(SlotNotFoundError),
    EmployeeAlreadyAssigned(EmployeeAlreadyAssignedError),
}

impl std::fmt::Display for SolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionError::SlotNotFound(e) => write!(f, "{}", e),
            SolutionError::EmployeeAlreadyAssigned(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SolutionError {}

impl From<SlotNotFoundError> for SolutionError {
    fn from(err: SlotNotFoundError) -> Self {
        SolutionError::SlotNotFound(err)
    }
}

impl From<EmployeeAlreadyAssignedError> for SolutionError {
    fn from(err: EmployeeAlreadyAssignedError) -> Self {
        SolutionError::EmployeeAlreadyAssigned(err)
    }
}

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

/// Identifier of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContractId(u32);

impl ContractId {
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "contract {}", self.0)
    }
}

/// Identifier of an employee. Employee identifiers index into
/// [`Problem::employees`](crate::problem::Problem::employees); the solution
/// matrix columns follow the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmployeeId(u32);

impl EmployeeId {
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "employee {}", self.0)
    }
}

/// Working regulations shared by a group of employees. The engine consults
/// the contract through constraint evaluators only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Contract {
    id: ContractId,
    label: String,
    max_consecutive_work_days: u32,
}

impl Contract {
    #[inline]
    pub fn new(id: ContractId, label: impl Into<String>, max_consecutive_work_days: u32) -> Self {
        Self {
            id,
            label: label.into(),
            max_consecutive_work_days,
        }
    }

    #[inline]
    pub fn id(&self) -> ContractId {
        self.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn max_consecutive_work_days(&self) -> u32 {
        self.max_consecutive_work_days
    }
}

/// An employee bound to a contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Employee {
    id: EmployeeId,
    name: String,
    contract: ContractId,
}

impl Employee {
    #[inline]
    pub fn new(id: EmployeeId, name: impl Into<String>, contract: ContractId) -> Self {
        Self {
            id,
            name: name.into(),
            contract,
        }
    }

    #[inline]
    pub fn id(&self) -> EmployeeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn contract(&self) -> ContractId {
        self.contract
    }
}

impl std::fmt::Display for Employee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Employee({}, {})", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_carries_contract() {
        let c = Contract::new(ContractId::new(0), "full-time", 5);
        let e = Employee::new(EmployeeId::new(2), "E2", c.id());
        assert_eq!(e.contract(), ContractId::new(0));
        assert_eq!(c.max_consecutive_work_days(), 5);
        assert_eq!(e.id().index(), 2);
    }
}

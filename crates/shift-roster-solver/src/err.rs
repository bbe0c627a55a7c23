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

/// A configuration value handed to an operator or worker was out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidParameterError {
    parameter: &'static str,
    requirement: &'static str,
}

impl InvalidParameterError {
    pub fn new(parameter: &'static str, requirement: &'static str) -> Self {
        Self {
            parameter,
            requirement,
        }
    }

    pub fn parameter(&self) -> &'static str {
        self.parameter
    }

    pub fn requirement(&self) -> &'static str {
        self.requirement
    }
}

impl std::fmt::Display for InvalidParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid parameter `{}`: {}",
            self.parameter, self.requirement
        )
    }
}

impl std::error::Error for InvalidParameterError {}

/// An operator was stepped before `init` was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotInitializedError {
    operator: &'static str,
}

impl NotInitializedError {
    pub fn new(operator: &'static str) -> Self {
        Self { operator }
    }

    pub fn operator(&self) -> &'static str {
        self.operator
    }
}

impl std::fmt::Display for NotInitializedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Operator `{}` was stepped before init", self.operator)
    }
}

impl std::error::Error for NotInitializedError {}

/// The last-evaluated neighbor was requested although enumeration has not
/// produced one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoSuchNeighborError;

impl std::fmt::Display for NoSuchNeighborError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "No neighbor has been evaluated yet")
    }
}

impl std::error::Error for NoSuchNeighborError {}

/// Construction exhausted the candidate employees while demand remained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoFeasibleSolutionError {
    day_index: usize,
}

impl NoFeasibleSolutionError {
    pub fn new(day_index: usize) -> Self {
        Self { day_index }
    }

    pub fn day_index(&self) -> usize {
        self.day_index
    }
}

impl std::fmt::Display for NoFeasibleSolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "The demand on day {} cannot be covered with the available employees",
            self.day_index
        )
    }
}

impl std::error::Error for NoFeasibleSolutionError {}

/// Errors surfaced while stepping an operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperatorError {
    NotInitialized(NotInitializedError),
    InvalidParameter(InvalidParameterError),
    NoFeasibleSolution(NoFeasibleSolutionError),
}

impl std::fmt::Display for OperatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatorError::NotInitialized(e) => write!(f, "{}", e),
            OperatorError::InvalidParameter(e) => write!(f, "{}", e),
            OperatorError::NoFeasibleSolution(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for OperatorError {}

impl From<NotInitializedError> for OperatorError {
    fn from(err: NotInitializedError) -> Self {
        OperatorError::NotInitialized(err)
    }
}

impl From<InvalidParameterError> for OperatorError {
    fn from(err: InvalidParameterError) -> Self {
        OperatorError::InvalidParameter(err)
    }
}

impl From<NoFeasibleSolutionError> for OperatorError {
    fn from(err: NoFeasibleSolutionError) -> Self {
        OperatorError::NoFeasibleSolution(err)
    }
}

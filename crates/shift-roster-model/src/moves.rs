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
use crate::solution::Solution;

/// Block swap between two employees: exchanges their assignments on every
/// day of the window `[start_day, start_day + block_size - 1]`.
///
/// Applying the same swap twice restores the original assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapMove {
    employee1: usize,
    employee2: usize,
    start_day: usize,
    block_size: usize,
}

impl SwapMove {
    #[inline]
    pub const fn new(
        employee1: usize,
        employee2: usize,
        start_day: usize,
        block_size: usize,
    ) -> Self {
        Self {
            employee1,
            employee2,
            start_day,
            block_size,
        }
    }

    #[inline]
    pub const fn employee1(&self) -> usize {
        self.employee1
    }

    #[inline]
    pub const fn employee2(&self) -> usize {
        self.employee2
    }

    #[inline]
    pub const fn start_day(&self) -> usize {
        self.start_day
    }

    #[inline]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub const fn end_day(&self) -> usize {
        self.start_day + self.block_size - 1
    }

    /// Returns `true` iff applying the move would change the solution, i.e.
    /// the two employees differ on at least one day of the window.
    pub fn alters(&self, solution: &Solution<'_>) -> bool {
        for day in self.start_day..=self.end_day() {
            if solution.assignment(day, self.employee1) != solution.assignment(day, self.employee2)
            {
                return true;
            }
        }
        false
    }

    /// Number of cells that would change when applying the move: two per day
    /// on which the employees' assignments differ.
    pub fn resulting_distance(&self, solution: &Solution<'_>) -> usize {
        let mut distance = 0;
        for day in self.start_day..=self.end_day() {
            if solution.assignment(day, self.employee1) != solution.assignment(day, self.employee2)
            {
                distance += 2;
            }
        }
        distance
    }
}

impl std::fmt::Display for SwapMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SwapMove(e{} <-> e{}, days {}..={})",
            self.employee1,
            self.employee2,
            self.start_day,
            self.end_day()
        )
    }
}

/// Moves a single shift-slot on one day: the slot is removed from its origin
/// (an employee, or `None` for the unassigned-slot bucket) and handed to the
/// target (an employee, or `None` to push it back into the bucket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemoveReplaceMove {
    origin_employee: Option<usize>,
    target_employee: Option<usize>,
    shift_slot: ShiftId,
    day_index: usize,
}

impl RemoveReplaceMove {
    #[inline]
    pub const fn new(
        origin_employee: Option<usize>,
        target_employee: Option<usize>,
        shift_slot: ShiftId,
        day_index: usize,
    ) -> Self {
        Self {
            origin_employee,
            target_employee,
            shift_slot,
            day_index,
        }
    }

    #[inline]
    pub const fn origin_employee(&self) -> Option<usize> {
        self.origin_employee
    }

    #[inline]
    pub const fn target_employee(&self) -> Option<usize> {
        self.target_employee
    }

    #[inline]
    pub const fn shift_slot(&self) -> ShiftId {
        self.shift_slot
    }

    #[inline]
    pub const fn day_index(&self) -> usize {
        self.day_index
    }
}

impl std::fmt::Display for RemoveReplaceMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let origin = match self.origin_employee {
            Some(e) => format!("e{}", e),
            None => "unassigned".to_string(),
        };
        let target = match self.target_employee {
            Some(e) => format!("e{}", e),
            None => "unassigned".to_string(),
        };
        write!(
            f,
            "RemoveReplaceMove({} on day {}: {} -> {})",
            self.shift_slot, self.day_index, origin, target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_day_is_inclusive() {
        let mv = SwapMove::new(0, 1, 3, 4);
        assert_eq!(mv.end_day(), 6);
        assert_eq!(mv.block_size(), 4);
    }

    #[test]
    fn display_mentions_employees() {
        let mv = SwapMove::new(2, 5, 0, 1);
        let s = mv.to_string();
        assert!(s.contains("e2"));
        assert!(s.contains("e5"));
    }

    #[test]
    fn remove_replace_display_names_bucket() {
        let mv = RemoveReplaceMove::new(None, Some(3), ShiftId::new(0), 2);
        let s = mv.to_string();
        assert!(s.contains("unassigned"));
        assert!(s.contains("e3"));
    }
}

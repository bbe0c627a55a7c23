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

use crate::eval::Evaluation;
use crate::moves::{RemoveReplaceMove, SwapMove};
use crate::problem::{Problem, ShiftId};
use crate::solution::err::{EmployeeAlreadyAssignedError, SlotNotFoundError, SolutionError};

/// A timetable for a [`Problem`]: a day-major matrix of optional shift
/// assignments plus, per day, the multiset of demand slots not yet covered.
///
/// Invariant: for every day, the multiset of non-absent assignments unioned
/// with the unassigned slots equals the demand multiset of that day. All
/// mutators of this type preserve the invariant; the evaluation cache is the
/// caller's responsibility (mutating operators either install the
/// incrementally computed evaluation or invalidate the cache).
///
/// Cloning deep-copies the assignment state and shares the problem handle.
#[derive(Clone)]
pub struct Solution<'p> {
    problem: &'p Problem,
    // assignments[day][employee]
    assignments: Vec<Vec<Option<ShiftId>>>,
    // unassigned_slots[day] is a multiset of uncovered demand slots
    unassigned_slots: Vec<Vec<ShiftId>>,
    evaluation: Option<Evaluation>,
}

impl<'p> Solution<'p> {
    /// Creates an empty timetable: no assignments, the full demand of every
    /// day sitting in the unassigned-slot buckets.
    pub fn new(problem: &'p Problem) -> Self {
        let days = problem.num_days();
        let employees = problem.num_employees();
        let mut unassigned_slots = Vec::with_capacity(days);
        for day in 0..days {
            let mut slots = Vec::new();
            for shift in problem.shifts() {
                for _ in 0..problem.demand(shift.id(), day) {
                    slots.push(shift.id());
                }
            }
            unassigned_slots.push(slots);
        }
        Self {
            problem,
            assignments: vec![vec![None; employees]; days],
            unassigned_slots,
            evaluation: None,
        }
    }

    #[inline]
    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    #[inline]
    pub fn num_days(&self) -> usize {
        self.assignments.len()
    }

    #[inline]
    pub fn num_employees(&self) -> usize {
        self.problem.num_employees()
    }

    #[inline]
    pub fn assignment(&self, day_index: usize, employee_index: usize) -> Option<ShiftId> {
        self.assignments[day_index][employee_index]
    }

    /// Writes a cell of the assignment matrix. The evaluation cache is left
    /// untouched; callers either invalidate it or install a delta-computed
    /// evaluation afterwards.
    #[inline]
    pub fn set_assignment(
        &mut self,
        day_index: usize,
        employee_index: usize,
        assignment: Option<ShiftId>,
    ) {
        self.assignments[day_index][employee_index] = assignment;
    }

    #[inline]
    pub fn is_employee_free(&self, day_index: usize, employee_index: usize) -> bool {
        self.assignments[day_index][employee_index].is_none()
    }

    /// Number of employees assigned to `shift` on a day.
    pub fn assigned_count(&self, day_index: usize, shift: ShiftId) -> usize {
        self.assignments[day_index]
            .iter()
            .filter(|cell| **cell == Some(shift))
            .count()
    }

    #[inline]
    pub fn unassigned_slots(&self, day_index: usize) -> &[ShiftId] {
        &self.unassigned_slots[day_index]
    }

    #[inline]
    pub fn has_unassigned_slots(&self, day_index: usize) -> bool {
        !self.unassigned_slots[day_index].is_empty()
    }

    /// Removes and returns the first unassigned slot of a day, if any.
    #[inline]
    pub fn pop_unassigned_slot(&mut self, day_index: usize) -> Option<ShiftId> {
        let slots = &mut self.unassigned_slots[day_index];
        if slots.is_empty() {
            None
        } else {
            Some(slots.remove(0))
        }
    }

    #[inline]
    pub fn push_unassigned_slot(&mut self, day_index: usize, shift: ShiftId) {
        self.unassigned_slots[day_index].push(shift);
    }

    #[inline]
    pub fn clear_unassigned_slots(&mut self, day_index: usize) {
        self.unassigned_slots[day_index].clear();
    }

    /// Total number of uncovered demand slots over the whole period.
    pub fn total_unassigned_slots(&self) -> usize {
        self.unassigned_slots.iter().map(|s| s.len()).sum()
    }

    /// Exchanges the assignments of the two employees of the move on every
    /// day of its window. Does not touch the evaluation cache.
    pub fn apply_swap(&mut self, mv: &SwapMove) {
        for day in mv.start_day()..=mv.end_day() {
            let row = &mut self.assignments[day];
            row.swap(mv.employee1(), mv.employee2());
        }
    }

    /// Applies a remove-replace move: takes the shift slot from its origin
    /// (an employee cell or the unassigned bucket) and hands it to the
    /// target. Invalidates the evaluation cache.
    pub fn apply_remove_replace(&mut self, mv: &RemoveReplaceMove) -> Result<(), SolutionError> {
        let day = mv.day_index();
        // Detach from the origin.
        match mv.origin_employee() {
            Some(employee) => {
                if self.assignments[day][employee] != Some(mv.shift_slot()) {
                    return Err(SlotNotFoundError::new(mv.shift_slot(), day).into());
                }
                self.assignments[day][employee] = None;
            }
            None => {
                let slots = &mut self.unassigned_slots[day];
                match slots.iter().position(|s| *s == mv.shift_slot()) {
                    Some(pos) => {
                        slots.remove(pos);
                    }
                    None => return Err(SlotNotFoundError::new(mv.shift_slot(), day).into()),
                }
            }
        }
        // Attach to the target.
        match mv.target_employee() {
            Some(employee) => {
                if self.assignments[day][employee].is_some() {
                    // Roll the detach back so the coverage invariant holds.
                    match mv.origin_employee() {
                        Some(origin) => self.assignments[day][origin] = Some(mv.shift_slot()),
                        None => self.unassigned_slots[day].push(mv.shift_slot()),
                    }
                    return Err(EmployeeAlreadyAssignedError::new(employee, day).into());
                }
                self.assignments[day][employee] = Some(mv.shift_slot());
            }
            None => self.unassigned_slots[day].push(mv.shift_slot()),
        }
        self.invalidate_evaluation();
        Ok(())
    }

    /// The lexicographic evaluation of this solution, computed through the
    /// problem's constraint evaluators and cached until invalidated.
    pub fn evaluation(&mut self) -> &Evaluation {
        if self.evaluation.is_none() {
            let computed = self.compute_evaluation();
            self.evaluation = Some(computed);
        }
        self.evaluation.as_ref().expect("evaluation cache populated")
    }

    #[inline]
    pub fn cached_evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.evaluation.is_some()
    }

    /// Installs an externally computed evaluation (e.g. the result of a
    /// delta query) as the cache.
    #[inline]
    pub fn set_evaluation(&mut self, evaluation: Evaluation) {
        self.evaluation = Some(evaluation);
    }

    #[inline]
    pub fn invalidate_evaluation(&mut self) {
        self.evaluation = None;
    }

    fn compute_evaluation(&self) -> Evaluation {
        let ranks = self.problem.rank_count();
        let mut evaluation = Evaluation::zero(ranks);
        for rank in 0..ranks {
            for constraint in self.problem.constraints(rank) {
                evaluation.add_at(rank, constraint.evaluator().cost(self));
            }
        }
        evaluation
    }

    /// Number of cells on which the two timetables differ.
    pub fn distance_to(&self, other: &Solution<'_>) -> usize {
        let mut distance = 0;
        for (row, other_row) in self.assignments.iter().zip(other.assignments.iter()) {
            for (cell, other_cell) in row.iter().zip(other_row.iter()) {
                if cell != other_cell {
                    distance += 1;
                }
            }
        }
        distance
    }

    /// Cell-wise equality of the assignment matrices. Unassigned slots and
    /// evaluation caches are not compared.
    pub fn equal_assignments(&self, other: &Solution<'_>) -> bool {
        self.assignments == other.assignments
    }

    /// Assignments of one employee over the whole period, in day order.
    #[inline]
    pub fn employee_assignments(
        &self,
        employee_index: usize,
    ) -> impl Iterator<Item = Option<ShiftId>> + '_ {
        self.assignments.iter().map(move |row| row[employee_index])
    }
}

impl std::fmt::Debug for Solution<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solution")
            .field("days", &self.num_days())
            .field("employees", &self.num_employees())
            .field("unassigned", &self.total_unassigned_slots())
            .field("evaluation", &self.evaluation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::coverage::ShiftCoverageConstraint;
    use crate::problem::{DayOfWeek, ProblemBuilder};

    fn two_employee_problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(3, DayOfWeek::Monday);
        let early = builder.add_shift("Early");
        let late = builder.add_shift("Late");
        let contract = builder.add_contract("full-time", 5);
        builder.add_employee("E0", contract);
        builder.add_employee("E1", contract);
        for day in 0..3 {
            builder.set_demand(early, day, 1);
        }
        builder.set_demand(late, 1, 1);
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    #[test]
    fn new_solution_carries_full_demand_unassigned() {
        let problem = two_employee_problem();
        let solution = Solution::new(&problem);
        assert_eq!(solution.total_unassigned_slots(), 4);
        assert_eq!(solution.unassigned_slots(1).len(), 2);
        assert!(solution.is_employee_free(0, 0));
    }

    #[test]
    fn swap_application_is_an_involution() {
        let problem = two_employee_problem();
        let mut solution = Solution::new(&problem);
        let early = problem.shifts()[0].id();
        solution.pop_unassigned_slot(0);
        solution.set_assignment(0, 0, Some(early));

        let original = solution.clone();
        let mv = SwapMove::new(0, 1, 0, 2);
        solution.apply_swap(&mv);
        assert!(!solution.equal_assignments(&original));
        solution.apply_swap(&mv);
        assert!(solution.equal_assignments(&original));
    }

    #[test]
    fn remove_replace_moves_slot_between_bucket_and_employee() {
        let problem = two_employee_problem();
        let mut solution = Solution::new(&problem);
        let early = problem.shifts()[0].id();

        let assign = RemoveReplaceMove::new(None, Some(1), early, 0);
        solution.apply_remove_replace(&assign).expect("slot exists");
        assert_eq!(solution.assignment(0, 1), Some(early));
        assert_eq!(solution.unassigned_slots(0).len(), 0);

        let unassign = RemoveReplaceMove::new(Some(1), None, early, 0);
        solution
            .apply_remove_replace(&unassign)
            .expect("assignment exists");
        assert!(solution.is_employee_free(0, 1));
        assert_eq!(solution.unassigned_slots(0).len(), 1);
    }

    #[test]
    fn remove_replace_rejects_missing_slot() {
        let problem = two_employee_problem();
        let mut solution = Solution::new(&problem);
        let late = problem.shifts()[1].id();
        // Day 0 has no late demand.
        let mv = RemoveReplaceMove::new(None, Some(0), late, 0);
        assert!(matches!(
            solution.apply_remove_replace(&mv),
            Err(SolutionError::SlotNotFound(_))
        ));
    }

    #[test]
    fn remove_replace_rejects_occupied_target_and_rolls_back() {
        let problem = two_employee_problem();
        let mut solution = Solution::new(&problem);
        let early = problem.shifts()[0].id();
        let late = problem.shifts()[1].id();

        solution
            .apply_remove_replace(&RemoveReplaceMove::new(None, Some(0), early, 1))
            .expect("first assignment");
        let before = solution.unassigned_slots(1).len();
        let mv = RemoveReplaceMove::new(None, Some(0), late, 1);
        assert!(matches!(
            solution.apply_remove_replace(&mv),
            Err(SolutionError::EmployeeAlreadyAssigned(_))
        ));
        // The detached slot went back to the bucket.
        assert_eq!(solution.unassigned_slots(1).len(), before);
    }

    #[test]
    fn evaluation_counts_uncovered_demand() {
        let problem = two_employee_problem();
        let mut solution = Solution::new(&problem);
        assert_eq!(solution.evaluation().cost(0), 4);
        let early = problem.shifts()[0].id();
        solution
            .apply_remove_replace(&RemoveReplaceMove::new(None, Some(0), early, 0))
            .expect("assignment");
        assert_eq!(solution.evaluation().cost(0), 3);
    }

    #[test]
    fn distance_counts_differing_cells() {
        let problem = two_employee_problem();
        let mut a = Solution::new(&problem);
        let b = a.clone();
        let early = problem.shifts()[0].id();
        a.pop_unassigned_slot(0);
        a.set_assignment(0, 0, Some(early));
        assert_eq!(a.distance_to(&b), 1);
        assert_eq!(b.distance_to(&a), 1);
        assert!(!a.equal_assignments(&b));
    }

    #[test]
    fn clone_shares_problem_and_copies_state() {
        let problem = two_employee_problem();
        let mut a = Solution::new(&problem);
        let early = problem.shifts()[0].id();
        let clone = a.clone();
        a.pop_unassigned_slot(0);
        a.set_assignment(0, 0, Some(early));
        assert!(clone.is_employee_free(0, 0));
        assert!(std::ptr::eq(a.problem(), clone.problem()));
    }
}

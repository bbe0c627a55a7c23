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

use crate::descent::BiasedVariableNeighborhoodDescent;
use crate::err::{InvalidParameterError, OperatorError};
use crate::operator::Operator;
use crate::operator::construction::FastBlockConstruction;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shift_roster_model::prelude::{Constraint, Problem, Solution};

const BLOCK_SIZES: [usize; 5] = [1, 2, 3, 5, 7];

/// Construction with a constraint-activation ladder: starts from a fast
/// random construction, then alternates biased descent to a local optimum
/// with activating one more constraint (lowest rank first, order randomized
/// within a rank) until every constraint is active. Coverage constraints
/// are active from the beginning.
pub struct ProgressiveDescentConstruction<'p, R> {
    problem: &'p Problem,
    rng: R,
    construction: Option<FastBlockConstruction<'p, R>>,
    current: Option<Solution<'p>>,
    active_constraints: Vec<Vec<&'p dyn Constraint>>,
    disabled_constraints: Vec<Vec<&'p dyn Constraint>>,
    remains_disabled: bool,
    descent: Option<BiasedVariableNeighborhoodDescent<'p, R>>,
    done: bool,
}

impl<'p, R> ProgressiveDescentConstruction<'p, R>
where
    R: Rng + SeedableRng,
{
    pub fn new(problem: &'p Problem, rng: R) -> Result<Self, InvalidParameterError> {
        if problem.num_employees() < 1 {
            return Err(InvalidParameterError::new(
                "problem",
                "construction needs at least one employee",
            ));
        }
        Ok(Self {
            problem,
            rng,
            construction: None,
            current: None,
            active_constraints: Vec::new(),
            disabled_constraints: Vec::new(),
            remains_disabled: true,
            descent: None,
            done: false,
        })
    }

    /// Activates the next disabled constraint, lowest rank first, and
    /// updates the exhaustion flag.
    fn activate_next_constraint(&mut self) {
        let mut rank = 0;
        while rank < self.disabled_constraints.len() && self.disabled_constraints[rank].is_empty()
        {
            rank += 1;
        }
        if rank == self.disabled_constraints.len() {
            self.remains_disabled = false;
            return;
        }
        let constraint = self.disabled_constraints[rank].remove(0);
        tracing::debug!(rank, constraint = constraint.name(), "activating constraint");
        self.active_constraints[rank].push(constraint);
        if rank == self.disabled_constraints.len() - 1 && self.disabled_constraints[rank].is_empty()
        {
            self.remains_disabled = false;
        }
    }
}

impl<'p, R> Operator<'p> for ProgressiveDescentConstruction<'p, R>
where
    R: Rng + SeedableRng,
{
    fn name(&self) -> &str {
        "ProgressiveDescentConstruction"
    }

    fn init(&mut self, seeds: Vec<Solution<'p>>) -> Result<(), OperatorError> {
        if !seeds.is_empty() {
            tracing::warn!("ProgressiveDescentConstruction ignores seed solutions");
        }
        self.done = false;
        self.current = None;
        self.descent = None;
        self.active_constraints.clear();
        self.disabled_constraints.clear();
        self.remains_disabled = true;
        for rank in 0..self.problem.rank_count() {
            let mut active: Vec<&'p dyn Constraint> = Vec::new();
            let mut disabled: Vec<&'p dyn Constraint> = Vec::new();
            for constraint in self.problem.constraints(rank) {
                if constraint.is_coverage() {
                    active.push(constraint.as_ref());
                } else {
                    disabled.push(constraint.as_ref());
                }
            }
            disabled.shuffle(&mut self.rng);
            self.active_constraints.push(active);
            self.disabled_constraints.push(disabled);
        }
        self.construction = Some(FastBlockConstruction::new(
            self.problem,
            R::from_rng(&mut self.rng),
        )?);
        Ok(())
    }

    fn next_step(&mut self) -> Result<bool, OperatorError> {
        if self.construction.is_none() {
            return Err(crate::err::NotInitializedError::new(
                "ProgressiveDescentConstruction",
            )
            .into());
        }
        if self.done {
            return Ok(false);
        }

        if self.current.is_none() && self.descent.is_none() {
            let construction = self.construction.as_mut().expect("operator initialized");
            construction.init(Vec::new())?;
            construction.run_to_completion()?;
            self.current = construction.take_result();
            return Ok(true);
        }

        if let Some(descent) = self.descent.as_mut() {
            if !descent.is_done() {
                descent.next_step()?;
                return Ok(true);
            }
            self.current = descent.take_solution();
            self.descent = None;
        }

        if !self.remains_disabled {
            self.done = true;
            return Ok(false);
        }

        self.activate_next_constraint();
        let mut descent = BiasedVariableNeighborhoodDescent::new(
            BLOCK_SIZES.to_vec(),
            R::from_rng(&mut self.rng),
            self.active_constraints.clone(),
        )?;
        let solution = self.current.take().expect("solution constructed");
        descent.init(solution);
        self.descent = Some(descent);
        Ok(true)
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn take_result(&mut self) -> Option<Solution<'p>> {
        if !self.done {
            return None;
        }
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use shift_roster_model::constraint::consecutive::MaxConsecutiveWorkDaysConstraint;
    use shift_roster_model::constraint::coverage::{
        ShiftCoverageConstraint, SingleAssignmentConstraint,
    };
    use shift_roster_model::constraint::requests::DayOffRequestsConstraint;
    use shift_roster_model::prelude::{DayOfWeek, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.scheduling_period(7, DayOfWeek::Monday);
        let s = builder.add_shift("S");
        let c = builder.add_contract("c", 3);
        for e in 0..4 {
            builder.add_employee(format!("E{}", e), c);
        }
        for day in 0..7 {
            builder.set_demand(s, day, 2);
        }
        builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
        builder.add_constraint(0, Box::new(SingleAssignmentConstraint::new()));
        builder.add_constraint(1, Box::new(DayOffRequestsConstraint::new(1).with_request(0, 3)));
        builder.add_constraint(1, Box::new(MaxConsecutiveWorkDaysConstraint::new(1)));
        builder.build().expect("problem builds")
    }

    #[test]
    fn produces_a_covered_solution_with_all_constraints_active() {
        let problem = problem();
        let rng = ChaCha8Rng::seed_from_u64(13);
        let mut construction =
            ProgressiveDescentConstruction::new(&problem, rng).expect("valid problem");
        construction.init(Vec::new()).expect("init");

        let mut steps = 0;
        while construction.next_step().expect("feasible instance") {
            steps += 1;
            assert!(steps < 1_000_000, "construction must terminate");
        }
        assert!(construction.is_done());

        let solution = construction.take_result().expect("result present");
        assert_eq!(solution.total_unassigned_slots(), 0);
        for day in 0..7 {
            assert_eq!(solution.assigned_count(day, problem.shifts()[0].id()), 2);
        }
    }

    #[test]
    fn stepping_before_init_fails() {
        let problem = problem();
        let rng = ChaCha8Rng::seed_from_u64(0);
        let mut construction =
            ProgressiveDescentConstruction::new(&problem, rng).expect("valid problem");
        assert!(matches!(
            construction.next_step(),
            Err(OperatorError::NotInitialized(_))
        ));
    }
}

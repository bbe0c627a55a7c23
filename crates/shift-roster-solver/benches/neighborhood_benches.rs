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

use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shift_roster_model::constraint::consecutive::MaxConsecutiveWorkDaysConstraint;
use shift_roster_model::constraint::coverage::ShiftCoverageConstraint;
use shift_roster_model::constraint::requests::DayOffRequestsConstraint;
use shift_roster_model::prelude::{DayOfWeek, Problem, ProblemBuilder, Solution};
use shift_roster_solver::neighborhood::SwapNeighborhood;
use std::hint::black_box;

fn benchmark_problem(days: usize, employees: usize) -> Problem {
    let mut builder = ProblemBuilder::new();
    builder.scheduling_period(days, DayOfWeek::Monday);
    let early = builder.add_shift("Early");
    let late = builder.add_shift("Late");
    let contract = builder.add_contract("full-time", 5);
    for e in 0..employees {
        builder.add_employee(format!("E{}", e), contract);
    }
    for day in 0..days {
        builder.set_demand(early, day, (employees / 4) as u32);
        builder.set_demand(late, day, (employees / 4) as u32);
    }
    builder.add_constraint(0, Box::new(ShiftCoverageConstraint::new(1)));
    let mut day_off = DayOffRequestsConstraint::new(1);
    for e in 0..employees {
        day_off = day_off.with_request(e, e % days);
    }
    builder.add_constraint(1, Box::new(day_off));
    builder.add_constraint(1, Box::new(MaxConsecutiveWorkDaysConstraint::new(1)));
    builder.build().expect("benchmark problem builds")
}

fn covered_solution(problem: &Problem) -> Solution<'_> {
    let early = problem.shifts()[0].id();
    let late = problem.shifts()[1].id();
    let quarter = problem.num_employees() / 4;
    let mut solution = Solution::new(problem);
    for day in 0..problem.num_days() {
        solution.clear_unassigned_slots(day);
        for e in 0..quarter {
            solution.set_assignment(day, e, Some(early));
        }
        for e in quarter..(2 * quarter) {
            solution.set_assignment(day, e, Some(late));
        }
    }
    solution
}

fn swap_neighborhood_enumeration(c: &mut Criterion) {
    let problem = benchmark_problem(28, 16);
    let solution = covered_solution(&problem);

    let mut group = c.benchmark_group("swap_neighborhood");
    for block_size in [1usize, 3, 7] {
        group.bench_function(format!("enumerate_block_{}", block_size), |b| {
            b.iter(|| {
                let mut neighborhood = SwapNeighborhood::new(
                    black_box(solution.clone()),
                    block_size,
                    false,
                    Some(ChaCha8Rng::seed_from_u64(1)),
                )
                .expect("valid block size");
                let mut visited = 0u64;
                while neighborhood.next_neighbor_evaluation().is_some() {
                    visited += 1;
                }
                visited
            })
        });
    }
    group.finish();
}

criterion_group!(benches, swap_neighborhood_enumeration);
criterion_main!(benches);

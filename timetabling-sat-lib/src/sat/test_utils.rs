//! Test-only SAT backend: exhaustive backtracking over the variable
//! space, so strategy tests do not depend on solver binaries being
//! installed. Only suitable for the tiny fixtures used in tests.

use super::{Clause, Sat, SatSolver, Solution};
use crate::error::Result;

pub(crate) struct EnumerationSolver;

impl SatSolver for EnumerationSolver {
    fn solve(&self, sat: &Sat) -> Result<Option<Solution>> {
        let mut assignment: Vec<Option<bool>> = vec![None; sat.variables];
        if backtrack(&sat.clauses, &mut assignment, 0) {
            let solution = assignment
                .iter()
                .enumerate()
                .map(|(slot, value)| {
                    let variable = (slot + 1) as i64;
                    match value {
                        Some(true) => variable,
                        _ => -variable,
                    }
                })
                .collect();
            Ok(Some(solution))
        } else {
            Ok(None)
        }
    }
}

fn backtrack(clauses: &[Clause], assignment: &mut Vec<Option<bool>>, next: usize) -> bool {
    if clauses
        .iter()
        .any(|clause| violated(clause, assignment))
    {
        return false;
    }
    if next == assignment.len() {
        return true;
    }

    // Trying `true` first makes the solver report free variables as
    // true, which exercises the explicit-variable filtering downstream.
    for value in [true, false] {
        assignment[next] = Some(value);
        if backtrack(clauses, assignment, next + 1) {
            return true;
        }
    }
    assignment[next] = None;
    false
}

/// A clause is violated once every literal is assigned against it. The
/// empty clause is violated by definition.
fn violated(clause: &Clause, assignment: &[Option<bool>]) -> bool {
    clause.iter().all(|&literal| {
        let slot = literal.unsigned_abs() as usize - 1;
        match assignment[slot] {
            Some(value) => value != (literal > 0),
            None => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfiable_instance() {
        let sat = Sat {
            variables: 3,
            clauses: vec![vec![1, 2], vec![-1, 3], vec![-2]],
        };
        let solution = EnumerationSolver.solve(&sat).unwrap().unwrap();

        assert_eq!(solution.len(), 3);
        assert!(solution.contains(&1));
        assert!(solution.contains(&-2));
        assert!(solution.contains(&3));
    }

    #[test]
    fn test_unsatisfiable_instance() {
        let sat = Sat {
            variables: 1,
            clauses: vec![vec![1], vec![-1]],
        };
        assert!(EnumerationSolver.solve(&sat).unwrap().is_none());
    }

    #[test]
    fn test_empty_clause_is_unsatisfiable() {
        let sat = Sat {
            variables: 2,
            clauses: vec![vec![]],
        };
        assert!(EnumerationSolver.solve(&sat).unwrap().is_none());
    }
}

//! CNF container, DIMACS wire format and external solver adapters.

mod solver;

pub use solver::{ExternalSolver, SatSolver, SolverConfig, SolverKind};

#[cfg(test)]
pub(crate) mod test_utils;

use itertools::Itertools;

use crate::error::{Result, TimetablingError};

/// A clause is a disjunction of signed variable ids: positive for the
/// literal, negative for its negation.
pub type Clause = Vec<i64>;
pub type Clauses = Vec<Clause>;

/// A model returned by a solver: one signed literal per variable.
pub type Solution = Vec<i64>;

/// A SAT instance in conjunctive normal form.
#[derive(Debug, Clone)]
pub struct Sat {
    pub variables: usize,
    pub clauses: Clauses,
}

impl Sat {
    /// Serializes the instance into DIMACS CNF.
    pub fn to_dimacs(&self) -> String {
        // Rough guess: two digits plus sign and separator per literal.
        let literals: usize = self.clauses.iter().map(Vec::len).sum();
        let mut dimacs = String::with_capacity(32 + 4 * literals + 3 * self.clauses.len());

        dimacs.push_str(&format!("p cnf {} {}\n", self.variables, self.clauses.len()));
        for clause in &self.clauses {
            dimacs.push_str(&format!("{} 0\n", clause.iter().join(" ")));
        }
        dimacs
    }
}

/// Parses a solver model from its output text.
///
/// Accepts both the `v `-prefixed line format (kissat, cadical, slime,
/// ortoolsat, cryptominisat) and the bare-literals format that the
/// MiniSAT family writes to its output file. `SAT`/`UNSAT` markers and
/// `s`/`c` status lines are skipped; `0` terminators are dropped
/// wherever they appear.
pub fn parse_model(output: &str) -> Result<Solution> {
    let mut values = Solution::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line == "SAT" || line == "UNSAT" {
            continue;
        }

        let body = match line.strip_prefix('v') {
            Some(rest) => rest,
            None if line.starts_with('s') || line.starts_with('c') => continue,
            None => line,
        };

        for token in body.split_ascii_whitespace() {
            let value: i64 = token.parse().map_err(|_| {
                TimetablingError::SolverOutput(format!("invalid literal {:?} in solver output", token))
            })?;
            if value != 0 {
                values.push(value);
            }
        }
    }

    Ok(values)
}

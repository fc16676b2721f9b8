//! # timetabling-sat
//!
//! Encodes a university timetabling problem — lessons assigned to
//! (period, day, room) slots under professor, student, lesson and room
//! constraints — as a boolean satisfiability instance, delegates solving
//! to an external CDCL solver, and reconstructs a verified timetable
//! from the returned model.
//!
//! Three strategies are available:
//!
//! - **embedded-room** ("pure"): rooms are part of the SAT encoding, so
//!   a solution carries its room assignment;
//! - **isolated-room** ("postponed"): the room axis is collapsed during
//!   encoding and rooms are matched to the solved schedule afterwards
//!   with a maximum bipartite matching per (period, day);
//! - **hybrid**: isolated-room plus room-similarity seed clauses that
//!   keep entries with overlapping room sets out of the same slot.

pub mod constraints;
pub mod evaluator;
pub mod indexer;
pub mod input;
pub mod permutations;
pub mod sat;
pub mod timetabler;

/// Error types.
pub mod error {
    use thiserror::Error;

    /// Errors surfaced by encoding, solving and input processing.
    ///
    /// An unsatisfiable instance or a failed room matching is *not* an
    /// error; those are [`crate::timetabler::BuildOutcome`] values.
    #[derive(Error, Debug)]
    pub enum TimetablingError {
        /// The input file cannot be read.
        #[error("cannot read input: {0}")]
        Io(#[from] std::io::Error),

        /// The input file is not valid JSON of the expected shape.
        #[error("cannot parse input: {0}")]
        Json(#[from] serde_json::Error),

        /// The input is well-formed but semantically invalid.
        #[error("invalid input: {0}")]
        Input(String),

        /// A solver subprocess failed to run or reported an unexpected
        /// status.
        #[error("solver {name} failed: {message}")]
        Solver { name: String, message: String },

        /// A solver terminated correctly but its model is unreadable.
        #[error("unreadable solver output: {0}")]
        SolverOutput(String),

        /// The solver configuration cannot be loaded.
        #[error("configuration error: {0}")]
        Config(String),
    }

    /// Result type for timetabling operations.
    pub type Result<T> = std::result::Result<T, TimetablingError>;
}

pub use error::TimetablingError;
pub use evaluator::PredicateEvaluator;
pub use indexer::{Domains, VariableIndexer};
pub use input::ModelInput;
pub use permutations::{PartialTuple, PermutationGenerator, Tuple};
pub use sat::{Clause, Clauses, ExternalSolver, Sat, SatSolver, Solution, SolverConfig, SolverKind};
pub use timetabler::{
    verify, BuildOutcome, BuildReport, EmbeddedRoomTimetabler, IsolatedRoomTimetabler, Timetable,
    Timetabler,
};

#[cfg(test)]
pub(crate) mod test_fixtures;

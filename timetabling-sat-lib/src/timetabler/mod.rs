//! Strategy orchestrators: encode, solve, decode and verify.

mod room_assignment;
mod verify;

pub use verify::verify;

use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::time::Instant;

use crate::constraints::{
    completeness_clauses, lesson_clauses, negation_clauses, professor_availability_clauses,
    professor_clauses, room_clauses, room_negation_clauses, room_similarity_clauses,
    student_clauses, subject_permissibility_clauses, uniqueness_clauses, ConstraintFn,
    ConstraintState,
};
use crate::error::Result;
use crate::evaluator::PredicateEvaluator;
use crate::indexer::{Domains, VariableIndexer};
use crate::input::ModelInput;
use crate::permutations::{PermutationGenerator, Tuple};
use crate::sat::{Clauses, Sat, SatSolver, Solution};

/// A decoded schedule: one tuple per chosen SAT variable.
pub type Timetable = Vec<Tuple>;

/// Terminal states of a build.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// The instance is satisfiable and every lesson has a room.
    Scheduled(Timetable),
    /// The instance is satisfiable but some (period, day) bucket admits
    /// no perfect room matching. Isolated-room strategies only.
    Unassignable,
    Unsatisfiable,
}

/// Result of a build together with the instance dimensions.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub outcome: BuildOutcome,
    pub variables: usize,
    pub clauses: usize,
}

/// A timetable construction strategy.
pub trait Timetabler {
    fn build(&self, input: &ModelInput) -> Result<BuildReport>;

    /// Independent re-check of a produced timetable against every hard
    /// constraint and the curriculum.
    fn verify(&self, timetable: &[Tuple], input: &ModelInput) -> bool {
        verify(timetable, input)
    }
}

/// Runs all generators in parallel and merges their clause sets into one
/// instance, together with the set of explicitly mentioned positive
/// literals. Solvers may report variables no clause mentions as true;
/// only explicit ones are meaningful when decoding.
pub fn build_sat(
    variables: usize,
    constraints: &[ConstraintFn],
    state: &ConstraintState,
) -> (Sat, FxHashSet<i64>) {
    let clause_sets: Vec<Clauses> = constraints
        .par_iter()
        .map(|generate| generate(state))
        .collect();

    let mut explicit_variables = FxHashSet::default();
    let mut clauses = Clauses::with_capacity(clause_sets.iter().map(Vec::len).sum());
    for set in clause_sets {
        for clause in &set {
            for &literal in clause {
                if literal > 0 {
                    explicit_variables.insert(literal);
                }
            }
        }
        clauses.extend(set);
    }

    (Sat { variables, clauses }, explicit_variables)
}

/// Keeps positive literals that some clause explicitly mentions.
fn explicit_positives(solution: Solution, explicit_variables: &FxHashSet<i64>) -> Vec<i64> {
    solution
        .into_iter()
        .filter(|variable| *variable > 0 && explicit_variables.contains(variable))
        .collect()
}

/// Pure strategy: rooms are encoded into the SAT instance, so decoded
/// tuples carry their room directly.
pub struct EmbeddedRoomTimetabler<S> {
    solver: S,
}

impl<S: SatSolver> EmbeddedRoomTimetabler<S> {
    pub fn new(solver: S) -> Self {
        EmbeddedRoomTimetabler { solver }
    }
}

impl<S: SatSolver> Timetabler for EmbeddedRoomTimetabler<S> {
    fn build(&self, input: &ModelInput) -> Result<BuildReport> {
        let domains = Domains::of(input);
        let evaluator = PredicateEvaluator::standard(input, 0.0);
        let indexer = VariableIndexer::new(domains);
        let generator = PermutationGenerator::new(domains);

        let constraints: &[ConstraintFn] = &[
            professor_clauses,
            student_clauses,
            subject_permissibility_clauses,
            professor_availability_clauses,
            lesson_clauses,
            room_clauses,
            room_negation_clauses,
            completeness_clauses,
            negation_clauses,
            uniqueness_clauses,
        ];
        let state = ConstraintState {
            evaluator: &evaluator,
            indexer: &indexer,
            generator: &generator,
            domains,
        };

        let now = Instant::now();
        let (sat, explicit_variables) = build_sat(domains.variables(), constraints, &state);
        let clauses = sat.clauses.len();
        info!(
            "encoded {} variables and {} clauses in {} s",
            sat.variables,
            clauses,
            now.elapsed().as_secs_f32()
        );

        let now = Instant::now();
        let solution = self.solver.solve(&sat)?;
        debug!("solver finished in {} s", now.elapsed().as_secs_f32());

        let Some(solution) = solution else {
            return Ok(BuildReport {
                outcome: BuildOutcome::Unsatisfiable,
                variables: sat.variables,
                clauses,
            });
        };

        let timetable = explicit_positives(solution, &explicit_variables)
            .into_iter()
            .map(|variable| indexer.attributes(variable as usize))
            .collect();

        Ok(BuildReport {
            outcome: BuildOutcome::Scheduled(timetable),
            variables: sat.variables,
            clauses,
        })
    }
}

/// Postponed strategy: the room axis is collapsed to a single
/// pseudo-room during encoding, and real rooms are matched to the
/// solved schedule per (period, day) bucket afterwards. With `hybrid`
/// set, room-similarity seed clauses bias the SAT away from buckets the
/// matching cannot serve.
pub struct IsolatedRoomTimetabler<S> {
    solver: S,
    hybrid: bool,
    room_similarity_threshold: f32,
}

impl<S: SatSolver> IsolatedRoomTimetabler<S> {
    pub fn new(solver: S, hybrid: bool, room_similarity_threshold: f32) -> Self {
        IsolatedRoomTimetabler {
            solver,
            hybrid,
            room_similarity_threshold,
        }
    }
}

impl<S: SatSolver> Timetabler for IsolatedRoomTimetabler<S> {
    fn build(&self, input: &ModelInput) -> Result<BuildReport> {
        let domains = Domains::of(input).isolated_room();
        let isolated_evaluator =
            PredicateEvaluator::isolated_room(input, self.room_similarity_threshold);
        let standard_evaluator =
            PredicateEvaluator::standard(input, self.room_similarity_threshold);
        let indexer = VariableIndexer::new(domains);
        let generator = PermutationGenerator::new(domains);

        let mut constraints: Vec<ConstraintFn> = vec![
            professor_clauses,
            student_clauses,
            subject_permissibility_clauses,
            professor_availability_clauses,
            lesson_clauses,
            completeness_clauses,
            negation_clauses,
            uniqueness_clauses,
        ];
        if self.hybrid {
            constraints.push(room_similarity_clauses);
        }
        let state = ConstraintState {
            evaluator: &isolated_evaluator,
            indexer: &indexer,
            generator: &generator,
            domains,
        };

        let now = Instant::now();
        let (sat, explicit_variables) = build_sat(domains.variables(), &constraints, &state);
        let clauses = sat.clauses.len();
        info!(
            "encoded {} variables and {} clauses in {} s",
            sat.variables,
            clauses,
            now.elapsed().as_secs_f32()
        );

        let now = Instant::now();
        let solution = self.solver.solve(&sat)?;
        debug!("solver finished in {} s", now.elapsed().as_secs_f32());

        let Some(solution) = solution else {
            return Ok(BuildReport {
                outcome: BuildOutcome::Unsatisfiable,
                variables: sat.variables,
                clauses,
            });
        };

        let selected = explicit_positives(solution, &explicit_variables);
        let outcome =
            match room_assignment::assign_rooms(&selected, &indexer, &standard_evaluator, input) {
                Some(timetable) => BuildOutcome::Scheduled(timetable),
                None => BuildOutcome::Unassignable,
            };

        Ok(BuildReport {
            outcome,
            variables: sat.variables,
            clauses,
        })
    }
}

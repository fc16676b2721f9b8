//! Clause generators for the timetabling CNF encoding.
//!
//! Each generator is a pure function of a [`ConstraintState`] and returns
//! an independent clause set, which makes them trivially parallelizable.
//! Most generators enumerate the admissible tuples (those passing
//! teaches, allowed, professor-available, assigned and fits) and then
//! emit either unit clauses or pairwise exclusions. Pairwise exclusions
//! are joined through buckets keyed by the generator's equality
//! condition instead of scanning all tuple pairs, which collapses the
//! quadratic pass to intra-bucket pairs.

use indexmap::IndexMap;
use itertools::Itertools;
use rustc_hash::FxBuildHasher;
use std::hash::Hash;

use crate::evaluator::PredicateEvaluator;
use crate::indexer::{Domains, VariableIndexer};
use crate::permutations::{PartialTuple, PermutationGenerator, Predicate, Tuple};
use crate::sat::{Clause, Clauses};

/// Read-only state shared by all generators of one encoding run.
pub struct ConstraintState<'a> {
    pub evaluator: &'a PredicateEvaluator<'a>,
    pub indexer: &'a VariableIndexer,
    pub generator: &'a PermutationGenerator,
    pub domains: Domains,
}

/// A clause generator, as fanned out by the SAT builder.
pub type ConstraintFn = fn(&ConstraintState) -> Clauses;

fn teaches<'a>(evaluator: &'a PredicateEvaluator<'a>, expected: bool) -> Predicate<'a> {
    Box::new(move |t: &PartialTuple| {
        let (Some(lesson), Some(sp), Some(group)) = (t.lesson, t.subject_professor, t.group) else {
            return true;
        };
        evaluator.teaches(group, sp, lesson) == expected
    })
}

fn allowed<'a>(evaluator: &'a PredicateEvaluator<'a>, expected: bool) -> Predicate<'a> {
    Box::new(move |t: &PartialTuple| {
        let (Some(period), Some(day), Some(sp), Some(group)) =
            (t.period, t.day, t.subject_professor, t.group)
        else {
            return true;
        };
        evaluator.allowed(sp, group, day, period) == expected
    })
}

fn professor_available<'a>(evaluator: &'a PredicateEvaluator<'a>, expected: bool) -> Predicate<'a> {
    Box::new(move |t: &PartialTuple| {
        let (Some(period), Some(day), Some(sp)) = (t.period, t.day, t.subject_professor) else {
            return true;
        };
        evaluator.professor_available(sp, day, period) == expected
    })
}

fn assigned<'a>(evaluator: &'a PredicateEvaluator<'a>) -> Predicate<'a> {
    Box::new(move |t: &PartialTuple| {
        let (Some(sp), Some(group), Some(room)) = (t.subject_professor, t.group, t.room) else {
            return true;
        };
        evaluator.assigned(room, sp, group)
    })
}

fn fits<'a>(evaluator: &'a PredicateEvaluator<'a>) -> Predicate<'a> {
    Box::new(move |t: &PartialTuple| {
        let (Some(group), Some(room)) = (t.group, t.room) else {
            return true;
        };
        evaluator.fits(group, room)
    })
}

/// Room infeasibility: the room is not assigned to the entry, or the
/// group does not fit into it.
fn not_assigned_or_not_fits<'a>(evaluator: &'a PredicateEvaluator<'a>) -> Predicate<'a> {
    Box::new(move |t: &PartialTuple| {
        let (Some(sp), Some(group), Some(room)) = (t.subject_professor, t.group, t.room) else {
            return true;
        };
        !evaluator.assigned(room, sp, group) || !evaluator.fits(group, room)
    })
}

/// The admissibility bundle shared by most generators.
fn admissible<'a>(evaluator: &'a PredicateEvaluator<'a>) -> Vec<Predicate<'a>> {
    vec![
        teaches(evaluator, true),
        allowed(evaluator, true),
        professor_available(evaluator, true),
        assigned(evaluator),
        fits(evaluator),
    ]
}

/// Emits `(!x \/ !y)` for every conflicting pair of tuples.
///
/// Tuples are grouped by `key` first; only pairs within the same bucket
/// can conflict, and `conflict` decides each of them. Buckets are
/// iterated in first-seen order so the output is deterministic.
fn pairwise_exclusions<K, KeyFn, ConflictFn>(
    indexer: &VariableIndexer,
    permutations: &[Tuple],
    key: KeyFn,
    conflict: ConflictFn,
) -> Clauses
where
    K: Eq + Hash,
    KeyFn: Fn(&Tuple) -> K,
    ConflictFn: Fn(&Tuple, &Tuple) -> bool,
{
    let mut buckets: IndexMap<K, Vec<&Tuple>, FxBuildHasher> = IndexMap::default();
    for tuple in permutations {
        buckets.entry(key(tuple)).or_default().push(tuple);
    }

    let mut clauses = Clauses::new();
    for bucket in buckets.values() {
        for (first, second) in bucket.iter().tuple_combinations() {
            if conflict(first, second) {
                clauses.push(vec![-indexer.literal(first), -indexer.literal(second)]);
            }
        }
    }
    clauses
}

/// One unit clause `(!x)` per enumerated tuple.
fn negative_units(state: &ConstraintState, predicates: &[Predicate]) -> Clauses {
    state
        .generator
        .constrained_permutations(predicates)
        .iter()
        .map(|tuple| vec![-state.indexer.literal(tuple)])
        .collect()
}

/// No professor teaches two lessons in the same (period, day).
pub fn professor_clauses(state: &ConstraintState) -> Clauses {
    let permutations = state
        .generator
        .constrained_permutations(&admissible(state.evaluator));

    pairwise_exclusions(
        state.indexer,
        &permutations,
        |t| (t.period, t.day),
        |a, b| {
            state
                .evaluator
                .same_professor(a.subject_professor, b.subject_professor)
        },
    )
}

/// Groups sharing a class cannot be scheduled in the same (period, day)
/// unless a single subject-professor drives both.
pub fn student_clauses(state: &ConstraintState) -> Clauses {
    let permutations = state
        .generator
        .constrained_permutations(&admissible(state.evaluator));

    pairwise_exclusions(
        state.indexer,
        &permutations,
        |t| (t.period, t.day),
        |a, b| {
            !state.evaluator.disjoint(a.group, b.group)
                && !state
                    .evaluator
                    .same_professor(a.subject_professor, b.subject_professor)
        },
    )
}

/// Hard-forbids tuples whose slot is outside the entry's permissibility
/// grid.
pub fn subject_permissibility_clauses(state: &ConstraintState) -> Clauses {
    let predicates = vec![
        teaches(state.evaluator, true),
        allowed(state.evaluator, false),
        professor_available(state.evaluator, true),
        assigned(state.evaluator),
        fits(state.evaluator),
    ];
    negative_units(state, &predicates)
}

/// Hard-forbids tuples where the professor is unavailable.
pub fn professor_availability_clauses(state: &ConstraintState) -> Clauses {
    let predicates = vec![
        teaches(state.evaluator, true),
        allowed(state.evaluator, true),
        professor_available(state.evaluator, false),
        assigned(state.evaluator),
        fits(state.evaluator),
    ];
    negative_units(state, &predicates)
}

/// Distinct lesson slots of one (group, subject-professor) never share a
/// day.
pub fn lesson_clauses(state: &ConstraintState) -> Clauses {
    let permutations = state
        .generator
        .constrained_permutations(&admissible(state.evaluator));

    pairwise_exclusions(
        state.indexer,
        &permutations,
        |t| (t.group, t.subject_professor, t.day),
        |a, b| a.lesson != b.lesson,
    )
}

/// Two different groups cannot occupy the same (period, day, room)
/// unless co-taught by the same professor.
pub fn room_clauses(state: &ConstraintState) -> Clauses {
    let permutations = state
        .generator
        .constrained_permutations(&admissible(state.evaluator));

    pairwise_exclusions(
        state.indexer,
        &permutations,
        |t| (t.period, t.day, t.room),
        |a, b| {
            a.group != b.group
                && !state
                    .evaluator
                    .same_professor(a.subject_professor, b.subject_professor)
        },
    )
}

/// Hard-forbids tuples whose room is not assigned to the entry or does
/// not fit the group.
pub fn room_negation_clauses(state: &ConstraintState) -> Clauses {
    let predicates = vec![
        teaches(state.evaluator, true),
        allowed(state.evaluator, true),
        professor_available(state.evaluator, true),
        not_assigned_or_not_fits(state.evaluator),
    ];
    negative_units(state, &predicates)
}

/// At least one feasible (period, day, room) is chosen for every
/// admissible (lesson, subject-professor, group) triplet.
///
/// A triplet whose feasible set is empty contributes the empty clause,
/// making the instance trivially unsatisfiable.
pub fn completeness_clauses(state: &ConstraintState) -> Clauses {
    let evaluator = state.evaluator;
    let d = &state.domains;

    let mut clauses = Clauses::new();
    for lesson in 0..d.lessons {
        for subject_professor in 0..d.subject_professors {
            for group in 0..d.groups {
                if !evaluator.teaches(group, subject_professor, lesson) {
                    continue;
                }

                let mut clause = Clause::new();
                for period in 0..d.periods {
                    for day in 0..d.days {
                        for room in 0..d.rooms {
                            if evaluator.allowed(subject_professor, group, day, period)
                                && evaluator.professor_available(subject_professor, day, period)
                                && evaluator.assigned(room, subject_professor, group)
                                && evaluator.fits(group, room)
                            {
                                clause.push(state.indexer.literal(&Tuple {
                                    period,
                                    day,
                                    lesson,
                                    subject_professor,
                                    group,
                                    room,
                                }));
                            }
                        }
                    }
                }
                clauses.push(clause);
            }
        }
    }
    clauses
}

/// Hard-forbids every otherwise-feasible tuple the curriculum does not
/// ask for.
pub fn negation_clauses(state: &ConstraintState) -> Clauses {
    let predicates = vec![
        teaches(state.evaluator, false),
        allowed(state.evaluator, true),
        professor_available(state.evaluator, true),
        assigned(state.evaluator),
        fits(state.evaluator),
    ];
    negative_units(state, &predicates)
}

/// At most one (period, day, room) is chosen for every (group,
/// subject-professor, lesson). Together with completeness this yields
/// exactly-one semantics.
pub fn uniqueness_clauses(state: &ConstraintState) -> Clauses {
    let permutations = state
        .generator
        .constrained_permutations(&admissible(state.evaluator));

    pairwise_exclusions(
        state.indexer,
        &permutations,
        |t| (t.group, t.subject_professor, t.lesson),
        |_, _| true,
    )
}

/// Hybrid-only seed: entries competing for similar room sets are kept
/// out of the same (period, day), steering the isolated-room SAT away
/// from buckets the matching step cannot serve.
pub fn room_similarity_clauses(state: &ConstraintState) -> Clauses {
    let permutations = state
        .generator
        .constrained_permutations(&admissible(state.evaluator));

    pairwise_exclusions(
        state.indexer,
        &permutations,
        |t| (t.period, t.day),
        |a, b| {
            a.group != b.group
                && !state
                    .evaluator
                    .same_professor(a.subject_professor, b.subject_professor)
                && state.evaluator.room_similar(
                    a.subject_professor,
                    b.subject_professor,
                    a.group,
                    b.group,
                )
        },
    )
}

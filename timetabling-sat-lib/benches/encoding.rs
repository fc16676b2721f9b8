use criterion::{black_box, criterion_group, criterion_main, Criterion};

use timetabling_sat_lib::constraints::{
    completeness_clauses, lesson_clauses, negation_clauses, professor_availability_clauses,
    professor_clauses, room_clauses, room_negation_clauses, student_clauses,
    subject_permissibility_clauses, uniqueness_clauses, ConstraintFn, ConstraintState,
};
use timetabling_sat_lib::input::{Class, ModelInput, Professor, RawEntry, RawModelInput, Room, Subject};
use timetabling_sat_lib::timetabler::build_sat;
use timetabling_sat_lib::{Domains, PermutationGenerator, PredicateEvaluator, VariableIndexer};

const PERIODS: usize = 4;
const DAYS: usize = 5;

fn grid(value: bool) -> Vec<Vec<bool>> {
    vec![vec![value; DAYS]; PERIODS]
}

/// A small faculty: six subjects spread over three professors, six
/// classes grouped in pairs, three rooms of mixed capacity.
fn synthetic_input() -> ModelInput {
    let subjects = (0..6)
        .map(|id| Subject {
            id,
            name: format!("subject{}", id),
        })
        .collect();
    let professors = (0..3)
        .map(|id| Professor {
            id,
            name: format!("professor{}", id),
            availability: grid(true),
        })
        .collect();
    let classes = (0..6)
        .map(|id| Class {
            id,
            name: format!("class{}", id),
            size: 20 + id,
        })
        .collect();
    let rooms = vec![
        Room {
            id: 0,
            name: "small".to_string(),
            capacity: 45,
        },
        Room {
            id: 1,
            name: "medium".to_string(),
            capacity: 60,
        },
        Room {
            id: 2,
            name: "large".to_string(),
            capacity: 120,
        },
    ];

    let entries = (0..6)
        .map(|subject| RawEntry {
            subject,
            professor: subject % 3,
            classes: vec![(2 * subject) % 6, (2 * subject + 1) % 6],
            lessons: 1 + subject % 2,
            permissibility: grid(true),
            rooms: vec![1, 2],
        })
        .collect();

    let raw = RawModelInput {
        subjects,
        professors,
        classes,
        rooms,
        entries,
    };
    ModelInput::from_raw(raw).expect("synthetic input is valid")
}

fn bench_embedded_room_encoding(c: &mut Criterion) {
    let input = synthetic_input();
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

    c.bench_function("embedded_room_encoding", |b| {
        b.iter(|| {
            let domains = Domains::of(&input);
            let evaluator = PredicateEvaluator::standard(&input, 0.0);
            let indexer = VariableIndexer::new(domains);
            let generator = PermutationGenerator::new(domains);
            let state = ConstraintState {
                evaluator: &evaluator,
                indexer: &indexer,
                generator: &generator,
                domains,
            };

            let (sat, explicit_variables) =
                build_sat(domains.variables(), black_box(constraints), &state);
            black_box((sat.clauses.len(), explicit_variables.len()))
        })
    });
}

criterion_group!(benches, bench_embedded_room_encoding);
criterion_main!(benches);

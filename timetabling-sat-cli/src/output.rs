use serde::Serialize;
use std::collections::BTreeMap;

use timetabling_sat_lib::{ModelInput, Tuple};

/// One scheduled lesson as seen by a single class.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledLesson {
    pub period: usize,
    pub day: usize,
    pub subject: usize,
    pub professor: usize,
    pub room: usize,
}

/// Expands each scheduled group into its member classes, producing the
/// per-class timetable keyed by class id. `BTreeMap` keeps the output
/// stable across runs.
pub fn per_class_timetable(
    timetable: &[Tuple],
    input: &ModelInput,
) -> BTreeMap<usize, Vec<ScheduledLesson>> {
    let mut per_class: BTreeMap<usize, Vec<ScheduledLesson>> = BTreeMap::new();

    for tuple in timetable {
        let subject_professor = &input.subject_professors[tuple.subject_professor];
        let lesson = ScheduledLesson {
            period: tuple.period,
            day: tuple.day,
            subject: input.subjects[subject_professor.subject].id,
            professor: input.professors[subject_professor.professor].id,
            room: input.rooms[tuple.room].id,
        };

        for &class in &input.groups[tuple.group].classes {
            per_class.entry(class).or_default().push(lesson.clone());
        }
    }

    per_class
}

//! Builders for the small problem instances used across the test
//! modules.

use crate::input::{Class, ModelInput, Professor, RawEntry, RawModelInput, Room, Subject};

/// A (periods x days) grid filled with one value.
pub(crate) fn grid(periods: usize, days: usize, value: bool) -> Vec<Vec<bool>> {
    vec![vec![value; days]; periods]
}

pub(crate) fn raw_entry(
    subject: usize,
    professor: usize,
    classes: &[usize],
    lessons: usize,
    permissibility: Vec<Vec<bool>>,
    rooms: &[usize],
) -> RawEntry {
    RawEntry {
        subject,
        professor,
        classes: classes.to_vec(),
        lessons,
        permissibility,
        rooms: rooms.to_vec(),
    }
}

/// Builds a raw input from parallel (subject, professor) name pairs,
/// class sizes and room capacities. Every professor is available at
/// every slot; entries can override nothing but their own grids.
pub(crate) fn raw_input(
    periods: usize,
    days: usize,
    subject_professors: &[(&str, &str)],
    class_sizes: &[usize],
    room_capacities: &[usize],
    entries: Vec<RawEntry>,
) -> RawModelInput {
    RawModelInput {
        subjects: subject_professors
            .iter()
            .enumerate()
            .map(|(id, (subject, _))| Subject {
                id,
                name: subject.to_string(),
            })
            .collect(),
        professors: subject_professors
            .iter()
            .enumerate()
            .map(|(id, (_, professor))| Professor {
                id,
                name: professor.to_string(),
                availability: grid(periods, days, true),
            })
            .collect(),
        classes: class_sizes
            .iter()
            .enumerate()
            .map(|(id, &size)| Class {
                id,
                name: format!("c{}", id),
                size,
            })
            .collect(),
        rooms: room_capacities
            .iter()
            .enumerate()
            .map(|(id, &capacity)| Room {
                id,
                name: format!("r{}", id),
                capacity,
            })
            .collect(),
        entries,
    }
}

/// One subject, one professor, one class, one room, one weekly lesson
/// over (`periods` x 1 day). Satisfiable with any period choice.
pub(crate) fn trivial_input(periods: usize) -> ModelInput {
    let raw = raw_input(
        periods,
        1,
        &[("algebra", "turing")],
        &[20],
        &[30],
        vec![raw_entry(0, 0, &[0], 1, grid(periods, 1, true), &[0])],
    );
    ModelInput::from_raw(raw).expect("trivial fixture is valid")
}

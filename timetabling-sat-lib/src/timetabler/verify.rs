//! Independent verification of a produced timetable.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::evaluator::PredicateEvaluator;
use crate::indexer::Domains;
use crate::input::ModelInput;
use crate::permutations::Tuple;

/// Re-checks every hard constraint against the input:
///
/// - the slot is permitted by the entry and the professor is available;
/// - no professor, room, or pair of class-sharing groups is booked twice
///   in one (period, day);
/// - a (group, subject-professor) pair is taught at most once a day;
/// - the room belongs to the entry and fits the group;
/// - every entry receives exactly its weekly lesson count.
pub fn verify(timetable: &[Tuple], input: &ModelInput) -> bool {
    let evaluator = PredicateEvaluator::standard(input, 0.0);
    let domains = Domains::of(input);

    let mut professor_assistance =
        vec![vec![vec![false; domains.days]; domains.periods]; input.professors.len()];
    let mut group_assistance =
        vec![vec![vec![false; domains.days]; domains.periods]; domains.groups];
    let mut room_assistance =
        vec![vec![vec![false; domains.days]; domains.periods]; domains.rooms];
    let mut derived_lessons: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    let mut lesson_taught: FxHashSet<(usize, usize, usize)> = FxHashSet::default();

    for tuple in timetable {
        let professor = input.subject_professors[tuple.subject_professor].professor;
        let entry_key = (tuple.subject_professor, tuple.group);

        if !evaluator.allowed(tuple.subject_professor, tuple.group, tuple.day, tuple.period)
            || !evaluator.professor_available(tuple.subject_professor, tuple.day, tuple.period)
            || professor_assistance[professor][tuple.period][tuple.day]
            || collides(&input.groups_graph, &group_assistance, tuple)
            || lesson_taught.contains(&(tuple.group, tuple.subject_professor, tuple.day))
            || !evaluator.assigned(tuple.room, tuple.subject_professor, tuple.group)
            || !evaluator.fits(tuple.group, tuple.room)
            || room_assistance[tuple.room][tuple.period][tuple.day]
        {
            return false;
        }

        professor_assistance[professor][tuple.period][tuple.day] = true;
        group_assistance[tuple.group][tuple.period][tuple.day] = true;
        room_assistance[tuple.room][tuple.period][tuple.day] = true;
        *derived_lessons.entry(entry_key).or_insert(0) += 1;
        lesson_taught.insert((tuple.group, tuple.subject_professor, tuple.day));
    }

    input.entries.iter().all(|(key, entry)| {
        derived_lessons.get(key).copied().unwrap_or(0) == entry.lessons
    })
}

/// Whether a group sharing a class with `tuple.group` already sits in
/// this (period, day). The groups-graph diagonal makes a group collide
/// with itself.
fn collides(groups_graph: &[Vec<bool>], group_assistance: &[Vec<Vec<bool>>], tuple: &Tuple) -> bool {
    groups_graph[tuple.group]
        .iter()
        .enumerate()
        .any(|(neighbor, &shares_class)| {
            shares_class && group_assistance[neighbor][tuple.period][tuple.day]
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ModelInput;
    use crate::test_fixtures::{grid, raw_entry, raw_input, trivial_input};

    fn scheduled(period: usize, day: usize, sp: usize, group: usize, room: usize) -> Tuple {
        Tuple {
            period,
            day,
            lesson: 0,
            subject_professor: sp,
            group,
            room,
        }
    }

    #[test]
    fn test_accepts_a_correct_timetable() {
        let input = trivial_input(2);
        assert!(verify(&[scheduled(0, 0, 0, 0, 0)], &input));
        assert!(verify(&[scheduled(1, 0, 0, 0, 0)], &input));
    }

    #[test]
    fn test_rejects_missing_and_surplus_lessons() {
        let input = trivial_input(2);

        // Dropped lesson: the entry expects one.
        assert!(!verify(&[], &input));
        // Surplus: the same lesson twice on one day.
        assert!(!verify(
            &[scheduled(0, 0, 0, 0, 0), scheduled(1, 0, 0, 0, 0)],
            &input
        ));
    }

    #[test]
    fn test_rejects_blocked_slots_and_wrong_rooms() {
        let mut permissibility = grid(2, 1, true);
        permissibility[1][0] = false;
        let raw = raw_input(
            2,
            1,
            &[("algebra", "turing")],
            &[20],
            &[30, 40],
            vec![raw_entry(0, 0, &[0], 1, permissibility, &[0])],
        );
        let input = ModelInput::from_raw(raw).unwrap();

        assert!(verify(&[scheduled(0, 0, 0, 0, 0)], &input));
        // Blocked period.
        assert!(!verify(&[scheduled(1, 0, 0, 0, 0)], &input));
        // Room 1 exists but is not assigned to the entry.
        assert!(!verify(&[scheduled(0, 0, 0, 0, 1)], &input));
    }

    #[test]
    fn test_rejects_professor_double_booking() {
        let raw = raw_input(
            2,
            1,
            &[("algebra", "turing"), ("logic", "turing")],
            &[20, 25],
            &[30, 30],
            vec![
                raw_entry(0, 0, &[0], 1, grid(2, 1, true), &[0]),
                raw_entry(1, 0, &[1], 1, grid(2, 1, true), &[1]),
            ],
        );
        let input = ModelInput::from_raw(raw).unwrap();

        assert!(verify(
            &[scheduled(0, 0, 0, 0, 0), scheduled(1, 0, 1, 1, 1)],
            &input
        ));
        assert!(!verify(
            &[scheduled(0, 0, 0, 0, 0), scheduled(0, 0, 1, 1, 1)],
            &input
        ));
    }

    #[test]
    fn test_rejects_group_graph_collision() {
        // Groups {A, B} and {B, C} share class B.
        let raw = raw_input(
            2,
            1,
            &[("algebra", "turing"), ("logic", "church")],
            &[20, 20, 20],
            &[60, 60],
            vec![
                raw_entry(0, 0, &[0, 1], 1, grid(2, 1, true), &[0]),
                raw_entry(1, 1, &[1, 2], 1, grid(2, 1, true), &[1]),
            ],
        );
        let input = ModelInput::from_raw(raw).unwrap();

        assert!(verify(
            &[scheduled(0, 0, 0, 0, 0), scheduled(1, 0, 1, 1, 1)],
            &input
        ));
        assert!(!verify(
            &[scheduled(0, 0, 0, 0, 0), scheduled(0, 0, 1, 1, 1)],
            &input
        ));
    }

    #[test]
    fn test_rejects_room_double_booking() {
        let raw = raw_input(
            2,
            1,
            &[("algebra", "turing"), ("logic", "church")],
            &[20, 25],
            &[30],
            vec![
                raw_entry(0, 0, &[0], 1, grid(2, 1, true), &[0]),
                raw_entry(1, 1, &[1], 1, grid(2, 1, true), &[0]),
            ],
        );
        let input = ModelInput::from_raw(raw).unwrap();

        assert!(verify(
            &[scheduled(0, 0, 0, 0, 0), scheduled(1, 0, 1, 1, 0)],
            &input
        ));
        assert!(!verify(
            &[scheduled(0, 0, 0, 0, 0), scheduled(0, 0, 1, 1, 0)],
            &input
        ));
    }

    #[test]
    fn test_rejects_mutated_valid_timetable() {
        let raw = raw_input(
            2,
            2,
            &[("algebra", "turing")],
            &[20],
            &[30],
            vec![raw_entry(0, 0, &[0], 2, grid(2, 2, true), &[0])],
        );
        let input = ModelInput::from_raw(raw).unwrap();

        let valid = vec![
            Tuple {
                period: 0,
                day: 0,
                lesson: 0,
                subject_professor: 0,
                group: 0,
                room: 0,
            },
            Tuple {
                period: 0,
                day: 1,
                lesson: 1,
                subject_professor: 0,
                group: 0,
                room: 0,
            },
        ];
        assert!(verify(&valid, &input));

        // Swapping the second lesson onto the first day repeats the
        // (group, subject-professor, day) pair.
        let mut mutated = valid.clone();
        mutated[1].day = 0;
        mutated[1].period = 1;
        assert!(!verify(&mutated, &input));

        let mut mutated = valid;
        mutated.pop();
        assert!(!verify(&mutated, &input));
    }
}

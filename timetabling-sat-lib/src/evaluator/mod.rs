use rustc_hash::FxHashSet;

use crate::input::ModelInput;

/// Which room model the evaluator answers for.
///
/// `IsolatedRoom` collapses the room axis: `assigned` and `fits` hold
/// unconditionally for the single pseudo-room, so room feasibility never
/// prunes the SAT. Every other predicate is answered from the real data
/// in both flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Standard,
    IsolatedRoom,
}

/// Oracle over the problem instance consulted by the constraint
/// generators and the verifier.
pub struct PredicateEvaluator<'a> {
    input: &'a ModelInput,
    /// `allocations[group][subject_professor][lesson]`: the first
    /// `entry.lessons` lesson slots of an existing entry are true.
    allocations: Vec<Vec<Vec<bool>>>,
    room_similarity_threshold: f32,
    flavor: Flavor,
}

impl<'a> PredicateEvaluator<'a> {
    /// Evaluator over the true room model.
    pub fn standard(input: &'a ModelInput, room_similarity_threshold: f32) -> Self {
        Self::new(input, room_similarity_threshold, Flavor::Standard)
    }

    /// Evaluator that ignores rooms during SAT encoding.
    pub fn isolated_room(input: &'a ModelInput, room_similarity_threshold: f32) -> Self {
        Self::new(input, room_similarity_threshold, Flavor::IsolatedRoom)
    }

    fn new(input: &'a ModelInput, room_similarity_threshold: f32, flavor: Flavor) -> Self {
        let max_lessons = input
            .entries
            .values()
            .map(|entry| entry.lessons)
            .max()
            .unwrap_or(0);

        let mut allocations =
            vec![vec![vec![false; max_lessons]; input.subject_professors.len()]; input.groups.len()];
        for (group, row) in allocations.iter_mut().enumerate() {
            for (subject_professor, slots) in row.iter_mut().enumerate() {
                if !input.curriculum[group][subject_professor] {
                    continue;
                }
                let lessons = input.entries[&(subject_professor, group)].lessons;
                for slot in slots.iter_mut().take(lessons) {
                    *slot = true;
                }
            }
        }

        PredicateEvaluator {
            input,
            allocations,
            room_similarity_threshold,
            flavor,
        }
    }

    /// Whether the two subject-professors share the same professor.
    pub fn same_professor(&self, subject_professor1: usize, subject_professor2: usize) -> bool {
        self.input.subject_professors[subject_professor1].professor
            == self.input.subject_professors[subject_professor2].professor
    }

    /// Whether the professor behind `subject_professor` is available at
    /// (`period`, `day`).
    pub fn professor_available(&self, subject_professor: usize, day: usize, period: usize) -> bool {
        let professor = self.input.subject_professors[subject_professor].professor;
        self.input.professors[professor].availability[period][day]
    }

    /// Whether `subject_professor` teaches lesson slot `lesson` to
    /// `group` at all (i.e. the slot is within the entry's weekly count).
    pub fn teaches(&self, group: usize, subject_professor: usize, lesson: usize) -> bool {
        self.allocations[group][subject_professor][lesson]
    }

    /// Whether the two groups share no class.
    pub fn disjoint(&self, group1: usize, group2: usize) -> bool {
        !self.input.groups_graph[group1][group2]
    }

    /// Whether the entry permits teaching at (`period`, `day`). False
    /// when no entry exists for the pair.
    pub fn allowed(&self, subject_professor: usize, group: usize, day: usize, period: usize) -> bool {
        match self.input.entries.get(&(subject_professor, group)) {
            Some(entry) => entry.permissibility[period][day],
            None => false,
        }
    }

    /// Whether `room` is in the entry's eligible-room list.
    pub fn assigned(&self, room: usize, subject_professor: usize, group: usize) -> bool {
        match self.flavor {
            Flavor::IsolatedRoom => true,
            Flavor::Standard => self
                .input
                .entries
                .get(&(subject_professor, group))
                .is_some_and(|entry| entry.rooms.contains(&room)),
        }
    }

    /// Whether the group fits into the room.
    pub fn fits(&self, group: usize, room: usize) -> bool {
        match self.flavor {
            Flavor::IsolatedRoom => true,
            Flavor::Standard => self.group_fits(group, room),
        }
    }

    /// The real capacity check, regardless of flavor. Used internally by
    /// `room_similar` and by the post-solve room assignment.
    fn group_fits(&self, group: usize, room: usize) -> bool {
        let group_size: usize = self.input.groups[group]
            .classes
            .iter()
            .map(|&class| self.input.classes[class].size)
            .sum();
        self.input.rooms[room].capacity >= group_size
    }

    /// Jaccard similarity of the fitting-room sets of the two entries,
    /// compared against the configured threshold.
    ///
    /// Input validation guarantees every entry has at least one fitting
    /// room, so the union is never empty here.
    pub fn room_similar(
        &self,
        subject_professor1: usize,
        subject_professor2: usize,
        group1: usize,
        group2: usize,
    ) -> bool {
        let rooms1 = self.fitting_rooms(subject_professor1, group1);
        let rooms2 = self.fitting_rooms(subject_professor2, group2);
        debug_assert!(!rooms1.is_empty() && !rooms2.is_empty());

        let union: FxHashSet<usize> = rooms1.iter().chain(rooms2.iter()).copied().collect();
        let intersection = rooms1.iter().filter(|room| rooms2.contains(room)).count();

        let jaccard = intersection as f32 / union.len() as f32;
        jaccard >= self.room_similarity_threshold
    }

    fn fitting_rooms(&self, subject_professor: usize, group: usize) -> Vec<usize> {
        let entry = self
            .input
            .entries
            .get(&(subject_professor, group))
            .expect("room similarity is only asked for existing entries");
        entry
            .rooms
            .iter()
            .copied()
            .filter(|&room| self.group_fits(group, room))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ModelInput, RawModelInput};
    use crate::test_fixtures::{grid, raw_entry, raw_input};

    fn two_subject_input() -> ModelInput {
        let raw = raw_input(
            2,
            2,
            &[("algebra", "turing"), ("logic", "church")],
            &[20, 25],
            &[30, 22],
            vec![
                raw_entry(0, 0, &[0], 2, grid(2, 2, true), &[0, 1]),
                raw_entry(1, 1, &[1], 1, grid(2, 2, true), &[0]),
            ],
        );
        ModelInput::from_raw(raw).unwrap()
    }

    #[test]
    fn test_teaches_covers_the_first_lesson_slots() {
        let input = two_subject_input();
        let evaluator = PredicateEvaluator::standard(&input, 0.0);

        assert!(evaluator.teaches(0, 0, 0));
        assert!(evaluator.teaches(0, 0, 1));
        assert!(evaluator.teaches(1, 1, 0));
        assert!(!evaluator.teaches(1, 1, 1));
        // No entry for the cross pairs.
        assert!(!evaluator.teaches(0, 1, 0));
        assert!(!evaluator.teaches(1, 0, 0));
    }

    #[test]
    fn test_allowed_follows_the_permissibility_grid() {
        let mut permissibility = grid(2, 2, true);
        permissibility[1][0] = false;
        let raw = raw_input(
            2,
            2,
            &[("algebra", "turing")],
            &[20],
            &[30],
            vec![raw_entry(0, 0, &[0], 1, permissibility, &[0])],
        );
        let input = ModelInput::from_raw(raw).unwrap();
        let evaluator = PredicateEvaluator::standard(&input, 0.0);

        assert!(evaluator.allowed(0, 0, 0, 0));
        assert!(!evaluator.allowed(0, 0, 0, 1));
        assert!(evaluator.allowed(0, 0, 1, 1));
    }

    #[test]
    fn test_professor_availability() {
        let mut availability = grid(2, 2, true);
        availability[0][1] = false;
        let raw = RawModelInput {
            professors: vec![crate::input::Professor {
                id: 0,
                name: "turing".to_string(),
                availability,
            }],
            ..raw_input(
                2,
                2,
                &[("algebra", "turing")],
                &[20],
                &[30],
                vec![raw_entry(0, 0, &[0], 1, grid(2, 2, true), &[0])],
            )
        };
        let input = ModelInput::from_raw(raw).unwrap();
        let evaluator = PredicateEvaluator::standard(&input, 0.0);

        assert!(evaluator.professor_available(0, 0, 0));
        assert!(!evaluator.professor_available(0, 1, 0));
    }

    #[test]
    fn test_fits_and_assigned() {
        let input = two_subject_input();
        let evaluator = PredicateEvaluator::standard(&input, 0.0);

        // Group 1 (25 students) only fits into room 0 (capacity 30).
        assert!(evaluator.fits(1, 0));
        assert!(!evaluator.fits(1, 1));
        assert!(evaluator.assigned(0, 0, 0));
        assert!(evaluator.assigned(1, 0, 0));
        assert!(!evaluator.assigned(1, 1, 1));
    }

    #[test]
    fn test_isolated_room_stubs_room_predicates_only() {
        let input = two_subject_input();
        let evaluator = PredicateEvaluator::isolated_room(&input, 0.0);

        assert!(evaluator.fits(1, 1));
        assert!(evaluator.assigned(7, 0, 0));
        // Non-room predicates still answer from the data.
        assert!(evaluator.teaches(0, 0, 0));
        assert!(!evaluator.teaches(0, 1, 0));
    }

    #[test]
    fn test_room_similarity_uses_fitting_rooms_and_threshold() {
        let input = two_subject_input();

        // Entry (0, 0) fits rooms {0, 1}; entry (1, 1) fits {0}.
        // Jaccard = |{0}| / |{0, 1}| = 0.5.
        let evaluator = PredicateEvaluator::standard(&input, 0.5);
        assert!(evaluator.room_similar(0, 1, 0, 1));

        let evaluator = PredicateEvaluator::standard(&input, 0.6);
        assert!(!evaluator.room_similar(0, 1, 0, 1));
    }

    #[test]
    fn test_room_similarity_is_symmetric() {
        let input = two_subject_input();
        let evaluator = PredicateEvaluator::standard(&input, 0.5);

        assert_eq!(
            evaluator.room_similar(0, 1, 0, 1),
            evaluator.room_similar(1, 0, 1, 0)
        );
    }

    #[test]
    fn test_disjoint_follows_the_groups_graph() {
        let raw = raw_input(
            1,
            1,
            &[("algebra", "turing"), ("logic", "church")],
            &[20, 25, 18],
            &[100],
            vec![
                raw_entry(0, 0, &[0, 1], 1, grid(1, 1, true), &[0]),
                raw_entry(1, 1, &[2], 1, grid(1, 1, true), &[0]),
            ],
        );
        let input = ModelInput::from_raw(raw).unwrap();
        let evaluator = PredicateEvaluator::standard(&input, 0.0);

        assert!(evaluator.disjoint(0, 1));
        assert!(evaluator.disjoint(1, 0));
        // A group is never disjoint with itself.
        assert!(!evaluator.disjoint(0, 0));
    }
}

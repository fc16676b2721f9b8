use crate::indexer::Domains;

/// A fully-assigned scheduling tuple.
///
/// One tuple corresponds to one SAT variable: "`subject_professor`
/// teaches lesson number `lesson` to `group` at (`period`, `day`) in
/// `room`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tuple {
    pub period: usize,
    pub day: usize,
    pub lesson: usize,
    pub subject_professor: usize,
    pub group: usize,
    pub room: usize,
}

/// A partially-assigned tuple as seen by predicates during the
/// depth-first descent of [`PermutationGenerator`].
///
/// Unassigned positions are `None`. A predicate whose inputs include an
/// unassigned position must short-circuit to `true`; with `Option` slots
/// that check cannot be forgotten without failing to compile.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialTuple {
    pub period: Option<usize>,
    pub day: Option<usize>,
    pub lesson: Option<usize>,
    pub subject_professor: Option<usize>,
    pub group: Option<usize>,
    pub room: Option<usize>,
}

impl PartialTuple {
    fn set(&mut self, depth: usize, value: Option<usize>) {
        match depth {
            0 => self.period = value,
            1 => self.day = value,
            2 => self.lesson = value,
            3 => self.subject_professor = value,
            4 => self.group = value,
            5 => self.room = value,
            _ => unreachable!("tuple has six positions"),
        }
    }

    fn complete(&self) -> Tuple {
        Tuple {
            period: self.period.expect("period assigned"),
            day: self.day.expect("day assigned"),
            lesson: self.lesson.expect("lesson assigned"),
            subject_professor: self.subject_professor.expect("subject-professor assigned"),
            group: self.group.expect("group assigned"),
            room: self.room.expect("room assigned"),
        }
    }
}

/// A pruning predicate over partial tuples.
pub type Predicate<'a> = Box<dyn Fn(&PartialTuple) -> bool + Send + Sync + 'a>;

/// Enumerates all tuples of the attribute domains that satisfy a list of
/// predicates.
///
/// Assignment proceeds depth-first in the order period, day, lesson,
/// subject-professor, group, room. After each assignment every predicate
/// is consulted in its supplied order; the first one returning `false`
/// prunes the whole subtree. Pruning is therefore only correct for
/// monotone predicates: a rejected partial tuple must have no accepted
/// extension.
pub struct PermutationGenerator {
    domains: Domains,
}

impl PermutationGenerator {
    pub fn new(domains: Domains) -> Self {
        PermutationGenerator { domains }
    }

    /// Returns every complete tuple accepted by all `predicates`, in
    /// lexicographic order of the assignment sequence.
    pub fn constrained_permutations(&self, predicates: &[Predicate]) -> Vec<Tuple> {
        let mut permutations = Vec::new();
        let mut partial = PartialTuple::default();
        self.descend(predicates, 0, &mut partial, &mut permutations);
        permutations
    }

    fn domain_size(&self, depth: usize) -> usize {
        match depth {
            0 => self.domains.periods,
            1 => self.domains.days,
            2 => self.domains.lessons,
            3 => self.domains.subject_professors,
            4 => self.domains.groups,
            5 => self.domains.rooms,
            _ => unreachable!("tuple has six positions"),
        }
    }

    fn descend(
        &self,
        predicates: &[Predicate],
        depth: usize,
        partial: &mut PartialTuple,
        permutations: &mut Vec<Tuple>,
    ) {
        if depth == 6 {
            permutations.push(partial.complete());
            return;
        }

        for value in 0..self.domain_size(depth) {
            partial.set(depth, Some(value));
            if predicates.iter().all(|predicate| predicate(partial)) {
                self.descend(predicates, depth + 1, partial, permutations);
            }
        }
        partial.set(depth, None);
    }
}

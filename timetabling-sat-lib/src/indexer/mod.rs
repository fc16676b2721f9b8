use crate::input::ModelInput;
use crate::permutations::Tuple;

/// Sizes of the six attribute domains of a scheduling variable.
///
/// The product of all six sizes is the number of SAT variables of the
/// instance; see [`Domains::variables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domains {
    pub periods: usize,
    pub days: usize,
    pub lessons: usize,
    pub subject_professors: usize,
    pub groups: usize,
    pub rooms: usize,
}

impl Domains {
    /// Extracts the attribute domains from a processed input.
    ///
    /// Periods and days are taken from the professors' availability grid,
    /// the lesson domain is the largest weekly lesson count over all
    /// entries.
    pub fn of(input: &ModelInput) -> Self {
        let periods = input.professors[0].availability.len();
        let days = input.professors[0].availability[0].len();
        let lessons = input
            .entries
            .values()
            .map(|entry| entry.lessons)
            .max()
            .unwrap_or(0);

        Domains {
            periods,
            days,
            lessons,
            subject_professors: input.subject_professors.len(),
            groups: input.groups.len(),
            rooms: input.rooms.len(),
        }
    }

    /// The same domains with the room axis collapsed to a single
    /// pseudo-room, as used by the isolated-room strategies.
    pub fn isolated_room(self) -> Self {
        Domains { rooms: 1, ..self }
    }

    /// Total number of SAT variables spanned by these domains.
    pub fn variables(&self) -> usize {
        self.periods * self.days * self.lessons * self.subject_professors * self.groups * self.rooms
    }
}

/// Bijection between scheduling tuples and SAT variable ids.
///
/// Variable ids are 1-based since DIMACS literals must be nonzero. The
/// encoding is mixed-radix with the period as the least significant digit
/// and the room as the most significant one, so enumerating tuples in
/// that order yields the contiguous run `1..=N`.
#[derive(Debug, Clone, Copy)]
pub struct VariableIndexer {
    domains: Domains,
}

impl VariableIndexer {
    pub fn new(domains: Domains) -> Self {
        VariableIndexer { domains }
    }

    /// Returns the unique variable id of a tuple, in `1..=N`.
    ///
    /// Out-of-range attributes are a programming error.
    pub fn index(&self, tuple: &Tuple) -> usize {
        let d = &self.domains;
        debug_assert!(
            tuple.period < d.periods
                && tuple.day < d.days
                && tuple.lesson < d.lessons
                && tuple.subject_professor < d.subject_professors
                && tuple.group < d.groups
                && tuple.room < d.rooms,
            "tuple out of domain range: {:?}",
            tuple
        );

        tuple.period
            + d.periods
                * (tuple.day
                    + d.days
                        * (tuple.lesson
                            + d.lessons
                                * (tuple.subject_professor
                                    + d.subject_professors
                                        * (tuple.group + d.groups * tuple.room))))
            + 1
    }

    /// The positive SAT literal of a tuple.
    pub fn literal(&self, tuple: &Tuple) -> i64 {
        self.index(tuple) as i64
    }

    /// Inverse of [`VariableIndexer::index`]: decodes a variable id back
    /// into its attributes by successive modulo and division.
    pub fn attributes(&self, index: usize) -> Tuple {
        let d = &self.domains;
        debug_assert!(
            index >= 1 && index <= self.domains.variables(),
            "variable id out of range: {}",
            index
        );

        let mut index = index - 1;
        let period = index % d.periods;
        index /= d.periods;

        let day = index % d.days;
        index /= d.days;

        let lesson = index % d.lessons;
        index /= d.lessons;

        let subject_professor = index % d.subject_professors;
        index /= d.subject_professors;

        let group = index % d.groups;
        index /= d.groups;

        let room = index % d.rooms;

        Tuple {
            period,
            day,
            lesson,
            subject_professor,
            group,
            room,
        }
    }
}

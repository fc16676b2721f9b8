use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Result, TimetablingError};

/// One line of the raw input: a subject taught by a professor to a set of
/// classes, with a weekly lesson count, a permissibility grid and a list
/// of eligible rooms. All references are indices into the corresponding
/// input arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    pub subject: usize,
    pub professor: usize,
    pub classes: Vec<usize>,
    pub lessons: usize,
    pub permissibility: Vec<Vec<bool>>,
    pub rooms: Vec<usize>,
}

/// The input file as written by the user, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawModelInput {
    pub subjects: Vec<Subject>,
    pub professors: Vec<Professor>,
    pub classes: Vec<Class>,
    pub rooms: Vec<Room>,
    pub entries: Vec<RawEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: usize,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub id: usize,
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: usize,
    pub name: String,
    pub capacity: usize,
}

/// Availability is indexed `[period][day]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professor {
    pub id: usize,
    pub name: String,
    pub availability: Vec<Vec<bool>>,
}

/// The atomic teaching unit: a subject paired with the professor who
/// teaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectProfessor {
    pub id: usize,
    pub subject: usize,
    pub professor: usize,
}

/// A cohort of classes that attends a lesson together. Class ids are kept
/// sorted so that equal cohorts compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: usize,
    pub classes: Vec<usize>,
}

/// The scheduling unit: a (subject-professor, group) pair together with
/// its weekly lesson count, permissibility grid (indexed `[period][day]`)
/// and eligible rooms.
#[derive(Debug, Clone)]
pub struct Entry {
    pub subject_professor: usize,
    pub group: usize,
    pub lessons: usize,
    pub permissibility: Vec<Vec<bool>>,
    pub rooms: Vec<usize>,
}

/// The processed, validated problem instance. Immutable once built.
#[derive(Debug, Clone)]
pub struct ModelInput {
    pub subjects: Vec<Subject>,
    pub professors: Vec<Professor>,
    pub subject_professors: Vec<SubjectProfessor>,
    pub groups: Vec<Group>,
    pub entries: HashMap<(usize, usize), Entry>,
    pub classes: Vec<Class>,
    pub rooms: Vec<Room>,
    /// `curriculum[group][subject_professor]` is true iff an entry exists.
    pub curriculum: Vec<Vec<bool>>,
    /// Symmetric adjacency over groups: an edge marks a shared class.
    /// The diagonal is true for every group.
    pub groups_graph: Vec<Vec<bool>>,
}

impl ModelInput {
    /// Reads and processes a JSON input file.
    pub fn from_json_file(path: &Path) -> Result<ModelInput> {
        let file = File::open(path)?;
        let raw: RawModelInput = serde_json::from_reader(BufReader::new(file))?;
        Self::from_raw(raw)
    }

    /// Normalizes a raw input: interns subject-professors and groups,
    /// keys entries by (subject-professor, group) and derives the
    /// curriculum and the groups graph. All validation happens here,
    /// before any encoding work starts.
    pub fn from_raw(raw: RawModelInput) -> Result<ModelInput> {
        validate_shape(&raw)?;

        let mut subject_professors: Vec<SubjectProfessor> = Vec::new();
        let mut groups: Vec<Group> = Vec::new();
        let mut entries: HashMap<(usize, usize), Entry> = HashMap::new();
        // Classes already claimed by some group of a given subject-professor.
        let mut associated_classes: HashMap<(usize, usize), Vec<usize>> = HashMap::new();

        for raw_entry in &raw.entries {
            let subject_professor = match subject_professors
                .iter()
                .find(|sp| sp.subject == raw_entry.subject && sp.professor == raw_entry.professor)
            {
                Some(sp) => sp.clone(),
                None => {
                    let sp = SubjectProfessor {
                        id: subject_professors.len(),
                        subject: raw_entry.subject,
                        professor: raw_entry.professor,
                    };
                    subject_professors.push(sp.clone());
                    sp
                }
            };
            let sp_name = format!(
                "{}~{}",
                raw.subjects[subject_professor.subject].name,
                raw.professors[subject_professor.professor].name
            );

            // Groups associated to the same subject-professor must be
            // disjoint sets of classes.
            let claimed = associated_classes
                .entry((subject_professor.subject, subject_professor.professor))
                .or_default();
            for &class in &raw_entry.classes {
                if claimed.contains(&class) {
                    return Err(TimetablingError::Input(format!(
                        "groups associated to the same subject-professor \"{}\" must be disjoint sets: \
                         class \"{}\" is present in more than one group, or group {{ {} }} is not a set",
                        sp_name,
                        raw.classes[class].name,
                        raw_entry
                            .classes
                            .iter()
                            .map(|&c| raw.classes[c].name.as_str())
                            .join(", "),
                    )));
                }
                claimed.push(class);
            }

            let mut classes = raw_entry.classes.clone();
            classes.sort_unstable();
            let group = match groups.iter().find(|group| group.classes == classes) {
                Some(group) => group.clone(),
                None => {
                    let group = Group {
                        id: groups.len(),
                        classes,
                    };
                    groups.push(group.clone());
                    group
                }
            };

            if raw_entry.rooms.iter().duplicates().next().is_some() {
                return Err(TimetablingError::Input(format!(
                    "entry for \"{}\" lists the same room more than once",
                    sp_name
                )));
            }
            let group_size: usize = group.classes.iter().map(|&c| raw.classes[c].size).sum();
            if !raw_entry
                .rooms
                .iter()
                .any(|&room| raw.rooms[room].capacity >= group_size)
            {
                return Err(TimetablingError::Input(format!(
                    "there are no fitting rooms for \"{}\" to {{ {} }}",
                    sp_name,
                    group
                        .classes
                        .iter()
                        .map(|&c| raw.classes[c].name.as_str())
                        .join(", "),
                )));
            }

            let entry_key = (subject_professor.id, group.id);
            if entries.contains_key(&entry_key) {
                return Err(TimetablingError::Input(format!(
                    "duplicate entry for subject-professor \"{}\" and group {}",
                    sp_name, group.id
                )));
            }
            entries.insert(
                entry_key,
                Entry {
                    subject_professor: subject_professor.id,
                    group: group.id,
                    lessons: raw_entry.lessons,
                    permissibility: raw_entry.permissibility.clone(),
                    rooms: raw_entry.rooms.clone(),
                },
            );
        }

        let mut curriculum = vec![vec![false; subject_professors.len()]; groups.len()];
        for entry in entries.values() {
            curriculum[entry.group][entry.subject_professor] = true;
        }

        let groups_graph = build_groups_graph(&groups);

        Ok(ModelInput {
            subjects: raw.subjects,
            professors: raw.professors,
            subject_professors,
            groups,
            entries,
            classes: raw.classes,
            rooms: raw.rooms,
            curriculum,
            groups_graph,
        })
    }

    /// Display name of a subject-professor, used in diagnostics.
    pub fn subject_professor_name(&self, subject_professor: usize) -> String {
        let sp = &self.subject_professors[subject_professor];
        format!(
            "{}~{}",
            self.subjects[sp.subject].name, self.professors[sp.professor].name
        )
    }
}

/// Structural checks on the raw input: non-empty arrays, in-range
/// references and consistent (periods x days) grid dimensions.
fn validate_shape(raw: &RawModelInput) -> Result<()> {
    if raw.professors.is_empty() {
        return Err(TimetablingError::Input(
            "at least one professor is required".to_string(),
        ));
    }
    if raw.entries.is_empty() {
        return Err(TimetablingError::Input(
            "at least one entry is required".to_string(),
        ));
    }

    let periods = raw.professors[0].availability.len();
    let days = raw.professors[0]
        .availability
        .first()
        .map(Vec::len)
        .unwrap_or(0);
    if periods == 0 || days == 0 {
        return Err(TimetablingError::Input(format!(
            "professor \"{}\" has an empty availability grid",
            raw.professors[0].name
        )));
    }

    for professor in &raw.professors {
        if professor.availability.len() != periods
            || professor.availability.iter().any(|row| row.len() != days)
        {
            return Err(TimetablingError::Input(format!(
                "availability grid of professor \"{}\" does not span {} periods x {} days",
                professor.name, periods, days
            )));
        }
    }

    for (position, entry) in raw.entries.iter().enumerate() {
        if entry.subject >= raw.subjects.len() || entry.professor >= raw.professors.len() {
            return Err(TimetablingError::Input(format!(
                "entry {} references an unknown subject or professor",
                position
            )));
        }
        if entry.classes.is_empty() {
            return Err(TimetablingError::Input(format!(
                "entry {} has no classes",
                position
            )));
        }
        if let Some(&class) = entry.classes.iter().find(|&&c| c >= raw.classes.len()) {
            return Err(TimetablingError::Input(format!(
                "entry {} references an unknown class {}",
                position, class
            )));
        }
        if let Some(&room) = entry.rooms.iter().find(|&&r| r >= raw.rooms.len()) {
            return Err(TimetablingError::Input(format!(
                "entry {} references an unknown room {}",
                position, room
            )));
        }
        if entry.permissibility.len() != periods
            || entry.permissibility.iter().any(|row| row.len() != days)
        {
            return Err(TimetablingError::Input(format!(
                "permissibility grid of entry {} does not span {} periods x {} days",
                position, periods, days
            )));
        }
    }

    Ok(())
}

/// Builds the symmetric groups graph: an edge marks two groups sharing at
/// least one class. The diagonal is set for every group.
fn build_groups_graph(groups: &[Group]) -> Vec<Vec<bool>> {
    let mut graph = vec![vec![false; groups.len()]; groups.len()];

    for (i, group) in groups.iter().enumerate() {
        graph[i][i] = true;
        for (j, other) in groups.iter().enumerate().skip(i + 1) {
            if group
                .classes
                .iter()
                .any(|class| other.classes.contains(class))
            {
                graph[i][j] = true;
                graph[j][i] = true;
            }
        }
    }

    graph
}

//! Post-solve room assignment for the isolated-room strategies.
//!
//! The solved schedule fixes (period, day) slots but not rooms. For each
//! slot bucket a bipartite graph connects the selected variables to the
//! rooms of their entries that fit the group, and a maximum matching
//! picks the rooms. A bucket without a perfect matching makes the whole
//! timetable unassignable.

use indexmap::IndexMap;
use itertools::Itertools;
use log::warn;
use petgraph::algo::maximum_matching;
use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::{FxBuildHasher, FxHashMap};

use super::Timetable;
use crate::evaluator::PredicateEvaluator;
use crate::indexer::VariableIndexer;
use crate::input::ModelInput;

/// Matches every selected variable to a fitting room, bucket by bucket.
///
/// Returns `None` when some bucket cannot be covered; the offending
/// bucket is described in the log.
pub(super) fn assign_rooms(
    selected: &[i64],
    indexer: &VariableIndexer,
    evaluator: &PredicateEvaluator,
    input: &ModelInput,
) -> Option<Timetable> {
    let mut buckets: IndexMap<(usize, usize), Vec<i64>, FxBuildHasher> = IndexMap::default();
    for &variable in selected {
        let tuple = indexer.attributes(variable as usize);
        buckets
            .entry((tuple.period, tuple.day))
            .or_default()
            .push(variable);
    }

    let mut timetable = Timetable::with_capacity(selected.len());
    for ((period, day), variables) in &buckets {
        let Some(assignments) = match_bucket(variables, indexer, evaluator, input) else {
            warn!(
                "cannot assign rooms at period {}, day {}:\n{}",
                period,
                day,
                describe_bucket(variables, indexer, evaluator, input)
            );
            return None;
        };

        for (variable, room) in assignments {
            let tuple = indexer.attributes(variable as usize);
            timetable.push(crate::permutations::Tuple { room, ..tuple });
        }
    }

    Some(timetable)
}

/// Maximum bipartite matching between one bucket's variables and the
/// fitting rooms of their entries. `None` if some variable stays
/// unmatched.
fn match_bucket(
    variables: &[i64],
    indexer: &VariableIndexer,
    evaluator: &PredicateEvaluator,
    input: &ModelInput,
) -> Option<Vec<(i64, usize)>> {
    let mut graph: UnGraph<(), ()> = UnGraph::default();
    let variable_nodes: Vec<NodeIndex> = variables.iter().map(|_| graph.add_node(())).collect();
    let mut room_nodes: FxHashMap<usize, NodeIndex> = FxHashMap::default();
    let mut room_of_node: FxHashMap<NodeIndex, usize> = FxHashMap::default();

    for (slot, &variable) in variables.iter().enumerate() {
        for room in fitting_rooms(variable, indexer, evaluator, input) {
            let room_node = *room_nodes
                .entry(room)
                .or_insert_with(|| graph.add_node(()));
            room_of_node.insert(room_node, room);
            graph.add_edge(variable_nodes[slot], room_node, ());
        }
    }

    let matching = maximum_matching(&graph);

    let mut assignments = Vec::with_capacity(variables.len());
    for (slot, &variable) in variables.iter().enumerate() {
        let mate = matching.mate(variable_nodes[slot])?;
        assignments.push((variable, room_of_node[&mate]));
    }
    Some(assignments)
}

fn fitting_rooms(
    variable: i64,
    indexer: &VariableIndexer,
    evaluator: &PredicateEvaluator,
    input: &ModelInput,
) -> Vec<usize> {
    let tuple = indexer.attributes(variable as usize);
    let entry = &input.entries[&(tuple.subject_professor, tuple.group)];
    entry
        .rooms
        .iter()
        .copied()
        .filter(|&room| evaluator.fits(tuple.group, room))
        .collect()
}

/// One line per variable: the subject and the fitting rooms it competed
/// for, mirroring what the matching saw.
fn describe_bucket(
    variables: &[i64],
    indexer: &VariableIndexer,
    evaluator: &PredicateEvaluator,
    input: &ModelInput,
) -> String {
    variables
        .iter()
        .map(|&variable| {
            let tuple = indexer.attributes(variable as usize);
            let subject =
                &input.subjects[input.subject_professors[tuple.subject_professor].subject];
            format!(
                "\tsubject: {} -> {{ {} }}",
                subject.name,
                fitting_rooms(variable, indexer, evaluator, input)
                    .iter()
                    .map(|&room| input.rooms[room].name.as_str())
                    .join(", ")
            )
        })
        .join("\n")
}

//! Recovers the order in which actions were requested on the command line.
//!
//! Actions run in the order their flags first appear, not in the order the
//! registry declares them, so `-p -b -u` means pull, then build, then up.
//! Positions come from the argument parser, which alone knows where a flag
//! ends and an option value begins.

use indexmap::IndexSet;

use crate::action_definitions::ActionDefinition;
use crate::registry::ActionRegistry;

/// Returns the requested actions ordered by the earliest position at which
/// they occurred, each action at most once.
///
/// `occurrences` pairs an action ID with one position its flag was seen at.
/// An action may occur several times in any order; IDs unknown to the
/// registry are skipped.
pub fn sequence<'r, S, I>(occurrences: I, registry: &'r ActionRegistry) -> Vec<&'r ActionDefinition>
where
    S: AsRef<str>,
    I: IntoIterator<Item = (S, usize)>,
{
    let mut positioned: Vec<(usize, &'r ActionDefinition)> = occurrences
        .into_iter()
        .filter_map(|(id, position)| registry.get(id.as_ref()).map(|action| (position, action)))
        .collect();
    positioned.sort_by_key(|(position, _)| *position);

    let requested: IndexSet<&'r str> = positioned.iter().map(|(_, action)| action.id).collect();

    requested
        .into_iter()
        .filter_map(|id| registry.get(id))
        .collect()
}

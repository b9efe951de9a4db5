//! Structural synchronisation of the group table with the host.
//!
//! The host's window stack is authoritative.  [`reconcile`] admits windows
//! the table has never seen as singleton groups, drops windows that are
//! gone, and lets host-side focus changes inside a group re-seat that
//! group's own stack.

use crate::stack::{flatten_opt, Stack};
use crate::table::GroupTable;
use log::debug;
use std::collections::BTreeSet;
use std::fmt;

/// Derive an up-to-date table from `previous` and the host's current stack.
///
/// Afterwards every host window is in exactly one group, nothing else is,
/// and every key is its group's focus.
pub fn reconcile<W: Ord + Clone + fmt::Debug>(
    host: Option<&Stack<W>>,
    previous: &GroupTable<W>,
) -> GroupTable<W> {
    let live = flatten_opt(host);
    let live_set: BTreeSet<&W> = live.iter().collect();
    let known: BTreeSet<W> = previous.members().into_iter().collect();

    let mut table = previous.map_stacks(|s| s.filter(|w| live_set.contains(w)));

    for w in live.iter().filter(|w| !known.contains(*w)) {
        debug!("new window {:?} becomes a singleton group", w);
        table.insert(Stack::singleton(w.clone()));
    }

    // Follow the host focus into its group.
    if let Some(host) = host {
        if let Some(group) = table.find(&host.focus).cloned() {
            if let Some(reseated) = host.filter(|w| group.contains(w)) {
                table.remove(&group.focus);
                table.insert(reseated);
            }
        }
    }

    table
}

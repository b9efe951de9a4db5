//! Keeps each group's windows contiguous in the host's window order.
//!
//! The outer arrangement only sees one representative per group, so the
//! host ordering must not interleave members of different groups.

use crate::stack::Stack;
use crate::table::GroupTable;
use std::collections::BTreeSet;

/// Compute a reordered host stack in which every group is one contiguous run.
///
/// Grouped windows are pulled out and reinserted as one block directly above
/// the focus of whatever remains, groups ordered by where their key sits in
/// the host order and each group in its own stack order.  The host focus is
/// kept.  Returns `None` when the order would not change.
pub fn rewrite<W: Ord + Clone>(host: &Stack<W>, table: &GroupTable<W>) -> Option<Stack<W>> {
    let order = host.flatten();
    let present: BTreeSet<&W> = order.iter().collect();

    let grouped: Vec<W> = order
        .iter()
        .filter_map(|w| table.get(w))
        .flat_map(Stack::flatten)
        .filter(|w| present.contains(w))
        .collect();
    if grouped.is_empty() {
        return None;
    }

    let taken: BTreeSet<&W> = grouped.iter().collect();
    let rewritten: Vec<W> = match host.filter(|w| !taken.contains(w)) {
        Some(rest) => {
            let mut out: Vec<W> = rest.up.iter().rev().cloned().collect();
            out.extend(grouped.iter().cloned());
            out.push(rest.focus.clone());
            out.extend(rest.down.iter().cloned());
            out
        }
        None => grouped.clone(),
    };

    if rewritten == order {
        return None;
    }
    Stack::from_vec(rewritten)?.focus_on(&host.focus)
}

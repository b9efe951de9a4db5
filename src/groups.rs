//! The group layer of one workspace.
//!
//! [`Groups`] owns the [`GroupTable`], the [`DeferredQueue`], the previous
//! redraw's inner-arrangement [`Slot`]s and the [`SubLayoutDefaults`].  It is
//! deliberately host-free: commands and redraw phases take the host's
//! window stack as a value and describe the host-side effects they need in
//! an [`Outcome`] (or a returned reordering) instead of performing them.
//!
//! A redraw is two phases that must both run, in order:
//!
//! 1. [`modify_layout`](Groups::modify_layout) reconciles the table with the
//!    host and yields the representatives for the outer arrangement.
//! 2. [`redo_layout`](Groups::redo_layout) takes the outer placements and
//!    produces the final per-window placements.
//!
//! Between redraws the table may be missing windows: `UnMerge` orphans its
//! target until the next `modify_layout` re-admits it.

use crate::allocator::{allocate, Slot, SubLayoutDefaults};
use crate::command::{GroupMessage, LayoutMessage};
use crate::geometry::Rect;
use crate::queue::DeferredQueue;
use crate::reconcile::reconcile;
use crate::rewriter::rewrite;
use crate::stack::{flatten_opt, Stack};
use crate::table::GroupTable;
use crate::traits::Arrangement;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Host-side effects requested by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<W> {
    /// Group membership or order changed; the host ordering must be
    /// rewritten before the next redraw.
    pub rewrite: bool,
    /// The host should move input focus to this window.
    pub focus: Option<W>,
    /// Message to pass on to the outer arrangement.
    pub forward: Option<LayoutMessage>,
}

impl<W> Default for Outcome<W> {
    fn default() -> Self {
        Self {
            rewrite: false,
            focus: None,
            forward: None,
        }
    }
}

impl<W> Outcome<W> {
    fn rewrite() -> Self {
        Self {
            rewrite: true,
            ..Self::default()
        }
    }
}

/// Result of [`Groups::modify_layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modified<W> {
    /// One window per group (its key), in host order, focused like the host.
    pub representatives: Option<Stack<W>>,
    /// New host ordering that keeps groups contiguous, if it changed.
    pub reorder: Option<Stack<W>>,
}

/// Group state of one workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "W: Ord + Clone + Serialize, L: Serialize",
    deserialize = "W: Ord + Clone + Deserialize<'de>, L: Deserialize<'de>"
))]
pub struct Groups<W: Ord, L> {
    table: GroupTable<W>,
    queue: DeferredQueue<W>,
    slots: Vec<Slot<W, L>>,
    defaults: SubLayoutDefaults<L>,
}

impl<W, L> Groups<W, L>
where
    W: Ord + Clone + fmt::Debug,
    L: Arrangement,
{
    /// Empty state seeded with `defaults`.
    pub fn new(defaults: SubLayoutDefaults<L>) -> Self {
        Self {
            table: GroupTable::new(),
            queue: DeferredQueue::new(),
            slots: Vec::new(),
            defaults,
        }
    }

    pub fn table(&self) -> &GroupTable<W> {
        &self.table
    }

    pub fn queue(&self) -> &DeferredQueue<W> {
        &self.queue
    }

    pub fn slots(&self) -> &[Slot<W, L>] {
        &self.slots
    }

    pub fn defaults(&self) -> &SubLayoutDefaults<L> {
        &self.defaults
    }

    /// Replace the seeding defaults; existing slots are kept.
    pub fn set_defaults(&mut self, defaults: SubLayoutDefaults<L>) {
        self.defaults = defaults;
    }

    /// Replace the table wholesale.
    pub(crate) fn set_table(&mut self, table: GroupTable<W>) {
        self.table = table;
    }

    //  Command processing

    /// Apply one group message.
    ///
    /// `host` is the workspace's current window stack.  Unknown target
    /// windows make the command a no-op.
    pub fn handle(&mut self, msg: GroupMessage<W>, host: Option<&Stack<W>>) -> Outcome<W> {
        match msg {
            GroupMessage::SubMessage(m, w) => {
                debug!("queue {:?} for {:?}", m, w);
                self.queue.push(m, w);
                Outcome::default()
            }

            GroupMessage::Broadcast(m) => {
                debug!("broadcast {:?}", m);
                self.queue.broadcast(&m, flatten_opt(host));
                Outcome::default()
            }

            GroupMessage::WithGroup(op, w) => {
                debug!("{} in group of {:?}", op, w);
                self.with_group(|s| op.apply(s), w)
            }

            GroupMessage::Merge(x, y) => self.merge(x, y),

            GroupMessage::UnMerge(x) => {
                if self.table.find(&x).is_none() {
                    debug!("unmerge: {:?} is in no group", x);
                    return Outcome::default();
                }
                info!("unmerge {:?}", x);
                self.table = self.table.map_stacks(|s| s.filter(|w| *w != x));
                Outcome::rewrite()
            }

            GroupMessage::MergeAll(focus) => self.merge_all(focus, host),

            GroupMessage::UnMergeAll => {
                info!("unmerge all");
                self.table = GroupTable::singletons(self.table.members());
                Outcome::rewrite()
            }

            GroupMessage::Layout(m) => {
                debug!("pass through {:?}", m);
                self.queue.broadcast(&m, flatten_opt(host));
                Outcome {
                    forward: Some(m),
                    ..Outcome::default()
                }
            }
        }
    }

    /// Apply `transform` to the stack of the group owning `w`.
    ///
    /// The group is re-keyed by the new focus.  A transform that drops
    /// members leaves them orphaned until the next reconcile, like
    /// [`GroupMessage::UnMerge`].
    pub fn with_group(&mut self, transform: impl FnOnce(&Stack<W>) -> Stack<W>, w: W) -> Outcome<W> {
        let Some(group) = self.table.find(&w).cloned() else {
            debug!("with group: {:?} is in no group", w);
            return Outcome::default();
        };
        let next = transform(&group);
        if next == group {
            return Outcome::default();
        }
        info!("transform group {:?}", group.focus);
        self.table.remove(&group.focus);
        self.table.insert(next.clone());
        Outcome {
            rewrite: next.flatten() != group.flatten(),
            focus: (next.focus != w).then(|| next.focus.clone()),
            forward: None,
        }
    }

    fn merge(&mut self, x: W, y: W) -> Outcome<W> {
        let (Some(xg), Some(yg)) = (self.table.find(&x).cloned(), self.table.find(&y).cloned())
        else {
            debug!("merge: {:?} or {:?} is in no group", x, y);
            return Outcome::default();
        };
        if xg.focus == yg.focus {
            debug!("merge: {:?} and {:?} already share a group", x, y);
            return Outcome::default();
        }
        let Some(xs) = xg.focus_on(&x) else {
            return Outcome::default();
        };
        info!("merge group of {:?} into group of {:?}", y, x);
        let mut down = xs.down;
        down.extend(yg.flatten());
        self.table.remove(&xg.focus);
        self.table.remove(&yg.focus);
        self.table.insert(Stack::new(x, xs.up, down));
        Outcome::rewrite()
    }

    fn merge_all(&mut self, focus: W, host: Option<&Stack<W>>) -> Outcome<W> {
        let members: BTreeSet<W> = self.table.members().into_iter().collect();
        let mut order: Vec<W> = flatten_opt(host)
            .into_iter()
            .filter(|w| members.contains(w))
            .collect();
        let seen: BTreeSet<W> = order.iter().cloned().collect();
        order.extend(self.table.members().into_iter().filter(|w| !seen.contains(w)));

        let Some(merged) = Stack::from_vec(order).and_then(|s| s.focus_on(&focus)) else {
            debug!("merge all: {:?} is in no group", focus);
            return Outcome::default();
        };
        info!("merge all around {:?}", focus);
        self.table = GroupTable::from_stacks([merged]);
        Outcome {
            rewrite: true,
            focus: (host.map(|h| &h.focus) != Some(&focus)).then(|| focus),
            forward: None,
        }
    }

    //  Redraw

    /// First redraw phase: reconcile with the host.
    pub fn modify_layout(&mut self, host: Option<&Stack<W>>) -> Modified<W> {
        self.table = reconcile(host, &self.table);
        let reorder = host.and_then(|h| rewrite(h, &self.table));
        let current = reorder.as_ref().or(host);
        let representatives = current.and_then(|h| h.filter(|w| self.table.contains_key(w)));
        Modified {
            representatives,
            reorder,
        }
    }

    /// Host reordering needed to keep groups contiguous, if any.
    pub fn rewrite_host(&self, host: &Stack<W>) -> Option<Stack<W>> {
        rewrite(host, &self.table)
    }

    /// Second redraw phase: arrange every group inside the rectangle the
    /// outer arrangement gave its representative.
    ///
    /// Consumes the deferred queue.
    pub fn redo_layout(&mut self, outer: &[(W, Rect)]) -> Vec<(W, Rect)> {
        let allocation = allocate(outer, &self.table, &self.slots, &self.queue, &self.defaults);
        self.slots = allocation.slots;
        self.queue.clear();
        allocation.placements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::StackOp;
    use crate::layouts::{Cycle, Variant};

    type G = Groups<char, Cycle>;

    fn groups_with(stacks: Vec<Stack<char>>) -> G {
        let mut g = G::new(SubLayoutDefaults::new(
            Cycle::new(vec![Variant::Tabbed, Variant::Column]),
            vec![],
        ));
        g.set_table(GroupTable::from_stacks(stacks));
        g
    }

    fn host(focus: char, up: &[char], down: &[char]) -> Stack<char> {
        Stack::new(focus, up.to_vec(), down.to_vec())
    }

    fn member_set(g: &G, key: char) -> BTreeSet<char> {
        g.table().get(&key).unwrap().flatten().into_iter().collect()
    }

    #[test]
    fn merge_puts_destination_group_below_source() {
        let mut g = groups_with(vec![host('A', &[], &['B']), Stack::singleton('C')]);
        let out = g.handle(GroupMessage::Merge('C', 'A'), None);
        assert!(out.rewrite);
        assert_eq!(g.table().len(), 1);
        assert_eq!(g.table().get(&'C'), Some(&host('C', &[], &['A', 'B'])));
        assert!(!g.table().contains_key(&'A'));
    }

    #[test]
    fn merge_by_membership_refocuses_source() {
        let mut g = groups_with(vec![host('A', &[], &['B']), Stack::singleton('C')]);
        g.handle(GroupMessage::Merge('B', 'C'), None);
        assert_eq!(g.table().get(&'B'), Some(&host('B', &['A'], &['C'])));
        assert!(g.table().keys_match_focus());
    }

    #[test]
    fn merge_with_unknown_or_same_group_is_noop() {
        let mut g = groups_with(vec![host('A', &[], &['B'])]);
        let before = g.clone();
        assert_eq!(g.handle(GroupMessage::Merge('A', 'Z'), None), Outcome::default());
        assert_eq!(g.handle(GroupMessage::Merge('A', 'B'), None), Outcome::default());
        assert_eq!(g, before);
    }

    #[test]
    fn merge_membership_is_order_independent() {
        let start = vec![Stack::singleton('A'), Stack::singleton('B'), Stack::singleton('C')];

        let mut one = groups_with(start.clone());
        one.handle(GroupMessage::Merge('B', 'A'), None);
        one.handle(GroupMessage::Merge('C', 'B'), None);

        let mut two = groups_with(start);
        two.handle(GroupMessage::Merge('C', 'B'), None);
        two.handle(GroupMessage::Merge('A', 'C'), None);

        assert_eq!(member_set(&one, 'C'), member_set(&two, 'A'));
        // Focus and order depend on merge order.
        assert_ne!(one.table().get(&'C'), two.table().get(&'A'));
    }

    #[test]
    fn unmerge_moves_focus_below_and_orphans_window() {
        let mut g = groups_with(vec![host('A', &['B'], &['C'])]);
        let out = g.handle(GroupMessage::UnMerge('A'), None);
        assert!(out.rewrite);
        assert_eq!(g.table().get(&'C'), Some(&host('C', &['B'], &[])));
        assert!(g.table().find(&'A').is_none());

        let h = host('B', &[], &['C', 'A']);
        g.modify_layout(Some(&h));
        assert_eq!(g.table().get(&'A'), Some(&Stack::singleton('A')));
        assert!(g.table().covers_exactly(&h.flatten()));
    }

    #[test]
    fn unmerge_then_reconcile_restores_singleton_for_any_group() {
        let shapes = vec![
            vec![host('X', &[], &[])],
            vec![host('X', &[], &['P', 'Q'])],
            vec![host('P', &['X'], &['Q'])],
            vec![host('P', &[], &['Q', 'X']), Stack::singleton('R')],
        ];
        for shape in shapes {
            let mut g = groups_with(shape.clone());
            let windows = GroupTable::from_stacks(shape).members();
            let h = Stack::from_vec(windows.clone()).unwrap();
            g.handle(GroupMessage::UnMerge('X'), Some(&h));
            g.modify_layout(Some(&h));
            assert_eq!(g.table().find(&'X'), Some(&Stack::singleton('X')));
            assert!(g.table().covers_exactly(&windows));
        }
    }

    #[test]
    fn merge_all_then_unmerge_all_gives_singletons() {
        let h = host('A', &[], &['B', 'C', 'D']);
        for f in ['A', 'C', 'D'] {
            let mut g = groups_with(vec![host('A', &[], &['B']), host('C', &[], &['D'])]);
            g.handle(GroupMessage::MergeAll(f), Some(&h));
            assert_eq!(g.table().len(), 1);
            assert_eq!(g.table().get(&f).unwrap().flatten(), vec!['A', 'B', 'C', 'D']);
            g.handle(GroupMessage::UnMergeAll, Some(&h));
            assert_eq!(g.table(), &GroupTable::singletons(vec!['A', 'B', 'C', 'D']));
        }
    }

    #[test]
    fn merge_all_with_unknown_focus_leaves_table() {
        let mut g = groups_with(vec![host('A', &[], &['B'])]);
        let before = g.table().clone();
        assert!(!g.handle(GroupMessage::MergeAll('Z'), None).rewrite);
        assert_eq!(g.table(), &before);
    }

    #[test]
    fn with_group_focus_change_requests_host_focus() {
        let mut g = groups_with(vec![host('A', &[], &['B', 'C'])]);
        let out = g.handle(GroupMessage::WithGroup(StackOp::FocusDown, 'A'), None);
        assert_eq!(out.focus, Some('B'));
        assert!(!out.rewrite);
        assert_eq!(g.table().get(&'B'), Some(&host('B', &['A'], &['C'])));
        assert!(!g.table().contains_key(&'A'));
    }

    #[test]
    fn with_group_swap_requests_rewrite() {
        let mut g = groups_with(vec![host('A', &[], &['B'])]);
        let out = g.handle(GroupMessage::WithGroup(StackOp::SwapDown, 'A'), None);
        assert!(out.rewrite);
        assert_eq!(out.focus, None);
        assert_eq!(g.table().get(&'A').unwrap().flatten(), vec!['B', 'A']);
    }

    #[test]
    fn with_group_unknown_window_is_noop() {
        let mut g = groups_with(vec![host('A', &[], &['B'])]);
        let out = g.handle(GroupMessage::WithGroup(StackOp::FocusDown, 'Z'), None);
        assert_eq!(out, Outcome::default());
    }

    #[test]
    fn transform_dropping_member_orphans_it_until_reconcile() {
        let h = host('A', &[], &['B', 'C']);
        let mut g = groups_with(vec![h.clone()]);
        let out = g.with_group(|s| s.filter(|w| *w != 'B').unwrap_or_else(|| s.clone()), 'A');
        assert!(out.rewrite);
        assert_eq!(out.focus, None);
        assert_eq!(g.table().get(&'A'), Some(&host('A', &[], &['C'])));
        assert_eq!(g.table().find(&'B'), None);

        g.modify_layout(Some(&h));
        assert_eq!(g.table().get(&'B'), Some(&Stack::singleton('B')));
        assert_eq!(g.table().len(), 2);
        assert!(g.table().covers_exactly(&h.flatten()));
    }

    #[test]
    fn transform_dropping_target_focuses_survivor() {
        let mut g = groups_with(vec![host('A', &[], &['B'])]);
        let out = g.with_group(|s| s.filter(|w| *w != 'A').unwrap_or_else(|| s.clone()), 'A');
        assert!(out.rewrite);
        assert_eq!(out.focus, Some('B'));
        assert_eq!(g.table().get(&'B'), Some(&Stack::singleton('B')));
    }

    #[test]
    fn merge_all_requests_focus_when_host_is_elsewhere() {
        let h = host('A', &[], &['B', 'C']);
        let mut g = groups_with(vec![Stack::singleton('A'), Stack::singleton('B'), Stack::singleton('C')]);
        let out = g.handle(GroupMessage::MergeAll('C'), Some(&h));
        assert_eq!(out.focus, Some('C'));
        let out = g.handle(GroupMessage::MergeAll('A'), Some(&h));
        assert_eq!(out.focus, None);
    }

    #[test]
    fn broadcast_without_host_queues_nothing() {
        let mut g = groups_with(vec![]);
        g.handle(GroupMessage::Broadcast(LayoutMessage::NextLayout), None);
        assert!(g.queue().is_empty());
        let h = host('A', &[], &['B']);
        g.handle(GroupMessage::Broadcast(LayoutMessage::NextLayout), Some(&h));
        assert_eq!(g.queue().len(), 2);
    }

    #[test]
    fn passthrough_is_queued_and_forwarded() {
        let mut g = groups_with(vec![]);
        let h = host('A', &[], &['B']);
        let out = g.handle(GroupMessage::Layout(LayoutMessage::Shrink), Some(&h));
        assert_eq!(out.forward, Some(LayoutMessage::Shrink));
        assert_eq!(g.queue().len(), 2);
    }

    #[test]
    fn redraw_replays_queue_and_clears_it() {
        let mut g = groups_with(vec![]);
        let h = host('A', &[], &['B', 'C']);
        g.modify_layout(Some(&h));
        g.handle(GroupMessage::Merge('A', 'B'), Some(&h));
        g.handle(GroupMessage::SubMessage(LayoutMessage::NextLayout, 'B'), Some(&h));

        let modified = g.modify_layout(Some(&h));
        let reps = modified.representatives.unwrap();
        assert_eq!(reps.flatten(), vec!['A', 'C']);

        let area = Rect::new(0, 0, 100, 100);
        let outer = vec![('A', area), ('C', Rect::new(100, 0, 100, 100))];
        let placements = g.redo_layout(&outer);
        assert!(g.queue().is_empty());
        assert_eq!(g.slots()[0].layout.variant(), Variant::Column);
        assert_eq!(g.slots()[1].layout.variant(), Variant::Tabbed);
        assert_eq!(
            placements,
            vec![
                ('A', Rect::new(0, 0, 100, 50)),
                ('B', Rect::new(0, 50, 100, 50)),
                ('C', Rect::new(100, 0, 100, 100)),
            ]
        );
    }

    #[test]
    fn modify_layout_reorders_interleaved_host() {
        let mut g = groups_with(vec![host('A', &[], &['C']), Stack::singleton('B')]);
        let h = host('A', &[], &['B', 'C']);
        let modified = g.modify_layout(Some(&h));
        assert_eq!(modified.reorder.unwrap().flatten(), vec!['A', 'C', 'B']);
        assert_eq!(modified.representatives.unwrap().flatten(), vec!['A', 'B']);
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut g = groups_with(vec![host('A', &[], &['B'])]);
        g.handle(GroupMessage::SubMessage(LayoutMessage::Expand, 'B'), None);
        let json = serde_json::to_string(&g).unwrap();
        let back: G = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }
}

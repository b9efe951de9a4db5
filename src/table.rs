//! The group table.
//!
//! A [`GroupTable`] maps each group's *key* (its focused window) to the
//! group's [`Stack`] of member windows.  Entries are always inserted under
//! their stack's focus, so the key set equals the set of focuses.
//!
//! Membership may transiently be incomplete (see
//! [`GroupMessage::UnMerge`](crate::command::GroupMessage::UnMerge)); the
//! [`reconcile`](crate::reconcile::reconcile) pass restores it.
//!
//! On the wire the table is a plain list of stacks; keys are re-derived
//! from the focuses when it is read back.

use crate::stack::Stack;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from group key to group stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTable<W: Ord> {
    groups: BTreeMap<W, Stack<W>>,
}

impl<W: Ord> Default for GroupTable<W> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }
}

impl<W: Ord + Clone> GroupTable<W> {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from stacks, keying each by its focus.
    ///
    /// A later stack with the same focus replaces an earlier one.
    pub fn from_stacks(stacks: impl IntoIterator<Item = Stack<W>>) -> Self {
        Self {
            groups: stacks.into_iter().map(|s| (s.focus.clone(), s)).collect(),
        }
    }

    /// One singleton group per window.
    pub fn singletons(windows: impl IntoIterator<Item = W>) -> Self {
        Self::from_stacks(windows.into_iter().map(Stack::singleton))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The group keyed by `key`.
    pub fn get(&self, key: &W) -> Option<&Stack<W>> {
        self.groups.get(key)
    }

    /// Whether `key` is a group key.
    pub fn contains_key(&self, key: &W) -> bool {
        self.groups.contains_key(key)
    }

    /// The group containing `window`, looked up by key first and then by
    /// membership.
    pub fn find(&self, window: &W) -> Option<&Stack<W>> {
        self.groups
            .get(window)
            .or_else(|| self.groups.values().find(|s| s.contains(window)))
    }

    /// Key of the group containing `window`.
    pub fn key_of(&self, window: &W) -> Option<W> {
        self.find(window).map(|s| s.focus.clone())
    }

    /// Insert `stack` under its focus, returning whatever was keyed there.
    pub fn insert(&mut self, stack: Stack<W>) -> Option<Stack<W>> {
        self.groups.insert(stack.focus.clone(), stack)
    }

    /// Remove the group keyed by `key`.
    pub fn remove(&mut self, key: &W) -> Option<Stack<W>> {
        self.groups.remove(key)
    }

    /// Iterate `(key, stack)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&W, &Stack<W>)> {
        self.groups.iter()
    }

    /// Iterate the group stacks in key order.
    pub fn stacks(&self) -> impl Iterator<Item = &Stack<W>> {
        self.groups.values()
    }

    /// Every member window, group by group in key order.
    pub fn members(&self) -> Vec<W> {
        self.groups.values().flat_map(Stack::flatten).collect()
    }

    /// Rebuild the table by transforming every stack; stacks mapped to
    /// `None` are dropped and survivors are re-keyed by their focus.
    pub fn map_stacks(&self, mut f: impl FnMut(&Stack<W>) -> Option<Stack<W>>) -> Self {
        Self::from_stacks(self.groups.values().filter_map(|s| f(s)))
    }

    /// Every key equals its stack's focus.
    pub fn keys_match_focus(&self) -> bool {
        self.groups.iter().all(|(k, s)| *k == s.focus)
    }

    /// No window appears twice across (or within) groups.
    pub fn is_disjoint(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.groups
            .values()
            .flat_map(Stack::flatten)
            .all(|w| seen.insert(w))
    }

    /// Every window in `windows` is in exactly one group and the table holds
    /// nothing else.
    pub fn covers_exactly(&self, windows: &[W]) -> bool {
        let mut members = self.members();
        let mut expected = windows.to_vec();
        members.sort();
        expected.sort();
        members == expected
    }
}

impl<W: Ord + Clone + Serialize> Serialize for GroupTable<W> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.groups.values())
    }
}

impl<'de, W> Deserialize<'de> for GroupTable<W>
where
    W: Ord + Clone + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stacks = Vec::<Stack<W>>::deserialize(deserializer)?;
        Ok(Self::from_stacks(stacks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> GroupTable<char> {
        GroupTable::from_stacks(vec![
            Stack::new('A', vec![], vec!['B']),
            Stack::singleton('C'),
        ])
    }

    #[test]
    fn keys_follow_focus() {
        let t = table();
        assert!(t.contains_key(&'A'));
        assert!(!t.contains_key(&'B'));
        assert!(t.keys_match_focus());
    }

    #[test]
    fn find_by_membership() {
        let t = table();
        assert_eq!(t.key_of(&'B'), Some('A'));
        assert_eq!(t.key_of(&'C'), Some('C'));
        assert_eq!(t.key_of(&'Z'), None);
    }

    #[test]
    fn map_stacks_rekeys_and_drops() {
        let t = table().map_stacks(|s| s.filter(|w| *w != 'A' && *w != 'C'));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(&'B'), Some(&Stack::singleton('B')));
    }

    #[test]
    fn disjointness_detects_shared_window() {
        let t = GroupTable::from_stacks(vec![
            Stack::new('A', vec![], vec!['B']),
            Stack::new('C', vec![], vec!['B']),
        ]);
        assert!(!t.is_disjoint());
        assert!(table().is_disjoint());
    }

    #[test]
    fn covers_exactly_ignores_order() {
        let t = table();
        assert!(t.covers_exactly(&['C', 'B', 'A']));
        assert!(!t.covers_exactly(&['A', 'B']));
        assert!(!t.covers_exactly(&['A', 'B', 'C', 'D']));
    }

    #[test]
    fn wire_format_is_list_of_stacks() {
        let json = serde_json::to_string(&table()).unwrap();
        assert_eq!(
            json,
            r#"[{"focus":"A","up":[],"down":["B"]},{"focus":"C","up":[],"down":[]}]"#
        );
        let back: GroupTable<char> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table());
    }
}

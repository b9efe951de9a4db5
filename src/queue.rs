//! Deferred arrangement messages.
//!
//! Messages addressed to a window's inner arrangement are not delivered
//! immediately: they are queued here and replayed, in order, when the
//! group owning that window is next arranged.

use crate::command::LayoutMessage;
use serde::{Deserialize, Serialize};

/// Ordered `(message, target window)` pairs accumulated since the last redraw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredQueue<W> {
    entries: Vec<(LayoutMessage, W)>,
}

impl<W> Default for DeferredQueue<W> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<W: Clone + PartialEq> DeferredQueue<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `msg` for `target`.
    pub fn push(&mut self, msg: LayoutMessage, target: W) {
        self.entries.push((msg, target));
    }

    /// Queue `msg` once for every window in `targets`.
    pub fn broadcast(&mut self, msg: &LayoutMessage, targets: impl IntoIterator<Item = W>) {
        self.entries
            .extend(targets.into_iter().map(|w| (msg.clone(), w)));
    }

    /// The queued messages whose target is one of `members`, in queue order.
    pub fn for_members<'a>(&'a self, members: &'a [W]) -> impl Iterator<Item = &'a LayoutMessage> {
        self.entries
            .iter()
            .filter(move |(_, w)| members.contains(w))
            .map(|(m, _)| m)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in queue order.
    pub fn entries(&self) -> &[(LayoutMessage, W)] {
        &self.entries
    }
}

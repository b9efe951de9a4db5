//! Per-redraw pairing of groups with inner-arrangement instances.
//!
//! Instances follow *slot order*, not group identity: the i-th group the
//! outer arrangement places reuses the i-th instance of the previous redraw.
//! If the outer ordering shifts, a group inherits whatever state its new
//! slot carried.  Slots without a previous instance are seeded from
//! [`SubLayoutDefaults`].

use crate::geometry::Rect;
use crate::queue::DeferredQueue;
use crate::stack::Stack;
use crate::table::GroupTable;
use crate::traits::Arrangement;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How brand-new inner-arrangement instances are seeded.
///
/// The instance for slot `i` is `base` advanced `advance[i]` times through
/// [`Arrangement::next_variant`]; slots past the end of `advance` get `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubLayoutDefaults<L> {
    pub advance: Vec<usize>,
    pub base: L,
}

impl<L: Arrangement> SubLayoutDefaults<L> {
    pub fn new(base: L, advance: Vec<usize>) -> Self {
        Self { advance, base }
    }

    /// A fresh instance for the given slot.
    pub fn fresh(&self, slot: usize) -> L {
        let steps = self.advance.get(slot).copied().unwrap_or(0);
        (0..steps).fold(self.base.clone(), |layout, _| layout.next_variant())
    }
}

/// One slot's inner-arrangement instance and the group it last arranged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot<W, L> {
    pub layout: L,
    pub stack: Option<Stack<W>>,
}

/// Result of one allocation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation<W, L> {
    /// Final window placements, group by group in outer order.
    pub placements: Vec<(W, Rect)>,
    /// Slots to carry into the next redraw, in outer order.
    pub slots: Vec<Slot<W, L>>,
}

/// Arrange every group placed by the outer arrangement.
///
/// `outer` holds the representatives (group keys) and their rectangles in
/// the outer arrangement's order.  Queued messages targeting a group's
/// members are replayed on that group's instance before it runs; rejected
/// messages leave the instance unchanged.  Representatives with no group
/// produce no placements.
pub fn allocate<W, L>(
    outer: &[(W, Rect)],
    table: &GroupTable<W>,
    previous: &[Slot<W, L>],
    queue: &DeferredQueue<W>,
    defaults: &SubLayoutDefaults<L>,
) -> Allocation<W, L>
where
    W: Ord + Clone + fmt::Debug,
    L: Arrangement,
{
    let mut placements = Vec::new();
    let mut slots = Vec::with_capacity(outer.len());

    for (representative, area) in outer {
        let Some(group) = table.get(representative) else {
            debug!("no group for {:?}, skipping", representative);
            continue;
        };

        // Skipped representatives take no slot.
        let i = slots.len();
        let mut layout = match previous.get(i) {
            Some(slot) => slot.layout.clone(),
            None => defaults.fresh(i),
        };

        let members = group.flatten();
        for msg in queue.for_members(&members) {
            match layout.handle_message(msg) {
                Some(next) => layout = next,
                None => debug!("{:?} rejected by group {:?}", msg, representative),
            }
        }

        let (mut placed, replaced) = layout.arrange(Some(group), *area);
        placements.append(&mut placed);
        slots.push(Slot {
            layout: replaced.unwrap_or(layout),
            stack: Some(group.clone()),
        });
    }

    Allocation { placements, slots }
}

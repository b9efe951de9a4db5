//! Concrete arrangement algorithms.
//!
//! [`Cycle`] is the only [`Arrangement`] shipped with tabgrp: an ordered list
//! of [`Variant`]s with one of them active, plus the master-area parameters
//! shared by the variants that have a master area.  It serves as both the
//! outer arrangement and the per-group inner arrangement.

use crate::command::LayoutMessage;
use crate::geometry::Rect;
use crate::stack::Stack;
use crate::traits::Arrangement;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// How much one `Shrink` / `Expand` moves the master ratio.
const RATIO_STEP: f64 = 0.03;

/// Bounds for the master ratio.
const RATIO_MIN: f64 = 0.1;
const RATIO_MAX: f64 = 0.9;

/// One way of placing windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Every window gets the whole area (stacked under tabs).
    Tabbed,
    /// Only the focused window is placed, covering the whole area.
    Full,
    /// Master column on the left, the rest stacked on the right.
    Tall,
    /// Master row on top, the rest side by side below.
    Wide,
    /// All windows stacked vertically.
    Column,
    /// All windows side by side.
    Row,
}

impl Variant {
    /// Whether `Shrink` / `Expand` / `IncMaster` affect this variant.
    fn has_master(self) -> bool {
        matches!(self, Variant::Tall | Variant::Wide)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::Tabbed => "tabbed",
            Variant::Full => "full",
            Variant::Tall => "tall",
            Variant::Wide => "wide",
            Variant::Column => "column",
            Variant::Row => "row",
        };
        f.write_str(name)
    }
}

/// Parse a variant name (case-insensitive; `-`, `_` and spaces ignored).
fn parse_variant(s: &str) -> Option<Variant> {
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect();
    match normalized.as_str() {
        "tabbed" | "tabs" => Some(Variant::Tabbed),
        "full" | "fullscreen" => Some(Variant::Full),
        "tall" => Some(Variant::Tall),
        "wide" | "mirrortall" => Some(Variant::Wide),
        "column" => Some(Variant::Column),
        "row" => Some(Variant::Row),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Variant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_variant(&s).ok_or_else(|| DeError::custom(format!("invalid layout: {:?}", s)))
    }
}

/// An ordered list of variants with one active.
///
/// `next_variant` cycles through the list, wrapping at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    variants: Vec<Variant>,
    current: usize,
    master: usize,
    ratio: f64,
}

impl Default for Cycle {
    fn default() -> Self {
        Self::new(vec![Variant::Tabbed])
    }
}

impl Cycle {
    /// Create a cycle starting at the first variant, with one master window
    /// taking half of the area.
    ///
    /// An empty list falls back to `[Tabbed]`.
    pub fn new(variants: Vec<Variant>) -> Self {
        let variants = if variants.is_empty() {
            vec![Variant::Tabbed]
        } else {
            variants
        };
        Self {
            variants,
            current: 0,
            master: 1,
            ratio: 0.5,
        }
    }

    /// Override the master-area parameters.
    pub fn with_master(mut self, master: usize, ratio: f64) -> Self {
        self.master = master;
        self.ratio = ratio.clamp(RATIO_MIN, RATIO_MAX);
        self
    }

    /// The active variant.
    pub fn variant(&self) -> Variant {
        self.variants
            .get(self.current)
            .copied()
            .unwrap_or(Variant::Tabbed)
    }

    /// Index of the active variant.
    pub fn index(&self) -> usize {
        self.current
    }

    pub fn master(&self) -> usize {
        self.master
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    fn master_split(&self, area: Rect, n: usize, mirrored: bool) -> Vec<Rect> {
        if self.master == 0 || n <= self.master {
            return if mirrored { area.columns(n) } else { area.rows(n) };
        }
        if mirrored {
            let (top, bottom) = area.split_vertical(self.ratio);
            let mut rects = top.columns(self.master);
            rects.extend(bottom.columns(n - self.master));
            rects
        } else {
            let (left, right) = area.split_horizontal(self.ratio);
            let mut rects = left.rows(self.master);
            rects.extend(right.rows(n - self.master));
            rects
        }
    }
}

impl Arrangement for Cycle {
    fn arrange<W: Clone + PartialEq>(
        &self,
        stack: Option<&Stack<W>>,
        area: Rect,
    ) -> (Vec<(W, Rect)>, Option<Self>) {
        let Some(stack) = stack else {
            return (Vec::new(), None);
        };
        let windows = stack.flatten();
        let placements = match self.variant() {
            Variant::Tabbed => windows.into_iter().map(|w| (w, area)).collect(),
            Variant::Full => vec![(stack.focus.clone(), area)],
            Variant::Tall => {
                let rects = self.master_split(area, windows.len(), false);
                windows.into_iter().zip(rects).collect()
            }
            Variant::Wide => {
                let rects = self.master_split(area, windows.len(), true);
                windows.into_iter().zip(rects).collect()
            }
            Variant::Column => {
                let rects = area.rows(windows.len());
                windows.into_iter().zip(rects).collect()
            }
            Variant::Row => {
                let rects = area.columns(windows.len());
                windows.into_iter().zip(rects).collect()
            }
        };
        (placements, None)
    }

    fn handle_message(&self, msg: &LayoutMessage) -> Option<Self> {
        match msg {
            LayoutMessage::NextLayout => {
                if self.variants.len() > 1 {
                    Some(self.next_variant())
                } else {
                    None
                }
            }
            LayoutMessage::FirstLayout => {
                if self.current == 0 {
                    return None;
                }
                Some(Self {
                    current: 0,
                    ..self.clone()
                })
            }
            LayoutMessage::Shrink | LayoutMessage::Expand => {
                if !self.variant().has_master() {
                    return None;
                }
                let step = if *msg == LayoutMessage::Shrink {
                    -RATIO_STEP
                } else {
                    RATIO_STEP
                };
                let ratio = (self.ratio + step).clamp(RATIO_MIN, RATIO_MAX);
                if (ratio - self.ratio).abs() < f64::EPSILON {
                    return None;
                }
                Some(Self {
                    ratio,
                    ..self.clone()
                })
            }
            LayoutMessage::IncMaster(delta) => {
                if !self.variant().has_master() {
                    return None;
                }
                let master = (self.master as i64 + *delta as i64).max(0) as usize;
                if master == self.master {
                    return None;
                }
                Some(Self {
                    master,
                    ..self.clone()
                })
            }
        }
    }

    fn next_variant(&self) -> Self {
        let len = self.variants.len().max(1);
        Self {
            current: (self.current + 1) % len,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(0, 0, 1000, 600)
    }

    fn abc() -> Stack<char> {
        Stack::new('a', vec![], vec!['b', 'c'])
    }

    #[test]
    fn variant_names_parse_leniently() {
        let v: Vec<Variant> = serde_json::from_str(r#"["Tabbed", "mirror-tall", " FULL "]"#).unwrap();
        assert_eq!(v, vec![Variant::Tabbed, Variant::Wide, Variant::Full]);
        assert!(serde_json::from_str::<Variant>(r#""spiral""#).is_err());
    }

    #[test]
    fn variant_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Variant::Column).unwrap(), r#""column""#);
    }

    #[test]
    fn tabbed_gives_every_window_the_area() {
        let (placements, changed) = Cycle::default().arrange(Some(&abc()), area());
        assert!(changed.is_none());
        assert_eq!(placements.len(), 3);
        assert!(placements.iter().all(|(_, r)| *r == area()));
        assert_eq!(placements[0].0, 'a');
    }

    #[test]
    fn full_places_only_focus() {
        let s = Stack::new('b', vec!['a'], vec!['c']);
        let (placements, _) = Cycle::new(vec![Variant::Full]).arrange(Some(&s), area());
        assert_eq!(placements, vec![('b', area())]);
    }

    #[test]
    fn tall_splits_master_and_stack() {
        let (placements, _) = Cycle::new(vec![Variant::Tall]).arrange(Some(&abc()), area());
        assert_eq!(placements[0], ('a', Rect::new(0, 0, 500, 600)));
        assert_eq!(placements[1], ('b', Rect::new(500, 0, 500, 300)));
        assert_eq!(placements[2], ('c', Rect::new(500, 300, 500, 300)));
    }

    #[test]
    fn wide_splits_top_and_bottom() {
        let (placements, _) = Cycle::new(vec![Variant::Wide]).arrange(Some(&abc()), area());
        assert_eq!(placements[0], ('a', Rect::new(0, 0, 1000, 300)));
        assert_eq!(placements[1], ('b', Rect::new(0, 300, 500, 300)));
    }

    #[test]
    fn empty_stack_places_nothing() {
        let (placements, _) = Cycle::default().arrange::<char>(None, area());
        assert!(placements.is_empty());
    }

    #[test]
    fn next_variant_wraps() {
        let c = Cycle::new(vec![Variant::Tabbed, Variant::Tall]);
        assert_eq!(c.next_variant().variant(), Variant::Tall);
        assert_eq!(c.next_variant().next_variant().variant(), Variant::Tabbed);
    }

    #[test]
    fn next_layout_rejected_with_single_variant() {
        assert!(Cycle::default().handle_message(&LayoutMessage::NextLayout).is_none());
    }

    #[test]
    fn first_layout_resets_or_rejects() {
        let c = Cycle::new(vec![Variant::Tabbed, Variant::Tall]);
        assert!(c.handle_message(&LayoutMessage::FirstLayout).is_none());
        let advanced = c.next_variant();
        let reset = advanced.handle_message(&LayoutMessage::FirstLayout).unwrap();
        assert_eq!(reset.index(), 0);
    }

    #[test]
    fn shrink_only_applies_to_master_variants() {
        assert!(Cycle::default().handle_message(&LayoutMessage::Shrink).is_none());
        let tall = Cycle::new(vec![Variant::Tall]);
        let shrunk = tall.handle_message(&LayoutMessage::Shrink).unwrap();
        assert!(shrunk.ratio() < tall.ratio());
        let expanded = tall.handle_message(&LayoutMessage::Expand).unwrap();
        assert!(expanded.ratio() > tall.ratio());
    }

    #[test]
    fn inc_master_saturates_at_zero() {
        let tall = Cycle::new(vec![Variant::Tall]);
        let none = tall.handle_message(&LayoutMessage::IncMaster(-5)).unwrap();
        assert_eq!(none.master(), 0);
        assert!(none.handle_message(&LayoutMessage::IncMaster(-1)).is_none());
    }

    #[test]
    fn zero_master_stacks_everything() {
        let c = Cycle::new(vec![Variant::Tall]).with_master(0, 0.5);
        let (placements, _) = c.arrange(Some(&abc()), area());
        assert_eq!(placements[0].1, Rect::new(0, 0, 1000, 200));
    }
}

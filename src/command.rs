//! Commands and types used throughout tabgrp.
//!
//! This module defines the vocabulary that all components share:
//! [`GroupMessage`] describes every mutation of the group structure,
//! [`LayoutMessage`] is what arrangements understand, and [`Command`] is
//! the surface the daemon accepts over IPC.
//!
//! Direction strings are parsed leniently (e.g. "right", "Left", " UP ").

use crate::stack::Stack;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Direction used to find a neighbouring group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Parse a direction string (case-insensitive, surrounding whitespace ignored).
fn parse_direction(s: &str) -> Option<Direction> {
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect();
    match normalized.as_str() {
        "left" | "l" => Some(Direction::Left),
        "right" | "r" => Some(Direction::Right),
        "up" | "u" => Some(Direction::Up),
        "down" | "d" => Some(Direction::Down),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_direction(&s).ok_or_else(|| DeError::custom(format!("invalid direction: {:?}", s)))
    }
}

/// Opaque host window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// A message understood by an [`Arrangement`](crate::traits::Arrangement).
///
/// Arrangements may reject any message; rejection means "no change".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMessage {
    /// Cycle to the next configured variant.
    NextLayout,
    /// Return to the first configured variant.
    FirstLayout,
    /// Shrink the master area.
    Shrink,
    /// Expand the master area.
    Expand,
    /// Change the number of windows in the master area by the given delta.
    IncMaster(i32),
}

/// A serializable transform applied to a group's stack by
/// [`GroupMessage::WithGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackOp {
    FocusUp,
    FocusDown,
    FocusMaster,
    SwapUp,
    SwapDown,
    SwapMaster,
}

impl StackOp {
    /// Apply the transform.
    pub fn apply<W: Clone + PartialEq>(self, stack: &Stack<W>) -> Stack<W> {
        match self {
            StackOp::FocusUp => stack.focus_up(),
            StackOp::FocusDown => stack.focus_down(),
            StackOp::FocusMaster => stack.focus_master(),
            StackOp::SwapUp => stack.swap_up(),
            StackOp::SwapDown => stack.swap_down(),
            StackOp::SwapMaster => stack.swap_master(),
        }
    }
}

impl fmt::Display for StackOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StackOp::FocusUp => "focus-up",
            StackOp::FocusDown => "focus-down",
            StackOp::FocusMaster => "focus-master",
            StackOp::SwapUp => "swap-up",
            StackOp::SwapDown => "swap-down",
            StackOp::SwapMaster => "swap-master",
        };
        f.write_str(name)
    }
}

/// Every mutation the group layer can perform.
///
/// Consumed by [`Groups::handle`](crate::groups::Groups::handle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupMessage<W> {
    /// Queue `msg` for the inner arrangement of the group owning the window.
    SubMessage(LayoutMessage, W),

    /// Queue `msg` for every window on the workspace.
    Broadcast(LayoutMessage),

    /// Transform the stack of the group owning the window.
    WithGroup(StackOp, W),

    /// Merge the group of the second window into the group of the first.
    ///
    /// The result is keyed (and focused) on the first window.
    Merge(W, W),

    /// Remove a window from its group.  It reappears as a singleton group on
    /// the next redraw.
    UnMerge(W),

    /// Collapse every group into one, focused on the given window.
    MergeAll(W),

    /// Explode every group into singleton groups.
    UnMergeAll,

    /// Any other arrangement message: queued for every window and forwarded
    /// to the outer arrangement.
    Layout(LayoutMessage),
}

/// Every action the daemon accepts.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the daemon's main loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// A raw group message.
    Group(GroupMessage<WindowId>),

    /// Merge the neighbouring group in the given direction into the
    /// focused window's group.
    PullGroup(Direction),

    /// Merge the focused window's group into the neighbouring group.
    PushGroup(Direction),

    /// Move the neighbouring window into the focused window's group.
    PullWindow(Direction),

    /// Move the focused window into the neighbouring group.
    PushWindow(Direction),

    //  Host events (drive the in-memory host)

    /// A new window appeared directly above the focus and took focus.
    Open(WindowId),

    /// A window went away.
    Close(WindowId),

    /// The host moved input focus.
    Focus(WindowId),

    /// Recompute placements without any other change.
    Redraw,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Left.to_string(), "left");
        assert_eq!(Direction::Right.to_string(), "right");
        assert_eq!(Direction::Up.to_string(), "up");
        assert_eq!(Direction::Down.to_string(), "down");
    }

    #[test]
    fn direction_parses_leniently() {
        let d: Direction = serde_json::from_str(r#"" Right ""#).unwrap();
        assert_eq!(d, Direction::Right);
        let d: Direction = serde_json::from_str(r#""UP""#).unwrap();
        assert_eq!(d, Direction::Up);
        assert!(serde_json::from_str::<Direction>(r#""sideways""#).is_err());
    }

    #[test]
    fn window_id_display_is_hex() {
        assert_eq!(WindowId(255).to_string(), "0xff");
    }

    #[test]
    fn stack_op_applies_to_stack() {
        let s = Stack::new(1, vec![], vec![2, 3]);
        assert_eq!(StackOp::FocusDown.apply(&s).focus, 2);
        assert_eq!(StackOp::FocusUp.apply(&s).focus, 3);
        assert_eq!(StackOp::SwapDown.apply(&s).flatten(), vec![2, 1, 3]);
    }

    #[test]
    fn group_command_wire_format() {
        let cmd: Command = serde_json::from_str(r#"{"Group":{"Merge":[3,1]}}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Group(GroupMessage::Merge(WindowId(3), WindowId(1)))
        );
        let cmd: Command =
            serde_json::from_str(r#"{"Group":{"SubMessage":["NextLayout",7]}}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Group(GroupMessage::SubMessage(LayoutMessage::NextLayout, WindowId(7)))
        );
        let cmd: Command = serde_json::from_str(r#"{"Group":"UnMergeAll"}"#).unwrap();
        assert_eq!(cmd, Command::Group(GroupMessage::UnMergeAll));
    }

    #[test]
    fn directional_command_wire_format() {
        let cmd: Command = serde_json::from_str(r#"{"PullGroup":"left"}"#).unwrap();
        assert_eq!(cmd, Command::PullGroup(Direction::Left));
        let cmd: Command = serde_json::from_str(r#""Redraw""#).unwrap();
        assert_eq!(cmd, Command::Redraw);
    }
}

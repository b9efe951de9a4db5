//! In-memory [`WindowSystem`] implementation.
//!
//! [`MemoryHost`] keeps one workspace's window stack in memory.  The daemon
//! drives it from `Open` / `Close` / `Focus` commands; the tests use it as
//! a stand-in for a real compositor.

use crate::command::WindowId;
use crate::stack::Stack;
use crate::traits::WindowSystem;
use log::debug;
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Errors produced by the in-memory host.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MemoryHostError {
    #[error("unknown window {0}")]
    UnknownWindow(WindowId),
    #[error("window {0} already exists")]
    DuplicateWindow(WindowId),
    #[error("reordering does not contain the same windows")]
    Mismatch,
}

/// A single-workspace window stack held in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    stack: RefCell<Option<Stack<WindowId>>>,
}

impl MemoryHost {
    /// An empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// A workspace holding `windows` in order, focused on the first.
    pub fn with_windows(windows: impl IntoIterator<Item = WindowId>) -> Self {
        Self {
            stack: RefCell::new(Stack::from_vec(windows.into_iter().collect())),
        }
    }

    /// A new window appears directly above the focus and takes focus.
    pub fn open(&self, window: WindowId) -> Result<(), MemoryHostError> {
        let mut stack = self.stack.borrow_mut();
        let next = match stack.as_ref() {
            Some(s) if s.contains(&window) => {
                return Err(MemoryHostError::DuplicateWindow(window));
            }
            Some(s) => s.insert_up(window),
            None => Stack::singleton(window),
        };
        debug!("open {}", window);
        *stack = Some(next);
        Ok(())
    }

    /// Remove a window; focus moves the way [`Stack::filter`] moves it.
    pub fn close(&self, window: WindowId) -> Result<(), MemoryHostError> {
        let mut stack = self.stack.borrow_mut();
        let next = match stack.as_ref() {
            Some(s) if s.contains(&window) => s.filter(|w| *w != window),
            _ => return Err(MemoryHostError::UnknownWindow(window)),
        };
        debug!("close {}", window);
        *stack = next;
        Ok(())
    }

    /// Every window in stack order.
    pub fn windows(&self) -> Vec<WindowId> {
        self.stack
            .borrow()
            .as_ref()
            .map(Stack::flatten)
            .unwrap_or_default()
    }
}

impl WindowSystem for MemoryHost {
    type Window = WindowId;
    type Error = MemoryHostError;

    fn window_stack(&self) -> Result<Option<Stack<WindowId>>, MemoryHostError> {
        Ok(self.stack.borrow().clone())
    }

    fn set_window_stack(&self, stack: Stack<WindowId>) -> Result<(), MemoryHostError> {
        let current: BTreeSet<WindowId> = self.windows().into_iter().collect();
        let proposed: BTreeSet<WindowId> = stack.flatten().into_iter().collect();
        if current != proposed || proposed.len() != stack.len() {
            return Err(MemoryHostError::Mismatch);
        }
        *self.stack.borrow_mut() = Some(stack);
        Ok(())
    }

    fn focus_window(&self, window: &WindowId) -> Result<(), MemoryHostError> {
        let mut stack = self.stack.borrow_mut();
        let next = stack
            .as_ref()
            .and_then(|s| s.focus_on(window))
            .ok_or(MemoryHostError::UnknownWindow(*window))?;
        *stack = Some(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ns: &[u64]) -> Vec<WindowId> {
        ns.iter().copied().map(WindowId).collect()
    }

    #[test]
    fn open_inserts_above_focus_and_focuses() {
        let host = MemoryHost::with_windows(ids(&[1, 2]));
        host.open(WindowId(3)).unwrap();
        assert_eq!(host.windows(), ids(&[3, 1, 2]));
        assert_eq!(host.focused_window().unwrap(), Some(WindowId(3)));
    }

    #[test]
    fn open_duplicate_fails() {
        let host = MemoryHost::with_windows(ids(&[1]));
        assert_eq!(host.open(WindowId(1)), Err(MemoryHostError::DuplicateWindow(WindowId(1))));
    }

    #[test]
    fn close_moves_focus_down() {
        let host = MemoryHost::with_windows(ids(&[1, 2, 3]));
        host.close(WindowId(1)).unwrap();
        assert_eq!(host.focused_window().unwrap(), Some(WindowId(2)));
        assert_eq!(host.close(WindowId(9)), Err(MemoryHostError::UnknownWindow(WindowId(9))));
    }

    #[test]
    fn closing_last_window_empties_workspace() {
        let host = MemoryHost::with_windows(ids(&[1]));
        host.close(WindowId(1)).unwrap();
        assert_eq!(host.window_stack().unwrap(), None);
    }

    #[test]
    fn reorder_must_keep_windows() {
        let host = MemoryHost::with_windows(ids(&[1, 2]));
        let bad = Stack::from_vec(ids(&[1, 3])).unwrap();
        assert_eq!(host.set_window_stack(bad), Err(MemoryHostError::Mismatch));
        let good = Stack::from_vec(ids(&[2, 1])).unwrap();
        host.set_window_stack(good).unwrap();
        assert_eq!(host.windows(), ids(&[2, 1]));
    }

    #[test]
    fn focus_window_keeps_order() {
        let host = MemoryHost::with_windows(ids(&[1, 2, 3]));
        host.focus_window(&WindowId(3)).unwrap();
        assert_eq!(host.windows(), ids(&[1, 2, 3]));
        assert_eq!(host.focused_window().unwrap(), Some(WindowId(3)));
    }
}

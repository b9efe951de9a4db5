//! Core traits that decouple tabgrp from any specific window system,
//! arrangement algorithm or transport mechanism.
//!
//! The [`GroupManager`](crate::manager::GroupManager) only depends on these
//! abstractions; concrete implementations live in [`host`](crate::host),
//! [`layouts`](crate::layouts), [`navigation`](crate::navigation) and
//! [`ipc`](crate::ipc).

use crate::command::{Command, Direction, LayoutMessage};
use crate::geometry::Rect;
use crate::stack::Stack;
use std::fmt;
use std::sync::mpsc;

/// Abstraction over the host window system of one workspace.
///
/// An implementation might talk to a compositor over IPC, or it might be
/// the in-memory [`MemoryHost`](crate::host::MemoryHost) used by the daemon
/// and the tests.
pub trait WindowSystem {
    /// Window identifier type.  Opaque and totally ordered.
    type Window: Ord + Clone + fmt::Debug;

    /// The error type produced by this window system.
    type Error: std::error::Error + Send + 'static;

    /// The current workspace's windows, or `None` if it has none.
    fn window_stack(&self) -> Result<Option<Stack<Self::Window>>, Self::Error>;

    /// Replace the workspace's window ordering (and focus) with `stack`.
    ///
    /// `stack` holds exactly the windows returned by
    /// [`window_stack`](WindowSystem::window_stack), reordered.
    fn set_window_stack(&self, stack: Stack<Self::Window>) -> Result<(), Self::Error>;

    /// Move input focus to `window`.
    fn focus_window(&self, window: &Self::Window) -> Result<(), Self::Error>;

    /// The focused window, if any.
    fn focused_window(&self) -> Result<Option<Self::Window>, Self::Error> {
        Ok(self.window_stack()?.map(|s| s.focus))
    }
}

/// An arrangement algorithm: turns a stack of windows into rectangles.
///
/// Used both for the outer arrangement (one rectangle per group) and for
/// the per-group inner arrangement.  Instances are immutable values; every
/// state change produces a replacement instance.
pub trait Arrangement: Clone {
    /// Place the windows of `stack` inside `area`.
    ///
    /// Returns the placements in the arrangement's own order, plus a
    /// replacement instance if running changed the arrangement's state.
    fn arrange<W: Clone + PartialEq>(
        &self,
        stack: Option<&Stack<W>>,
        area: Rect,
    ) -> (Vec<(W, Rect)>, Option<Self>);

    /// React to a message.  `None` means the message was rejected (or caused
    /// no change).
    fn handle_message(&self, msg: &LayoutMessage) -> Option<Self>;

    /// The instance obtained by cycling to the next configured variant.
    fn next_variant(&self) -> Self;
}

/// Resolves "the window in direction D" for the directional helpers.
pub trait Navigator<W> {
    /// Among `placements`, find the window lying in `direction` of `from`.
    fn neighbour(&self, placements: &[(W, Rect)], from: &W, direction: Direction) -> Option<W>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel, ...) and forward parsed commands into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{GroupMessage, WindowId};
    use std::cell::RefCell;

    //  Mock WindowSystem

    /// A test double that records every focus request made to it.
    #[derive(Debug, Default)]
    struct MockWs {
        stack: RefCell<Option<Stack<u32>>>,
        focus_log: RefCell<Vec<u32>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    struct MockError;

    impl WindowSystem for MockWs {
        type Window = u32;
        type Error = MockError;

        fn window_stack(&self) -> Result<Option<Stack<u32>>, MockError> {
            Ok(self.stack.borrow().clone())
        }

        fn set_window_stack(&self, stack: Stack<u32>) -> Result<(), MockError> {
            *self.stack.borrow_mut() = Some(stack);
            Ok(())
        }

        fn focus_window(&self, window: &u32) -> Result<(), MockError> {
            self.focus_log.borrow_mut().push(*window);
            Ok(())
        }
    }

    #[test]
    fn focused_window_defaults_to_stack_focus() {
        let ws = MockWs::default();
        assert_eq!(ws.focused_window().unwrap(), None);
        ws.set_window_stack(Stack::new(2, vec![1], vec![3])).unwrap();
        assert_eq!(ws.focused_window().unwrap(), Some(2));
    }

    #[test]
    fn mock_ws_records_focus_requests() {
        let ws = MockWs::default();
        ws.focus_window(&7).unwrap();
        assert_eq!(*ws.focus_log.borrow(), vec![7]);
    }

    //  Mock CommandSource

    /// A test double that emits a fixed sequence of commands.
    struct MockSource {
        commands: Vec<Command>,
    }

    impl CommandSource for MockSource {
        type Error = MockError;

        fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), MockError> {
            for cmd in self.commands.drain(..) {
                let _ = sink.send(cmd);
            }
            Ok(())
        }
    }

    #[test]
    fn mock_source_emits_commands() {
        let mut src = MockSource {
            commands: vec![
                Command::PullGroup(Direction::Right),
                Command::Group(GroupMessage::UnMerge(WindowId(4))),
            ],
        };
        let (tx, rx) = mpsc::channel();
        src.run(tx).unwrap();
        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0], Command::PullGroup(Direction::Right));
        assert_eq!(cmds[1], Command::Group(GroupMessage::UnMerge(WindowId(4))));
    }
}

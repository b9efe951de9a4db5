//! The orchestrator that ties the group layer, the host window system and
//! the arrangements together.
//!
//! [`GroupManager`] owns a [`Groups`] state and reacts to group messages by
//! updating it and carrying out the host-side effects it asks for.  On every
//! redraw it runs both phases around the outer arrangement.

use crate::command::{Command, Direction, GroupMessage, LayoutMessage, StackOp, WindowId};
use crate::geometry::Rect;
use crate::groups::{Groups, Outcome};
use crate::host::MemoryHost;
use crate::stack::Stack;
use crate::traits::{Arrangement, Navigator, WindowSystem};
use log::{debug, info};

/// Possible errors from the manager.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// The window system returned an error.
    #[error("window system error: {0}")]
    WindowSystem(String),
}

/// Drives one workspace's groups against a [`WindowSystem`].
///
/// The manager is generic over the host, the inner arrangement `L`, the
/// outer arrangement `O` and the [`Navigator`] used by the directional
/// helpers.
///
/// # Typical usage
///
/// ```ignore
/// let mut manager = GroupManager::new(host, Groups::new(defaults), outer, NearestNeighbour);
/// manager.redraw(screen)?;
/// manager.pull_group(Direction::Right)?;
/// let placements = manager.redraw(screen)?;
/// ```
pub struct GroupManager<H: WindowSystem, L, O, N> {
    host: H,
    groups: Groups<H::Window, L>,
    outer: O,
    navigator: N,
    last_outer: Vec<(H::Window, Rect)>,
}

impl<H, L, O, N> GroupManager<H, L, O, N>
where
    H: WindowSystem,
    L: Arrangement,
    O: Arrangement,
    N: Navigator<H::Window>,
{
    pub fn new(host: H, groups: Groups<H::Window, L>, outer: O, navigator: N) -> Self {
        Self {
            host,
            groups,
            outer,
            navigator,
            last_outer: Vec::new(),
        }
    }

    /// Return a shared reference to the host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Return a shared reference to the group state.
    pub fn groups(&self) -> &Groups<H::Window, L> {
        &self.groups
    }

    /// Return the outer arrangement.
    pub fn outer(&self) -> &O {
        &self.outer
    }

    /// Rectangles the outer arrangement gave each group on the last redraw.
    pub fn last_outer(&self) -> &[(H::Window, Rect)] {
        &self.last_outer
    }

    fn window_stack(&self) -> Result<Option<Stack<H::Window>>, ManagerError> {
        self.host
            .window_stack()
            .map_err(|e| ManagerError::WindowSystem(e.to_string()))
    }

    /// Process a single [`GroupMessage`] and apply its host-side effects.
    pub fn send(&mut self, msg: GroupMessage<H::Window>) -> Result<(), ManagerError> {
        let stack = self.window_stack()?;
        let outcome = self.groups.handle(msg, stack.as_ref());
        self.apply(outcome)
    }

    fn apply(&mut self, outcome: Outcome<H::Window>) -> Result<(), ManagerError> {
        if let Some(msg) = outcome.forward {
            match self.outer.handle_message(&msg) {
                Some(next) => self.outer = next,
                None => debug!("outer arrangement ignored {:?}", msg),
            }
        }

        if outcome.rewrite {
            if let Some(stack) = self.window_stack()? {
                if let Some(reordered) = self.groups.rewrite_host(&stack) {
                    debug!("reordering host windows");
                    self.host
                        .set_window_stack(reordered)
                        .map_err(|e| ManagerError::WindowSystem(e.to_string()))?;
                }
            }
        }

        if let Some(window) = outcome.focus {
            debug!("focus {:?}", window);
            self.host
                .focus_window(&window)
                .map_err(|e| ManagerError::WindowSystem(e.to_string()))?;
        }
        Ok(())
    }

    //  Command surface

    /// Merge the group of `dst` into the group of `src`.
    pub fn merge(&mut self, src: H::Window, dst: H::Window) -> Result<(), ManagerError> {
        self.send(GroupMessage::Merge(src, dst))
    }

    /// Take `window` out of its group.
    pub fn unmerge(&mut self, window: H::Window) -> Result<(), ManagerError> {
        self.send(GroupMessage::UnMerge(window))
    }

    /// Put every window into one group focused on `focus`.
    pub fn merge_all(&mut self, focus: H::Window) -> Result<(), ManagerError> {
        self.send(GroupMessage::MergeAll(focus))
    }

    /// Give every window its own group.
    pub fn unmerge_all(&mut self) -> Result<(), ManagerError> {
        self.send(GroupMessage::UnMergeAll)
    }

    /// Transform the stack of the group owning `window`.
    pub fn with_group(&mut self, op: StackOp, window: H::Window) -> Result<(), ManagerError> {
        self.send(GroupMessage::WithGroup(op, window))
    }

    /// Queue `msg` for the inner arrangement of the group owning `window`.
    pub fn send_to_group(&mut self, msg: LayoutMessage, window: H::Window) -> Result<(), ManagerError> {
        self.send(GroupMessage::SubMessage(msg, window))
    }

    /// Queue `msg` for every group's inner arrangement.
    pub fn broadcast(&mut self, msg: LayoutMessage) -> Result<(), ManagerError> {
        self.send(GroupMessage::Broadcast(msg))
    }

    /// Apply an arbitrary stack transform to the group owning `window`.
    pub fn transform_group(
        &mut self,
        transform: impl FnOnce(&Stack<H::Window>) -> Stack<H::Window>,
        window: H::Window,
    ) -> Result<(), ManagerError> {
        let outcome = self.groups.with_group(transform, window);
        self.apply(outcome)
    }

    /// Merge the neighbouring group into the focused window's group.
    pub fn pull_group(&mut self, dir: Direction) -> Result<(), ManagerError> {
        info!("pull group {}", dir);
        match self.neighbour(dir)? {
            Some((other, current)) => self.merge(other, current),
            None => Ok(()),
        }
    }

    /// Merge the focused window's group into the neighbouring group.
    pub fn push_group(&mut self, dir: Direction) -> Result<(), ManagerError> {
        info!("push group {}", dir);
        match self.neighbour(dir)? {
            Some((other, current)) => self.merge(current, other),
            None => Ok(()),
        }
    }

    /// Take the neighbouring window out of its group and merge the focused
    /// window's group below it.
    pub fn pull_window(&mut self, dir: Direction) -> Result<(), ManagerError> {
        info!("pull window {}", dir);
        let Some((other, current)) = self.neighbour(dir)? else {
            return Ok(());
        };
        self.unmerge(other.clone())?;
        self.reconcile()?;
        self.merge(other, current)
    }

    /// Take the focused window out of its group and merge it below the
    /// neighbouring group.
    pub fn push_window(&mut self, dir: Direction) -> Result<(), ManagerError> {
        info!("push window {}", dir);
        let Some((other, current)) = self.neighbour(dir)? else {
            return Ok(());
        };
        self.unmerge(current.clone())?;
        self.reconcile()?;
        self.merge(other, current)
    }

    /// The representative in `dir` of the focused window's group, paired
    /// with the focused window.
    fn neighbour(&self, dir: Direction) -> Result<Option<(H::Window, H::Window)>, ManagerError> {
        let focused = self
            .host
            .focused_window()
            .map_err(|e| ManagerError::WindowSystem(e.to_string()))?;
        let Some(current) = focused else {
            debug!("no focused window, nothing to do");
            return Ok(None);
        };
        let from = self
            .groups
            .table()
            .key_of(&current)
            .unwrap_or_else(|| current.clone());
        match self.navigator.neighbour(&self.last_outer, &from, dir) {
            Some(other) => Ok(Some((other, current))),
            None => {
                debug!("no group {} of {:?}", dir, from);
                Ok(None)
            }
        }
    }

    //  Redraw

    /// Sync the groups with the host and keep the host order contiguous.
    ///
    /// Returns one representative per group, in host order.
    fn reconcile(&mut self) -> Result<Option<Stack<H::Window>>, ManagerError> {
        let stack = self.window_stack()?;
        let modified = self.groups.modify_layout(stack.as_ref());
        if let Some(reordered) = modified.reorder {
            self.host
                .set_window_stack(reordered)
                .map_err(|e| ManagerError::WindowSystem(e.to_string()))?;
        }
        Ok(modified.representatives)
    }

    /// Recompute every window's placement inside `area`.
    ///
    /// Reconciles the groups with the host, keeps group members contiguous
    /// in the host order, runs the outer arrangement on one representative
    /// per group and then each group's inner arrangement.
    pub fn redraw(&mut self, area: Rect) -> Result<Vec<(H::Window, Rect)>, ManagerError> {
        let representatives = self.reconcile()?;
        let (outer, replaced) = self.outer.arrange(representatives.as_ref(), area);
        if let Some(next) = replaced {
            self.outer = next;
        }

        let placements = self.groups.redo_layout(&outer);
        self.last_outer = outer;
        Ok(placements)
    }
}

impl<L, O, N> GroupManager<MemoryHost, L, O, N>
where
    L: Arrangement,
    O: Arrangement,
    N: Navigator<WindowId>,
{
    /// Process a daemon [`Command`], including host events that drive the
    /// in-memory host.
    pub fn handle(&mut self, cmd: Command) -> Result<(), ManagerError> {
        match cmd {
            Command::Group(msg) => {
                info!("group message {:?}", msg);
                self.send(msg)
            }
            Command::PullGroup(dir) => self.pull_group(dir),
            Command::PushGroup(dir) => self.push_group(dir),
            Command::PullWindow(dir) => self.pull_window(dir),
            Command::PushWindow(dir) => self.push_window(dir),
            Command::Open(w) => {
                info!("open {}", w);
                self.host
                    .open(w)
                    .map_err(|e| ManagerError::WindowSystem(e.to_string()))
            }
            Command::Close(w) => {
                info!("close {}", w);
                self.host
                    .close(w)
                    .map_err(|e| ManagerError::WindowSystem(e.to_string()))
            }
            Command::Focus(w) => {
                info!("focus {}", w);
                self.host
                    .focus_window(&w)
                    .map_err(|e| ManagerError::WindowSystem(e.to_string()))
            }
            Command::Redraw => {
                info!("redraw");
                Ok(())
            }
        }
    }
}

//  Tests

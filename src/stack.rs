//! Focus-centred window stacks.
//!
//! A [`Stack`] is a non-empty ordered sequence with one distinguished
//! *focused* element.  Elements above the focus are stored nearest-first,
//! elements below the focus in list order, so the flattened order is
//! `up.rev() ++ [focus] ++ down`.
//!
//! Every operation is a pure value transform.  An "empty" stack is modelled
//! as `Option<Stack<W>>::None`.

use serde::{Deserialize, Serialize};

/// A focused element with the elements above and below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack<W> {
    /// The focused element.
    pub focus: W,
    /// Elements above the focus, nearest first.
    pub up: Vec<W>,
    /// Elements below the focus, in order.
    pub down: Vec<W>,
}

impl<W: Clone + PartialEq> Stack<W> {
    /// Build a stack from its three parts.
    pub fn new(focus: W, up: Vec<W>, down: Vec<W>) -> Self {
        Self { focus, up, down }
    }

    /// A stack holding only `focus`.
    pub fn singleton(focus: W) -> Self {
        Self::new(focus, Vec::new(), Vec::new())
    }

    /// Build a stack from a plain sequence, focusing the first element.
    ///
    /// Returns `None` for an empty sequence.
    pub fn from_vec(items: Vec<W>) -> Option<Self> {
        let mut iter = items.into_iter();
        let focus = iter.next()?;
        Some(Self::new(focus, Vec::new(), iter.collect()))
    }

    /// Flatten to a plain sequence in stack order.
    pub fn flatten(&self) -> Vec<W> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.up.iter().rev().cloned());
        out.push(self.focus.clone());
        out.extend(self.down.iter().cloned());
        out
    }

    /// Number of elements, focus included.
    pub fn len(&self) -> usize {
        self.up.len() + 1 + self.down.len()
    }

    /// A stack always holds its focus.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `item` is anywhere in the stack.
    pub fn contains(&self, item: &W) -> bool {
        self.focus == *item || self.up.contains(item) || self.down.contains(item)
    }

    /// Keep only the elements matching `pred`.
    ///
    /// A surviving focus stays focused.  Otherwise the focus moves to the
    /// first surviving element below it, then to the nearest surviving
    /// element above it.  Returns `None` when nothing survives.
    pub fn filter(&self, mut pred: impl FnMut(&W) -> bool) -> Option<Self> {
        let up: Vec<W> = self.up.iter().filter(|w| pred(w)).cloned().collect();
        let mut down: Vec<W> = self.down.iter().filter(|w| pred(w)).cloned().collect();
        if pred(&self.focus) {
            return Some(Self::new(self.focus.clone(), up, down));
        }
        if !down.is_empty() {
            let focus = down.remove(0);
            return Some(Self::new(focus, up, down));
        }
        let mut up = up;
        if up.is_empty() {
            return None;
        }
        let focus = up.remove(0);
        Some(Self::new(focus, up, Vec::new()))
    }

    /// Move the focus one element up, wrapping to the bottom.
    pub fn focus_up(&self) -> Self {
        if let Some((next, rest)) = self.up.split_first() {
            let mut down = Vec::with_capacity(self.down.len() + 1);
            down.push(self.focus.clone());
            down.extend(self.down.iter().cloned());
            return Self::new(next.clone(), rest.to_vec(), down);
        }
        // Wrap: the last element becomes the focus, everything else is above.
        let mut all = self.flatten();
        let Some(focus) = all.pop() else {
            return self.clone();
        };
        all.reverse();
        Self::new(focus, all, Vec::new())
    }

    /// Move the focus one element down, wrapping to the top.
    pub fn focus_down(&self) -> Self {
        if let Some((next, rest)) = self.down.split_first() {
            let mut up = Vec::with_capacity(self.up.len() + 1);
            up.push(self.focus.clone());
            up.extend(self.up.iter().cloned());
            return Self::new(next.clone(), up, rest.to_vec());
        }
        let all = self.flatten();
        let mut iter = all.into_iter();
        match iter.next() {
            Some(focus) => Self::new(focus, Vec::new(), iter.collect()),
            None => self.clone(),
        }
    }

    /// Rotate the focus onto `item`, preserving order.
    ///
    /// Returns `None` if `item` is not a member.
    pub fn focus_on(&self, item: &W) -> Option<Self> {
        let all = self.flatten();
        let idx = all.iter().position(|w| w == item)?;
        let mut up: Vec<W> = all[..idx].to_vec();
        up.reverse();
        Some(Self::new(all[idx].clone(), up, all[idx + 1..].to_vec()))
    }

    /// Focus the first element in stack order.
    pub fn focus_master(&self) -> Self {
        let all = self.flatten();
        let mut iter = all.into_iter();
        match iter.next() {
            Some(focus) => Self::new(focus, Vec::new(), iter.collect()),
            None => self.clone(),
        }
    }

    /// Swap the focus with the element above it, wrapping at the top.
    pub fn swap_up(&self) -> Self {
        match self.up.split_first() {
            Some((above, rest)) => {
                let mut down = Vec::with_capacity(self.down.len() + 1);
                down.push(above.clone());
                down.extend(self.down.iter().cloned());
                Self::new(self.focus.clone(), rest.to_vec(), down)
            }
            None => {
                let mut up = self.down.clone();
                up.reverse();
                Self::new(self.focus.clone(), up, Vec::new())
            }
        }
    }

    /// Swap the focus with the element below it, wrapping at the bottom.
    pub fn swap_down(&self) -> Self {
        match self.down.split_first() {
            Some((below, rest)) => {
                let mut up = Vec::with_capacity(self.up.len() + 1);
                up.push(below.clone());
                up.extend(self.up.iter().cloned());
                Self::new(self.focus.clone(), up, rest.to_vec())
            }
            None => {
                let mut down = self.up.clone();
                down.reverse();
                Self::new(self.focus.clone(), Vec::new(), down)
            }
        }
    }

    /// Move the focus to the top of the stack, keeping it focused.
    pub fn swap_master(&self) -> Self {
        if self.up.is_empty() {
            return self.clone();
        }
        let mut down: Vec<W> = self.up.iter().rev().cloned().collect();
        down.extend(self.down.iter().cloned());
        Self::new(self.focus.clone(), Vec::new(), down)
    }

    /// Insert `item` directly above the focus and focus it.
    pub fn insert_up(&self, item: W) -> Self {
        let mut down = Vec::with_capacity(self.down.len() + 1);
        down.push(self.focus.clone());
        down.extend(self.down.iter().cloned());
        Self::new(item, self.up.clone(), down)
    }

    /// Apply `f` to every element, keeping the shape.
    pub fn map<V>(&self, mut f: impl FnMut(&W) -> V) -> Stack<V> {
        Stack {
            focus: f(&self.focus),
            up: self.up.iter().map(&mut f).collect(),
            down: self.down.iter().map(&mut f).collect(),
        }
    }
}

/// Flatten an optional stack; `None` flattens to nothing.
pub fn flatten_opt<W: Clone + PartialEq>(stack: Option<&Stack<W>>) -> Vec<W> {
    stack.map(Stack::flatten).unwrap_or_default()
}

//  Tests

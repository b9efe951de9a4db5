//! **tabgrp**: tabbed window groups for tiling window managers.
//!
//! Windows on a workspace are partitioned into *groups*.  The outer
//! arrangement sees one representative window per group and hands each
//! group a rectangle; every group then runs its own inner arrangement
//! (tabbed by default) inside that rectangle.
//!
//! # Architecture
//!
//! The crate is organised around a few core traits:
//!
//! * [`traits::WindowSystem`] abstracts the host's window stack so the
//!   grouping logic is not coupled to any specific compositor.
//! * [`traits::Arrangement`] is implemented by both the outer and the inner
//!   arrangements; [`layouts::Cycle`] is the stock implementation.
//! * [`traits::CommandSource`] abstracts the transport that delivers
//!   user intent, so the main loop is not coupled to any IPC mechanism.
//!
//! The group state itself lives in [`groups::Groups`]; [`manager`] drives it
//! against a host, [`host`] provides an in-memory host and [`ipc`] the
//! Unix-socket command listener.

pub mod allocator;
pub mod command;
pub mod config;
pub mod geometry;
pub mod groups;
pub mod host;
pub mod ipc;
pub mod layouts;
pub mod manager;
pub mod navigation;
pub mod queue;
pub mod reconcile;
pub mod rewriter;
pub mod stack;
pub mod state;
pub mod table;
pub mod traits;

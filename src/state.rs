//! Persisted group state.
//!
//! The daemon writes its [`Groups`] state to a JSON file after every redraw
//! so that groups survive a restart.  Reading it back is forgiving: a file
//! that cannot be trusted is replaced by an empty state instead of failing.

use crate::allocator::SubLayoutDefaults;
use crate::groups::Groups;
use crate::stack::Stack;
use crate::traits::Arrangement;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Errors from reading or writing the state file.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Just the table of a persisted state, as written.
#[derive(Deserialize)]
struct RawTable<W> {
    table: Vec<Stack<W>>,
}

/// Write `groups` to `path` as JSON.
pub fn save<W, L>(groups: &Groups<W, L>, path: &Path) -> Result<(), StateError>
where
    W: Ord + Clone + Serialize,
    L: Serialize,
{
    let json = serde_json::to_string(groups)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Rebuild a [`Groups`] state from its JSON form.
///
/// Entries are re-keyed by their focus.  Malformed input, or a window that
/// shows up in two groups, yields an empty state.  The seeding defaults
/// always come from `defaults`, not from the stored state.
pub fn restore<W, L>(json: &str, defaults: SubLayoutDefaults<L>) -> Groups<W, L>
where
    W: Ord + Clone + fmt::Debug + DeserializeOwned,
    L: Arrangement + DeserializeOwned,
{
    let raw: RawTable<W> = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("ignoring malformed state: {}", e);
            return Groups::new(defaults);
        }
    };

    let mut seen = BTreeSet::new();
    let duplicated = raw
        .table
        .iter()
        .flat_map(Stack::flatten)
        .any(|w| !seen.insert(w));
    if duplicated {
        warn!("ignoring state with a window in two groups");
        return Groups::new(defaults);
    }

    match serde_json::from_str::<Groups<W, L>>(json) {
        Ok(mut groups) => {
            groups.set_defaults(defaults);
            groups
        }
        Err(e) => {
            warn!("ignoring malformed state: {}", e);
            Groups::new(defaults)
        }
    }
}

/// Read the state file at `path`.
///
/// A missing file is not an error and yields an empty state.
pub fn load<W, L>(path: &Path, defaults: SubLayoutDefaults<L>) -> Result<Groups<W, L>, StateError>
where
    W: Ord + Clone + fmt::Debug + DeserializeOwned,
    L: Arrangement + DeserializeOwned,
{
    if !path.exists() {
        info!("no state at {}, starting empty", path.display());
        return Ok(Groups::new(defaults));
    }
    let json = std::fs::read_to_string(path)?;
    Ok(restore(&json, defaults))
}

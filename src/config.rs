//! Application configuration.
//!
//! The configuration is loaded from a JSON file, by default
//! `$XDG_CONFIG_HOME/tabgrp/config.json`.  Every section is optional and
//! unknown keys are ignored, so `{}` is a valid file.
//!
//! # Example
//!
//! ```json
//! {
//!   "groups": { "layouts": ["tabbed", "column"], "advance": [0, 1] },
//!   "outer":  { "layouts": ["tall", "wide", "full"], "master": 1, "ratio": 0.5 },
//!   "screen": { "x": 0, "y": 0, "width": 1920, "height": 1080 },
//!   "state_file": "/run/user/1000/tabgrp.state.json"
//! }
//! ```

use crate::allocator::SubLayoutDefaults;
use crate::geometry::Rect;
use crate::layouts::{Cycle, Variant};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Inner arrangement of every group.
    #[serde(default)]
    pub groups: GroupConfig,

    /// Arrangement of the groups on the screen.
    #[serde(default)]
    pub outer: OuterConfig,

    /// Area the outer arrangement fills.
    #[serde(default)]
    pub screen: Rect,

    /// Where group state is persisted.  Defaults to a file next to the
    /// daemon's socket.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

/// Inner-arrangement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Variants each group cycles through, starting with the first.
    pub layouts: Vec<Variant>,
    /// How far the n-th group's fresh arrangement is advanced through
    /// `layouts`.  Groups past the end of the list start at the first
    /// variant.
    pub advance: Vec<usize>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            layouts: vec![Variant::Tabbed, Variant::Column],
            advance: Vec::new(),
        }
    }
}

/// Outer-arrangement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OuterConfig {
    pub layouts: Vec<Variant>,
    /// Number of groups in the master area.
    pub master: usize,
    /// Share of the screen the master area takes.
    pub ratio: f64,
}

impl Default for OuterConfig {
    fn default() -> Self {
        Self {
            layouts: vec![Variant::Tall, Variant::Wide, Variant::Full],
            master: 1,
            ratio: 0.5,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Seeding defaults for the groups' inner arrangements.
    pub fn sub_layout_defaults(&self) -> SubLayoutDefaults<Cycle> {
        SubLayoutDefaults::new(
            Cycle::new(self.groups.layouts.clone()),
            self.groups.advance.clone(),
        )
    }

    /// The initial outer arrangement.
    pub fn outer_layout(&self) -> Cycle {
        Cycle::new(self.outer.layouts.clone()).with_master(self.outer.master, self.outer.ratio)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "groups": { "layouts": ["tabbed", "row"], "advance": [0, 1] },
            "outer": { "layouts": ["wide"], "master": 2, "ratio": 0.6 },
            "screen": { "x": 10, "y": 20, "width": 800, "height": 600 },
            "state_file": "/tmp/tabgrp.json"
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.groups.layouts, vec![Variant::Tabbed, Variant::Row]);
        assert_eq!(cfg.groups.advance, vec![0, 1]);
        assert_eq!(cfg.outer.layouts, vec![Variant::Wide]);
        assert_eq!(cfg.outer.master, 2);
        assert_eq!(cfg.outer.ratio, 0.6);
        assert_eq!(cfg.screen, Rect::new(10, 20, 800, 600));
        assert_eq!(cfg.state_file, Some(PathBuf::from("/tmp/tabgrp.json")));
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        let gd = GroupConfig::default();
        assert_eq!(cfg.groups.layouts, gd.layouts);
        assert!(cfg.groups.advance.is_empty());
        let od = OuterConfig::default();
        assert_eq!(cfg.outer.layouts, od.layouts);
        assert_eq!(cfg.outer.master, od.master);
        assert_eq!(cfg.screen, Rect::default());
        assert_eq!(cfg.state_file, None);
    }

    #[test]
    fn deserialize_partial_outer() {
        let json = r#"{ "outer": { "ratio": 0.7 } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.outer.ratio, 0.7);
        assert_eq!(cfg.outer.layouts, OuterConfig::default().layouts);
    }

    #[test]
    fn layout_names_are_case_insensitive() {
        let json = r#"{ "groups": { "layouts": ["Tabbed", "COLUMN"] } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.groups.layouts, vec![Variant::Tabbed, Variant::Column]);
    }

    #[test]
    fn unknown_layout_name_is_an_error() {
        let json = r#"{ "groups": { "layouts": ["spiral"] } }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "groups": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn builds_layout_defaults() {
        let json = r#"{ "groups": { "layouts": ["tabbed", "column"], "advance": [1] } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        let defaults = cfg.sub_layout_defaults();
        assert_eq!(defaults.fresh(0).variant(), Variant::Column);
        assert_eq!(defaults.fresh(1).variant(), Variant::Tabbed);

        let outer = cfg.outer_layout();
        assert_eq!(outer.variant(), Variant::Tall);
        assert_eq!(outer.master(), 1);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/tabgrp/config.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}

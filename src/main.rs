//! Entry point for the **tabgrp** daemon.
//!
//! Spawns the Unix socket [`CommandSource`](tabgrp::traits::CommandSource)
//! on a background thread and processes incoming commands one at a time on
//! the main thread.  Every command is followed by a redraw; the resulting
//! placements are logged and the group state is written to the state file.

use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tabgrp::command::{Command, WindowId};
use tabgrp::config::Config;
use tabgrp::geometry::Rect;
use tabgrp::groups::Groups;
use tabgrp::host::MemoryHost;
use tabgrp::ipc::listener::UnixSocketListener;
use tabgrp::layouts::Cycle;
use tabgrp::manager::GroupManager;
use tabgrp::navigation::NearestNeighbour;
use tabgrp::state;
use tabgrp::traits::CommandSource;

type Manager = GroupManager<MemoryHost, Cycle, Cycle, NearestNeighbour>;

fn runtime_dir() -> String {
    std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into())
}

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    format!("{}/tabgrp.sock", runtime_dir())
}

/// Default location of the persisted group state.
fn default_state_path() -> PathBuf {
    PathBuf::from(runtime_dir()).join("tabgrp.state.json")
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/tabgrp`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("tabgrp")
}

/// Try to load the config from `$XDG_CONFIG_HOME/tabgrp/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn restore_groups(path: &Path, config: &Config) -> Groups<WindowId, Cycle> {
    match state::load(path, config.sub_layout_defaults()) {
        Ok(groups) => groups,
        Err(e) => {
            warn!("could not read state from {}: {}", path.display(), e);
            Groups::new(config.sub_layout_defaults())
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();
    let state_path = config.state_file.clone().unwrap_or_else(default_state_path);

    let groups = restore_groups(&state_path, &config);
    let host = MemoryHost::with_windows(groups.table().members());
    let manager = GroupManager::new(host, groups, config.outer_layout(), NearestNeighbour);

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    run_event_loop(manager, cmd_rx, &config, &state_path);
}

fn run_event_loop(mut manager: Manager, cmd_rx: mpsc::Receiver<Command>, config: &Config, state_path: &Path) {
    info!("tabgrp running");
    redraw(&mut manager, config.screen, state_path);
    for cmd in cmd_rx {
        if let Err(e) = manager.handle(cmd) {
            error!("command error: {}", e);
        }
        redraw(&mut manager, config.screen, state_path);
    }
    info!("all command sources closed, exiting");
}

fn redraw(manager: &mut Manager, screen: Rect, state_path: &Path) {
    match manager.redraw(screen) {
        Ok(placements) => {
            for (window, rect) in &placements {
                debug!(
                    "{} at {}x{}+{}+{}",
                    window, rect.width, rect.height, rect.x, rect.y
                );
            }
            info!(
                "{} window(s) in {} group(s)",
                placements.len(),
                manager.groups().table().len()
            );
        }
        Err(e) => {
            error!("redraw error: {}", e);
            return;
        }
    }
    if let Err(e) = state::save(manager.groups(), state_path) {
        warn!("could not save state to {}: {}", state_path.display(), e);
    }
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}

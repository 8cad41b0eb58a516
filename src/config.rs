//! Channel appearance and launcher settings.

use crate::constants::*;
use std::env;
use std::path::PathBuf;

/// Look of one watch window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOptions {
    pub foreground: String,
    pub background: String,
    /// Columns.
    pub width: u16,
    /// Rows.
    pub height: u16,
    /// Keep the window around after the stream ends so a crash trace stays readable.
    pub keep_open: bool,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            foreground: DEFAULT_FOREGROUND.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            keep_open: true,
        }
    }
}

impl ChannelOptions {
    pub fn colors(mut self, foreground: impl Into<String>, background: impl Into<String>) -> Self {
        self.foreground = foreground.into();
        self.background = background.into();
        self
    }

    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn keep_open(mut self, keep_open: bool) -> Self {
        self.keep_open = keep_open;
        self
    }
}

/// Which terminal hosts the window, and what runs inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Terminal emulator; `None` opens channels headless.
    pub terminal: Option<String>,
    /// Program started in window mode.
    pub viewer: PathBuf,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            terminal: Some(DEFAULT_TERMINAL.to_string()),
            viewer: PathBuf::from(DEFAULT_VIEWER),
        }
    }
}

impl LaunchConfig {
    /// Defaults overridden by `XTBUG_TERMINAL` and `XTBUG_VIEWER`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(terminal) = env::var(ENV_TERMINAL) {
            config.terminal = match terminal.trim() {
                "" | NO_TERMINAL => None,
                other => Some(other.to_string()),
            };
        }
        if let Some(viewer) = env::var_os(ENV_VIEWER) {
            config.viewer = PathBuf::from(viewer);
        }
        config
    }

    pub fn viewer(mut self, viewer: impl Into<PathBuf>) -> Self {
        self.viewer = viewer.into();
        self
    }
}

/// Directory holding the FIFOs: `XTBUG_DIR`, else the system temp dir.
pub fn pipe_dir_from_env() -> PathBuf {
    env::var_os(ENV_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
}

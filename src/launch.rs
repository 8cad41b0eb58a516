//! Spawning the terminal window that runs the watch view.

use crate::config::{ChannelOptions, LaunchConfig};
use crate::error::{Result, XtbugError};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::debug;

/// Everything a launcher needs to start the window for one channel.
#[derive(Debug, Clone, Copy)]
pub struct LaunchRequest<'a> {
    pub index: u32,
    pub dir: &'a Path,
    pub pipe: &'a Path,
    pub options: &'a ChannelOptions,
}

/// Starts the process that reads a channel.
pub trait Launcher {
    /// Returns the spawned child, or `None` when nothing was started.
    fn launch(&self, request: &LaunchRequest<'_>) -> Result<Option<Child>>;
}

/// Starts nothing; the caller attaches its own reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLauncher;

impl Launcher for NullLauncher {
    fn launch(&self, _request: &LaunchRequest<'_>) -> Result<Option<Child>> {
        Ok(None)
    }
}

/// Runs `<viewer> window <index>` inside an xterm-compatible terminal.
#[derive(Debug, Clone)]
pub struct TerminalLauncher {
    terminal: String,
    viewer: PathBuf,
}

impl TerminalLauncher {
    pub fn new(terminal: impl Into<String>, viewer: impl Into<PathBuf>) -> Self {
        Self {
            terminal: terminal.into(),
            viewer: viewer.into(),
        }
    }

    /// The full terminal command line for `request`.
    pub fn command(&self, request: &LaunchRequest<'_>) -> Command {
        let options = request.options;
        let hold = if options.keep_open { "-hold" } else { "+hold" };

        let mut cmd = Command::new(&self.terminal);
        cmd.arg("+sb") // no scrollbar
            .arg(hold)
            .arg("+aw") // no auto-wrap
            .arg("-geometry")
            .arg(format!("{}x{}", options.width, options.height))
            .arg("-bg")
            .arg(&options.background)
            .arg("-fg")
            .arg(&options.foreground)
            .arg("-T")
            .arg(request.pipe)
            .args(["+ah", "+bc", "-cr", "black", "-uc"])
            .arg("-e")
            .arg(&self.viewer)
            .arg("window")
            .arg(request.index.to_string())
            .arg("--dir")
            .arg(request.dir);
        if options.keep_open {
            cmd.arg("--hold");
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Launcher for TerminalLauncher {
    fn launch(&self, request: &LaunchRequest<'_>) -> Result<Option<Child>> {
        let child = self.command(request).spawn().map_err(XtbugError::Launch)?;
        debug!(pid = child.id(), index = request.index, "watch window spawned");
        Ok(Some(child))
    }
}

/// Launcher described by `config`.
pub fn from_config(config: &LaunchConfig) -> Box<dyn Launcher> {
    match &config.terminal {
        Some(terminal) => Box::new(TerminalLauncher::new(terminal.clone(), config.viewer.clone())),
        None => Box::new(NullLauncher),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args(cmd: &Command) -> Vec<&OsStr> {
        cmd.get_args().collect()
    }

    #[test]
    fn command_carries_geometry_colors_and_index() {
        let options = ChannelOptions::default().size(100, 40).colors("green", "black");
        let request = LaunchRequest {
            index: 4,
            dir: Path::new("/tmp"),
            pipe: Path::new("/tmp/xtbug4.pipe"),
            options: &options,
        };
        let cmd = TerminalLauncher::new("xterm", "/usr/bin/xtbug").command(&request);
        let args = args(&cmd);

        assert_eq!(cmd.get_program(), "xterm");
        assert!(args.windows(2).any(|w| w == ["-geometry", "100x40"]));
        assert!(args.windows(2).any(|w| w == ["-fg", "green"]));
        assert!(args.windows(2).any(|w| w == ["-bg", "black"]));
        assert!(args.windows(2).any(|w| w == ["-T", "/tmp/xtbug4.pipe"]));
        assert!(args.contains(&OsStr::new("-hold")));
        assert!(args.ends_with(&[
            OsStr::new("-e"),
            OsStr::new("/usr/bin/xtbug"),
            OsStr::new("window"),
            OsStr::new("4"),
            OsStr::new("--dir"),
            OsStr::new("/tmp"),
            OsStr::new("--hold"),
        ]));
    }

    #[test]
    fn closing_window_drops_hold() {
        let options = ChannelOptions::default().keep_open(false);
        let request = LaunchRequest {
            index: 0,
            dir: Path::new("/tmp"),
            pipe: Path::new("/tmp/xtbug0.pipe"),
            options: &options,
        };
        let cmd = TerminalLauncher::new("xterm", "xtbug").command(&request);
        let args = args(&cmd);
        assert!(args.contains(&OsStr::new("+hold")));
        assert!(!args.contains(&OsStr::new("--hold")));
    }

    #[test]
    fn no_terminal_means_null_launcher() {
        let config = LaunchConfig {
            terminal: None,
            ..LaunchConfig::default()
        };
        let options = ChannelOptions::default();
        let request = LaunchRequest {
            index: 0,
            dir: Path::new("/tmp"),
            pipe: Path::new("/tmp/xtbug0.pipe"),
            options: &options,
        };
        assert!(from_config(&config).launch(&request).unwrap().is_none());
    }
}

//! Channel registry for one instrumented process.

use crate::config::{self, ChannelOptions, LaunchConfig};
use crate::endpoint::Channel;
use crate::error::Result;
use crate::launch::{self, LaunchRequest, Launcher};
use crate::transport::Transport;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{info, warn};

/// Hands out channel indices and opens channels in one FIFO directory.
///
/// Indices start at 0 and grow by one per channel. Separate sessions count
/// independently, so give each its own directory when they run side by side.
pub struct Session {
    dir: PathBuf,
    next_index: AtomicU32,
    launcher: Box<dyn Launcher>,
}

impl Session {
    pub fn new(dir: impl Into<PathBuf>, launcher: impl Launcher + 'static) -> Self {
        Self::with_boxed_launcher(dir, Box::new(launcher))
    }

    pub fn with_boxed_launcher(dir: impl Into<PathBuf>, launcher: Box<dyn Launcher>) -> Self {
        Self {
            dir: dir.into(),
            next_index: AtomicU32::new(0),
            launcher,
        }
    }

    /// Directory from `XTBUG_DIR`, launcher from [`LaunchConfig::from_env`].
    pub fn from_env() -> Self {
        Self::from_launch_config(&LaunchConfig::from_env())
    }

    pub fn from_launch_config(config: &LaunchConfig) -> Self {
        Self::with_boxed_launcher(config::pipe_dir_from_env(), launch::from_config(config))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the FIFO for the next index, open it for writing and start
    /// the window that reads it.
    pub fn open_channel(&self, options: &ChannelOptions) -> Result<Channel> {
        let index = self.next_index.fetch_add(1, Ordering::SeqCst);
        let transport = Transport::create(&self.dir, index)?;

        let writer = match transport.open_writer() {
            Ok(writer) => writer,
            Err(e) => {
                discard(&transport);
                return Err(e);
            }
        };

        let request = LaunchRequest {
            index,
            dir: &self.dir,
            pipe: transport.path(),
            options,
        };
        let window = match self.launcher.launch(&request) {
            Ok(window) => window,
            Err(e) => {
                drop(writer);
                discard(&transport);
                return Err(e);
            }
        };

        info!(index, path = ?transport.path(), "channel opened");
        Ok(Channel::new(index, transport, writer, window))
    }
}

fn discard(transport: &Transport) {
    if let Err(e) = transport.remove() {
        warn!(path = ?transport.path(), "failed to remove transport: {e}");
    }
}

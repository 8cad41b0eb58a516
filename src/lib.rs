//! Realtime variable watch windows.
//!
//! An instrumented program opens [`Channel`]s from a [`Session`] and submits
//! [`Snapshot`]s of named values. Each channel is a FIFO read by a separate
//! terminal window that shows the latest snapshot. Submitting never blocks:
//! when the window lags, snapshots are dropped.
//!
//! ```no_run
//! use xtbug::{snapshot, ChannelOptions, Session};
//!
//! let session = Session::from_env();
//! let mut watch = session.open_channel(&ChannelOptions::default())?;
//! let (mut a, mut b) = (1u64, 1u64);
//! while watch.submit_all(&snapshot!(a, b)) {
//!     a += 1;
//!     b += a * 2;
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! }
//! # Ok::<(), xtbug::XtbugError>(())
//! ```

pub mod config;
pub mod constants;
pub mod endpoint;
pub mod error;
pub mod launch;
pub mod protocol;
pub mod session;
pub mod snapshot;
pub mod transport;
pub mod viewer;
pub mod window;

pub use config::{ChannelOptions, LaunchConfig};
pub use endpoint::{Channel, Delivery};
pub use error::{Result, XtbugError};
pub use launch::{Launcher, NullLauncher, TerminalLauncher};
pub use session::Session;
pub use snapshot::{Snapshot, SnapshotSource};

//! Global names, limits and defaults.

/// FIFO file name prefix; the channel index and [`PIPE_SUFFIX`] follow.
pub const PIPE_PREFIX: &str = "xtbug";
pub const PIPE_SUFFIX: &str = ".pipe";
/// Window-mode log file extension; the log sits next to the FIFO.
pub const LOG_EXTENSION: &str = "log";

// environment overrides
pub const ENV_DIR: &str = "XTBUG_DIR";
pub const ENV_TERMINAL: &str = "XTBUG_TERMINAL";
pub const ENV_VIEWER: &str = "XTBUG_VIEWER";
pub const ENV_LOG: &str = "XTBUG_LOG";

/// Terminal emulator used to host a watch window.
pub const DEFAULT_TERMINAL: &str = "xterm";
/// `XTBUG_TERMINAL=none` opens channels without spawning a window.
pub const NO_TERMINAL: &str = "none";
/// Program run inside the terminal in window mode.
pub const DEFAULT_VIEWER: &str = "xtbug";

pub const DEFAULT_FOREGROUND: &str = "white";
pub const DEFAULT_BACKGROUND: &str = "blue";
pub const DEFAULT_WIDTH: u16 = 120;
pub const DEFAULT_HEIGHT: u16 = 60;

/// Upper bound on one record's payload; larger headers mean a corrupt stream.
pub const MAX_RECORD_LEN: usize = 16 * 1024 * 1024;

/// How long the window waits on the FIFO before re-checking for Ctrl-C.
pub const POLL_INTERVAL_MS: u16 = 200;

// row layout, in terminal columns
pub const NAME_WIDTH: usize = 30;
pub const NAME_MAX_WIDTH: usize = 29;
pub const NAME_FILL_COLUMN: usize = 28;
pub const NAME_FILL: char = '.';

pub const OVERFLOW_MARKER: &str = "Error: Output line too long?";
pub const HOLD_MESSAGE: &str = "Exited! Please close this window...";

//! Window mode: the process a channel's terminal runs.

use crate::error::{Result, XtbugError};
use crate::protocol::Decoder;
use crate::transport::{Interruptible, Transport, TransportGuard};
use crate::viewer::{self, SessionEnd, Viewer};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use std::io::{self, BufReader, Stdout};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Which channel to watch.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub index: u32,
    pub dir: PathBuf,
}

/// Watch channel `config.index` until the producer goes away or Ctrl-C.
///
/// The FIFO is removed on every exit path.
pub fn run(config: &WindowConfig) -> Result<SessionEnd> {
    let transport = Transport::at(Transport::path_for(&config.dir, config.index));
    let guard = TransportGuard::new(transport);

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .map_err(|e| XtbugError::Io(io::Error::new(io::ErrorKind::Other, e)))?;

    info!(path = ?guard.transport().path(), "waiting for producer");
    let reader = guard.transport().open_reader()?;
    let mut decoder = Decoder::new(BufReader::new(Interruptible::new(reader, stop)));

    let mut viewer = Viewer::new(enter_screen);
    let result = viewer::drive(&mut decoder, &mut viewer);

    if let Some(terminal) = viewer.terminal_mut() {
        execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    }
    if let Err(e) = &result {
        error!("watch session failed: {e}");
    }
    result
}

fn enter_screen() -> io::Result<CrosstermBackend<Stdout>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    Ok(CrosstermBackend::new(stdout))
}

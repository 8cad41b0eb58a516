//! Watch window: formats snapshots and repaints only on change.

use crate::constants::{NAME_FILL, NAME_FILL_COLUMN, NAME_MAX_WIDTH, NAME_WIDTH, OVERFLOW_MARKER};
use crate::error::Result;
use crate::protocol::{Decoded, Decoder};
use crate::snapshot::Snapshot;
use ratatui::{backend::Backend, widgets::Paragraph, Terminal};
use std::io::{self, Read};
use tracing::{debug, info};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// One row: the name, a dotted leader, then the value.
///
/// Widths are display columns, so wide characters line up too. Names wider
/// than 29 columns are cut; the name column is 30 wide.
pub fn format_row(name: &str, value: &str) -> String {
    let mut used = 0;
    let name: String = name
        .chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= NAME_MAX_WIDTH
        })
        .collect();
    let name_width = name.width();

    let fill = NAME_FILL_COLUMN.saturating_sub(name_width);
    let label_width = name_width + fill + 2;
    let pad = NAME_WIDTH.saturating_sub(label_width);
    format!(
        "{name} {} {}{value}\n",
        NAME_FILL.to_string().repeat(fill),
        " ".repeat(pad)
    )
}

/// All rows of `snapshot`, in name order.
pub fn format_snapshot(snapshot: &Snapshot) -> String {
    snapshot
        .iter()
        .map(|(name, value)| format_row(name, value))
        .collect()
}

/// `text` if it fits a `width` x `height` screen, otherwise the overflow marker.
pub fn fit(text: &str, width: u16, height: u16) -> &str {
    let mut rows = 0usize;
    for line in text.lines() {
        rows += 1;
        if rows > height as usize || line.width() > width as usize {
            return OVERFLOW_MARKER;
        }
    }
    text
}

/// The frame currently on screen. Only the latest one matters.
#[derive(Debug, Default)]
pub struct DisplayState {
    shown: String,
    repaints: u64,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` as shown. `false` when it is empty or already on screen.
    pub fn update(&mut self, text: String) -> bool {
        if text.is_empty() || text == self.shown {
            return false;
        }
        self.shown = text;
        self.repaints += 1;
        true
    }

    pub fn shown(&self) -> &str {
        &self.shown
    }

    pub fn repaints(&self) -> u64 {
        self.repaints
    }
}

type Connect<B> = Box<dyn FnMut() -> io::Result<B>>;

/// Paints snapshots onto a terminal.
///
/// The terminal is attached on the first repaint, so a stream that ends
/// before any data arrives never takes over the screen.
pub struct Viewer<B: Backend> {
    connect: Connect<B>,
    terminal: Option<Terminal<B>>,
    state: DisplayState,
}

impl<B: Backend> Viewer<B> {
    pub fn new(connect: impl FnMut() -> io::Result<B> + 'static) -> Self {
        Self {
            connect: Box::new(connect),
            terminal: None,
            state: DisplayState::new(),
        }
    }

    /// Show `snapshot`; returns whether the screen was repainted.
    pub fn show(&mut self, snapshot: &Snapshot) -> Result<bool> {
        if !self.state.update(format_snapshot(snapshot)) {
            return Ok(false);
        }

        if self.terminal.is_none() {
            let backend = (self.connect)()?;
            self.terminal = Some(Terminal::new(backend)?);
        }

        if let Some(terminal) = self.terminal.as_mut() {
            let text = self.state.shown();
            terminal.clear()?;
            terminal.draw(|frame| {
                let area = frame.size();
                let body = fit(text, area.width, area.height);
                frame.render_widget(Paragraph::new(body), area);
            })?;
        }
        Ok(true)
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn terminal(&self) -> Option<&Terminal<B>> {
        self.terminal.as_ref()
    }

    pub fn terminal_mut(&mut self) -> Option<&mut Terminal<B>> {
        self.terminal.as_mut()
    }
}

/// How a watch session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The producer closed its end.
    Closed,
    /// Ctrl-C.
    Interrupted,
}

/// Decode one record per iteration and show it until the stream stops.
///
/// A malformed record ends the session with an error; there is no way to
/// find the next record boundary after one.
pub fn drive<R: Read, B: Backend>(
    decoder: &mut Decoder<R>,
    viewer: &mut Viewer<B>,
) -> Result<SessionEnd> {
    loop {
        match decoder.next_record()? {
            Decoded::Snapshot(snapshot) => {
                if viewer.show(&snapshot)? {
                    debug!(entries = snapshot.len(), "repainted");
                }
            }
            Decoded::EndOfStream => {
                info!(repaints = viewer.state().repaints(), "stream closed");
                return Ok(SessionEnd::Closed);
            }
            Decoded::Interrupted => {
                info!(repaints = viewer.state().repaints(), "interrupted");
                return Ok(SessionEnd::Interrupted);
            }
        }
    }
}

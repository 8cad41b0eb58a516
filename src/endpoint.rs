//! Producer side of a watch channel.

use crate::protocol;
use crate::snapshot::{Snapshot, SnapshotSource};
use crate::transport::Transport;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::Child;
use std::thread;
use tracing::{debug, info, warn};

/// Outcome of one submission. Neither variant is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The record is in the pipe, or its tail is owed and will go out first
    /// on the next submission.
    Queued,
    /// The pipe was full (or the channel closed); the snapshot is gone.
    Dropped,
}

/// Write side of one channel, owned by the instrumented program.
///
/// Submissions never block: when the window falls behind, snapshots are
/// dropped and the window catches up with whatever arrives next.
pub struct Channel {
    index: u32,
    transport: Transport,
    writer: Option<File>,
    /// Unwritten tail of a record the kernel accepted only in part.
    pending: Vec<u8>,
    window: Option<Child>,
}

impl Channel {
    pub(crate) fn new(index: u32, transport: Transport, writer: File, window: Option<Child>) -> Self {
        Self {
            index,
            transport,
            writer: Some(writer),
            pending: Vec::new(),
            window,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn path(&self) -> &Path {
        self.transport.path()
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Send one snapshot, best effort.
    pub fn submit(&mut self, snapshot: &Snapshot) -> Delivery {
        let Some(writer) = self.writer.as_mut() else {
            return Delivery::Dropped;
        };

        // a torn record must be finished before anything else goes out
        if !flush_pending(writer, &mut self.pending) {
            return Delivery::Dropped;
        }

        let record = match protocol::encode_record(snapshot) {
            Ok(record) => record,
            Err(e) => {
                debug!(index = self.index, "snapshot not encodable: {e}");
                return Delivery::Dropped;
            }
        };

        match writer.write(&record) {
            Ok(n) if n == record.len() => Delivery::Queued,
            Ok(0) => Delivery::Dropped,
            Ok(n) => {
                self.pending = record[n..].to_vec();
                Delivery::Queued
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => Delivery::Dropped,
            Err(e) => {
                debug!(index = self.index, "write failed: {e}");
                Delivery::Dropped
            }
        }
    }

    /// Send only the listed names from `source`; unknown names are skipped.
    pub fn submit_named<S, N>(&mut self, source: &S, names: &[N]) -> Delivery
    where
        S: SnapshotSource + ?Sized,
        N: AsRef<str>,
    {
        self.submit(&Snapshot::select(source, names))
    }

    /// Send every binding in `source`. Always `true`, so it can sit in a
    /// loop condition: `while channel.submit_all(&snapshot!(a, b)) { .. }`.
    pub fn submit_all<S: SnapshotSource + ?Sized>(&mut self, source: &S) -> bool {
        let snapshot: Snapshot = source.bindings().into_iter().collect();
        self.submit(&snapshot);
        true
    }

    /// Release the write side. The window sees end of stream once it has
    /// drained what is buffered. Safe to call more than once.
    pub fn close(&mut self) {
        let Some(writer) = self.writer.take() else {
            return;
        };
        if !self.pending.is_empty() {
            debug!(
                index = self.index,
                bytes = self.pending.len(),
                "discarding unsent record tail"
            );
            self.pending.clear();
        }
        drop(writer);

        if let Some(child) = self.window.take() {
            reap(self.index, child);
        }
        info!(index = self.index, "channel closed");
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Collect the terminal's exit status without making `close` wait for it.
fn reap(index: u32, mut child: Child) {
    match child.try_wait() {
        Ok(Some(status)) => debug!(index, %status, "window already exited"),
        Ok(None) => {
            let spawned = thread::Builder::new()
                .name(format!("xtbug-reap-{index}"))
                .spawn(move || match child.wait() {
                    Ok(status) => debug!(index, %status, "window exited"),
                    Err(e) => debug!(index, "waiting for window failed: {e}"),
                });
            if let Err(e) = spawned {
                warn!(index, "cannot reap window process: {e}");
            }
        }
        Err(e) => debug!(index, "window status unavailable: {e}"),
    }
}

/// Push out as much of `pending` as the pipe takes. `true` once it is empty.
fn flush_pending(writer: &mut File, pending: &mut Vec<u8>) -> bool {
    while !pending.is_empty() {
        match writer.write(pending) {
            Ok(0) => return false,
            Ok(n) => {
                pending.drain(..n);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => return false,
        }
    }
    true
}

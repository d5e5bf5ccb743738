//! Progress reporting for the acquisition and provisioning pipelines.
//!
//! Core crates never print or touch shared output state; they emit
//! human-readable lines through a [`ProgressSink`]. The caller decides
//! where those lines go (stdout, a log, a channel feeding a UI).

use std::sync::Mutex;

use tokio::sync::mpsc;

/// Receives human-readable progress lines from a pipeline.
pub trait ProgressSink: Send + Sync {
    /// Emits one line of progress output.
    fn line(&self, message: &str);
}

/// Prints progress lines to stdout.
pub struct StdoutSink;

impl ProgressSink for StdoutSink {
    fn line(&self, message: &str) {
        println!("{message}");
    }
}

/// Forwards progress lines to the `tracing` subscriber at info level.
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn line(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Discards all progress lines.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn line(&self, _message: &str) {}
}

/// Sends progress lines over an unbounded channel.
///
/// Useful for embedding the pipelines behind a UI event loop. Lines are
/// dropped once the receiver is gone.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    /// Creates a sink and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn line(&self, message: &str) {
        let _ = self.tx.send(message.to_string());
    }
}

/// Collects progress lines in memory, for assertions in tests.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all collected lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ProgressSink for MemorySink {
    fn line(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

//! Resolution progress events
//!
//! Progress is reported as messages over a channel to a single consumer. The
//! sending side never blocks and never fails the sender: a dropped receiver
//! simply discards further events.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Resolution stage a progress event was emitted at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveStage {
    /// Primary source is being queried
    Primary,
    /// Primary source failed, querying the fallback base source
    Fallback,
    /// Fallback succeeded, enrichment sources are being queried
    Enriching,
}

impl std::fmt::Display for ResolveStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveStage::Primary => write!(f, "Primary"),
            ResolveStage::Fallback => write!(f, "Fallback"),
            ResolveStage::Enriching => write!(f, "Enriching"),
        }
    }
}

/// A "still working" status update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub title_id: String,
    pub stage: ResolveStage,
    pub status: String,
}

impl ProgressEvent {
    pub fn new(title_id: impl Into<String>, stage: ResolveStage, status: impl Into<String>) -> Self {
        Self {
            title_id: title_id.into(),
            stage,
            status: status.into(),
        }
    }
}

/// Non-blocking sending half of a progress channel
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

/// Create a progress channel with a single consumer
pub fn progress_channel() -> (ProgressSender, mpsc::UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, rx)
}

impl ProgressSender {
    /// Fire-and-forget delivery
    pub fn notify(&self, event: ProgressEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("Progress consumer gone, dropping event: {:?}", e.0.stage);
        }
    }
}

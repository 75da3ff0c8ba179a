use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::DiaryError;

/// Where an in-flight upload will land once normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingUpload {
    /// A manual photo for one grid cell.
    Cell { date: String, row_id: String },
    /// The photo attached to a new log entry.
    LogPhoto { date: String, meal: String },
}

impl PendingUpload {
    pub fn date(&self) -> &str {
        match self {
            Self::Cell { date, .. } | Self::LogPhoto { date, .. } => date,
        }
    }
}

/// Single pending-upload slot. Only one image may be normalized at a time;
/// bumping the generation invalidates whatever is currently running.
#[derive(Debug, Default)]
pub struct UploadSlot {
    pending: Mutex<Option<(u64, PendingUpload)>>,
    generation: AtomicU64,
}

/// Held for the duration of one upload. Dropping it frees the slot.
#[derive(Debug)]
pub struct UploadTicket {
    slot: Arc<UploadSlot>,
    generation: u64,
    target: PendingUpload,
}

impl UploadSlot {
    pub fn begin(self: &Arc<Self>, target: PendingUpload) -> Result<UploadTicket, DiaryError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| anyhow::anyhow!("upload slot lock poisoned"))?;
        if let Some((_, busy)) = pending.as_ref() {
            debug!(busy = ?busy, "upload slot busy");
            return Err(DiaryError::UploadBusy);
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *pending = Some((generation, target.clone()));
        Ok(UploadTicket {
            slot: Arc::clone(self),
            generation,
            target,
        })
    }

    /// Supersedes the pending upload, if any. Returns what it was for.
    pub fn cancel(&self) -> Option<PendingUpload> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let taken = self.pending.lock().ok()?.take().map(|(_, target)| target);
        if let Some(target) = &taken {
            info!(date = %target.date(), ?target, "pending upload superseded");
        }
        taken
    }

    pub fn pending(&self) -> Option<PendingUpload> {
        self.pending
            .lock()
            .ok()
            .and_then(|p| p.as_ref().map(|(_, target)| target.clone()))
    }
}

impl UploadTicket {
    pub fn target(&self) -> &PendingUpload {
        &self.target
    }

    /// Fails with `Superseded` once a newer generation has started.
    pub fn ensure_current(&self) -> Result<(), DiaryError> {
        if self.slot.generation.load(Ordering::SeqCst) == self.generation {
            Ok(())
        } else {
            Err(DiaryError::Superseded)
        }
    }
}

impl Drop for UploadTicket {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.slot.pending.lock() {
            // a cancelled ticket must not clear its successor
            if matches!(pending.as_ref(), Some((g, _)) if *g == self.generation) {
                *pending = None;
            }
        }
    }
}

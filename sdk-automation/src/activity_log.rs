//! User-facing activity log.
//!
//! Every line is emitted as a tracing event and buffered so it can be appended
//! to the iteration's `logs.txt` blob. Scopes nest as `outer - inner - message`.

use crate::storage::{BlobStorage, StorageError};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct Buffer {
    lines: Vec<String>,
    flushed: usize,
}

/// Shared, append-only log buffer with a scope prefix.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    buffer: Arc<Mutex<Buffer>>,
    prefix: String,
}

impl ActivityLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle writing to the same buffer with `scope` added to the prefix.
    #[must_use]
    pub fn scoped(&self, scope: impl AsRef<str>) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            prefix: format!("{}{} - ", self.prefix, scope.as_ref()),
        }
    }

    /// Logs an informational line.
    pub fn info(&self, message: impl AsRef<str>) {
        let line = self.push(message.as_ref());
        info!("{line}");
    }

    /// Logs a warning line.
    pub fn warn(&self, message: impl AsRef<str>) {
        let line = self.push(&format!("Warning: {}", message.as_ref()));
        warn!("{line}");
    }

    /// Logs an error line.
    pub fn error(&self, message: impl AsRef<str>) {
        let line = self.push(&format!("Error: {}", message.as_ref()));
        error!("{line}");
    }

    /// Returns every buffered line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    /// Returns true when any buffered line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().lines.iter().any(|line| line.contains(needle))
    }

    /// Appends lines not yet written to `path` in `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the append fails; the lines stay pending.
    pub async fn flush_to(
        &self,
        storage: &dyn BlobStorage,
        path: &str,
    ) -> Result<(), StorageError> {
        let (pending, end) = {
            let buffer = self.lock();
            let pending: String = buffer.lines[buffer.flushed..]
                .iter()
                .map(|line| format!("{line}\n"))
                .collect();
            (pending, buffer.lines.len())
        };

        if pending.is_empty() {
            return Ok(());
        }

        storage.append(path, pending.as_bytes()).await?;
        let mut buffer = self.lock();
        buffer.flushed = buffer.flushed.max(end);
        Ok(())
    }

    fn push(&self, message: &str) -> String {
        let line = format!("{}{message}", self.prefix);
        self.lock().lines.push(line.clone());
        line
    }

    fn lock(&self) -> MutexGuard<'_, Buffer> {
        // A poisoned buffer still holds valid lines.
        self.buffer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

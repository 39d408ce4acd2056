use std::sync::{Arc, Mutex, PoisonError};

use crate::host::{Host, LogBuffer};

/// Handle to the host's URL log buffer, created on first use and
/// re-created whenever the host has closed it since.
#[derive(Default)]
pub struct UrlBuffer {
    current: Mutex<Option<Arc<dyn LogBuffer>>>,
}

impl UrlBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, host: &dyn Host) -> anyhow::Result<Arc<dyn LogBuffer>> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(buffer) = current.as_ref()
            && buffer.is_open()
        {
            return Ok(Arc::clone(buffer));
        }

        let fresh = host.open_log_buffer()?;
        *current = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// Append `line`, logging instead of failing when the buffer is unusable.
    pub fn print(&self, host: &dyn Host, line: &str) {
        let result = self
            .get_or_create(host)
            .and_then(|buffer| buffer.print(line));
        if let Err(e) = result {
            tracing::warn!(error = %e, "cannot write to URL buffer");
        }
    }

    pub fn close(&self) {
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(buffer) = previous {
            buffer.close();
        }
    }
}

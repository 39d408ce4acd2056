use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::host::{Host, LogBuffer, Target};
use crate::links::ServerChannel;

/// In-memory host that records everything the pipeline asks of it.
pub(crate) struct RecordingHost {
    sent: Mutex<Vec<String>>,
    printed: Mutex<Vec<String>>,
    lines: Arc<Mutex<Vec<String>>>,
    buffers: Mutex<Vec<Arc<MemoryBuffer>>>,
    opened: AtomicUsize,
    pub(crate) reachable: AtomicBool,
}

pub(crate) struct MemoryBuffer {
    lines: Arc<Mutex<Vec<String>>>,
    open: AtomicBool,
}

impl LogBuffer for MemoryBuffer {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn print(&self, line: &str) -> anyhow::Result<()> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

impl RecordingHost {
    pub(crate) fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            printed: Mutex::new(Vec::new()),
            lines: Arc::new(Mutex::new(Vec::new())),
            buffers: Mutex::new(Vec::new()),
            opened: AtomicUsize::new(0),
            reachable: AtomicBool::new(true),
        }
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn printed(&self) -> Vec<String> {
        self.printed.lock().unwrap().clone()
    }

    pub(crate) fn buffer_lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub(crate) fn buffers_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn close_buffers(&self) {
        for buffer in self.buffers.lock().unwrap().iter() {
            buffer.close();
        }
    }
}

#[async_trait]
impl Host for RecordingHost {
    fn resolve_target(&self, srvchan: &ServerChannel) -> Option<Target> {
        self.reachable
            .load(Ordering::SeqCst)
            .then(|| Target::new(&srvchan.server, &srvchan.channel))
    }

    async fn send(&self, _target: &Target, text: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn print(&self, _target: &Target, line: &str) -> anyhow::Result<()> {
        self.printed.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn own_nick(&self, _server: &str) -> Option<String> {
        Some("me".into())
    }

    fn open_log_buffer(&self) -> anyhow::Result<Arc<dyn LogBuffer>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let buffer = Arc::new(MemoryBuffer {
            lines: Arc::clone(&self.lines),
            open: AtomicBool::new(true),
        });
        self.buffers.lock().unwrap().push(Arc::clone(&buffer));
        Ok(buffer)
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use urltitel::host::{Host, LogBuffer, Target};
use urltitel::links::ServerChannel;

/// One thing the pipeline asked the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Sent { target: Target, text: String },
    Printed { target: Target, line: String },
}

/// Host double that answers for one nick, resolves every target and keeps
/// a log of sends, prints and URL-buffer lines.
pub struct RecordingHost {
    nick: Option<String>,
    outputs: Mutex<Vec<Output>>,
    buffer: Arc<SharedBuffer>,
}

#[derive(Default)]
pub struct SharedBuffer {
    lines: Mutex<Vec<String>>,
    open: AtomicBool,
}

struct BufferView(Arc<SharedBuffer>);

impl LogBuffer for BufferView {
    fn is_open(&self) -> bool {
        self.0.open.load(Ordering::SeqCst)
    }

    fn print(&self, line: &str) -> anyhow::Result<()> {
        self.0.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn close(&self) {
        self.0.open.store(false, Ordering::SeqCst);
    }
}

impl RecordingHost {
    pub fn new(nick: Option<&str>) -> Self {
        Self {
            nick: nick.map(str::to_string),
            outputs: Mutex::new(Vec::new()),
            buffer: Arc::new(SharedBuffer::default()),
        }
    }

    pub fn outputs(&self) -> Vec<Output> {
        self.outputs.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.outputs()
            .into_iter()
            .filter_map(|o| match o {
                Output::Sent { text, .. } => Some(text),
                Output::Printed { .. } => None,
            })
            .collect()
    }

    pub fn printed(&self) -> Vec<String> {
        self.outputs()
            .into_iter()
            .filter_map(|o| match o {
                Output::Printed { line, .. } => Some(line),
                Output::Sent { .. } => None,
            })
            .collect()
    }

    pub fn buffer_lines(&self) -> Vec<String> {
        self.buffer.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for RecordingHost {
    fn resolve_target(&self, srvchan: &ServerChannel) -> Option<Target> {
        Some(Target::new(&srvchan.server, &srvchan.channel))
    }

    async fn send(&self, target: &Target, text: &str) -> anyhow::Result<()> {
        self.outputs.lock().unwrap().push(Output::Sent {
            target: target.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn print(&self, target: &Target, line: &str) -> anyhow::Result<()> {
        self.outputs.lock().unwrap().push(Output::Printed {
            target: target.clone(),
            line: line.to_string(),
        });
        Ok(())
    }

    fn own_nick(&self, _server: &str) -> Option<String> {
        self.nick.clone()
    }

    fn open_log_buffer(&self) -> anyhow::Result<Arc<dyn LogBuffer>> {
        self.buffer.open.store(true, Ordering::SeqCst);
        Ok(Arc::new(BufferView(Arc::clone(&self.buffer))))
    }
}

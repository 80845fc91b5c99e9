use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::path;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::Context as _;
use anyhow::Result;
use chrono::Local;
use tracing::field::Field;
use tracing::field::Visit;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

const LOG_BUFFER_CAPACITY: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: String,
    pub level: Level,
    pub message: String,
}

/// Most recent log lines, shared between the tracing layer and the Log pane.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<LogLine>>>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> LogBuffer {
        return LogBuffer::with_capacity(LOG_BUFFER_CAPACITY);
    }
}

impl LogBuffer {
    pub fn with_capacity(capacity: usize) -> LogBuffer {
        return LogBuffer {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        };
    }

    pub fn push(&self, line: LogLine) {
        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() >= self.capacity {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    /// The last `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<LogLine> {
        if let Ok(lines) = self.lines.lock() {
            let skip = lines.len().saturating_sub(count);
            return lines.iter().skip(skip).cloned().collect();
        }

        return vec![];
    }

    pub fn len(&self) -> usize {
        return self.lines.lock().map(|lines| lines.len()).unwrap_or(0);
    }

    pub fn is_empty(&self) -> bool {
        return self.len() == 0;
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

pub struct LogBufferLayer {
    buffer: LogBuffer,
}

impl LogBufferLayer {
    pub fn new(buffer: LogBuffer) -> LogBufferLayer {
        return LogBufferLayer { buffer };
    }
}

impl<S: Subscriber> Layer<S> for LogBufferLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut message = visitor.message;
        if !visitor.fields.is_empty() {
            if !message.is_empty() {
                message.push(' ');
            }
            message.push_str(&visitor.fields.join(" "));
        }

        self.buffer.push(LogLine {
            timestamp: Local::now().format("%F %H:%M:%S%.3f").to_string(),
            level: *event.metadata().level(),
            message,
        });
    }
}

/// Routes tracing output to the JSON log file and the in-app log buffer.
/// The returned guard flushes the file writer when dropped.
pub fn init(log_file: &str, log_level: &str, buffer: LogBuffer) -> Result<WorkerGuard> {
    let level = log_level
        .parse::<LevelFilter>()
        .with_context(|| format!("invalid log level '{log_level}'"))?;

    let log_path = path::PathBuf::from(log_file);
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => path::PathBuf::from("."),
    };
    let file_name = log_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "ptui.log".into());

    fs::create_dir_all(&directory)
        .with_context(|| format!("failed to create log directory {}", directory.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_fmt::layer()
        .json()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(LogBufferLayer::new(buffer).with_filter(level))
        .try_init()?;

    return Ok(guard);
}

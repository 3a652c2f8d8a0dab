/*!
sink.rs - the append-only terminal log.

Lines are produced by the dispatcher (and by independent submission tasks),
sent as batches over one mpsc channel, and appended by a single writer task.
A batch is always appended contiguously; batches from different submissions
land in whatever order they were sent.

Sinks:
  - StdoutSink : styled text (NO_COLOR aware) or JSON lines (`--json`)
  - MemorySink : keeps lines (tests only)
*/

use serde::Serialize;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::cmd::format::{Role, StyleOptions, color};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// `$ <raw input>`
    Echo,
    /// Rendered service reply
    Output,
    /// Transport failure detail
    Error,
    /// Locally produced notice (unknown command, session banner)
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayLine {
    pub kind: LineKind,
    pub text: String,
}

impl DisplayLine {
    pub fn echo(raw: &str) -> Self {
        Self {
            kind: LineKind::Echo,
            text: format!("$ {raw}"),
        }
    }

    pub fn output(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Output,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Error,
            text: text.into(),
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Notice,
            text: text.into(),
        }
    }
}

/// Destination of the ordered log.
pub trait LineSink: Send {
    fn append(&mut self, line: &DisplayLine) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub type LogReceiver = mpsc::UnboundedReceiver<Vec<DisplayLine>>;

/// Cloneable handle used to push lines into the log.
#[derive(Debug, Clone)]
pub struct LogSender {
    tx: mpsc::UnboundedSender<Vec<DisplayLine>>,
}

impl LogSender {
    pub fn channel() -> (LogSender, LogReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (LogSender { tx }, rx)
    }

    pub fn emit(&self, line: DisplayLine) {
        self.emit_batch(vec![line]);
    }

    pub fn emit_batch(&self, lines: Vec<DisplayLine>) {
        if lines.is_empty() {
            return;
        }
        if self.tx.send(lines).is_err() {
            trace!("log writer gone; dropping lines");
        }
    }
}

/// Drain `rx` into `sink` until every sender is dropped, then hand the sink back.
pub fn spawn_writer<S>(mut rx: LogReceiver, mut sink: S) -> JoinHandle<io::Result<S>>
where
    S: LineSink + 'static,
{
    tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            for line in &batch {
                sink.append(line)?;
            }
            sink.flush()?;
        }
        Ok(sink)
    })
}

/* ---- Sinks ---- */

pub struct StdoutSink {
    style: StyleOptions,
    json: bool,
    out: io::Stdout,
}

impl StdoutSink {
    pub fn new(style: StyleOptions, json: bool) -> Self {
        Self {
            style,
            json,
            out: io::stdout(),
        }
    }
}

impl LineSink for StdoutSink {
    fn append(&mut self, line: &DisplayLine) -> io::Result<()> {
        let mut out = self.out.lock();
        if self.json {
            let encoded = serde_json::to_string(line).map_err(io::Error::other)?;
            return writeln!(out, "{encoded}");
        }
        writeln!(out, "{}", styled(line, &self.style))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.lock().flush()
    }
}

fn styled(line: &DisplayLine, style: &StyleOptions) -> String {
    match line.kind {
        LineKind::Echo => color(Role::Dim, &line.text, style),
        LineKind::Error => color(Role::Error, &line.text, style),
        LineKind::Notice => color(Role::Warning, &line.text, style),
        LineKind::Output => line.text.clone(),
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: Vec<DisplayLine>,
}

#[cfg(test)]
impl MemorySink {
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

#[cfg(test)]
impl LineSink for MemorySink {
    fn append(&mut self, line: &DisplayLine) -> io::Result<()> {
        self.lines.push(line.clone());
        Ok(())
    }
}

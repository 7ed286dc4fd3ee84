//! Output sinks — where a session's transcript goes.
//!
//! The session emits the user's input, each assistant reply, and a notice
//! for every failed exchange. [`ConsoleSink`] writes the classic
//! `Usuario:` / `Asistente:` transcript; [`RecordingSink`] keeps events in
//! memory for tests and embedding.

use std::io::Write;

use cardchat_core::failure::FailureKind;

/// Receives the visible side of a conversation.
pub trait OutputSink: Send {
    /// The user's input, before it is sent.
    fn user(&mut self, text: &str);

    /// A successful assistant reply.
    fn assistant(&mut self, text: &str);

    /// A user-facing message for a failed exchange.
    fn notice(&mut self, kind: FailureKind, text: &str);
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn user(&mut self, text: &str) {
        (**self).user(text);
    }

    fn assistant(&mut self, text: &str) {
        (**self).assistant(text);
    }

    fn notice(&mut self, kind: FailureKind, text: &str) {
        (**self).notice(kind, text);
    }
}

/// Labels used by [`ConsoleSink`].
#[derive(Debug, Clone)]
pub struct TranscriptLabels {
    pub user: String,
    pub assistant: String,
}

impl Default for TranscriptLabels {
    fn default() -> Self {
        Self {
            user: "Usuario".into(),
            assistant: "Asistente".into(),
        }
    }
}

/// Writes a plain-text transcript to any writer (stdout in the CLI).
pub struct ConsoleSink<W: Write + Send> {
    out: W,
    labels: TranscriptLabels,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            labels: TranscriptLabels::default(),
        }
    }

    pub fn with_labels(mut self, labels: TranscriptLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, label: &str, text: &str, blank_before: bool) {
        let result = if blank_before {
            writeln!(self.out, "\n{label}: {text}")
        } else {
            writeln!(self.out, "{label}: {text}")
        };
        if let Err(e) = result.and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to write transcript: {e}");
        }
    }
}

impl<W: Write + Send> OutputSink for ConsoleSink<W> {
    fn user(&mut self, text: &str) {
        let label = self.labels.user.clone();
        self.line(&label, text, true);
    }

    fn assistant(&mut self, text: &str) {
        let label = self.labels.assistant.clone();
        self.line(&label, text, false);
    }

    fn notice(&mut self, _kind: FailureKind, text: &str) {
        let label = self.labels.assistant.clone();
        self.line(&label, text, false);
    }
}

/// One event captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    User(String),
    Assistant(String),
    Notice(FailureKind, String),
}

/// Keeps every event in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices only, in order.
    pub fn notices(&self) -> Vec<(FailureKind, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Notice(kind, text) => Some((*kind, text.clone())),
                _ => None,
            })
            .collect()
    }

    /// Assistant replies only, in order.
    pub fn replies(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Assistant(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl OutputSink for RecordingSink {
    fn user(&mut self, text: &str) {
        self.events.push(SinkEvent::User(text.to_string()));
    }

    fn assistant(&mut self, text: &str) {
        self.events.push(SinkEvent::Assistant(text.to_string()));
    }

    fn notice(&mut self, kind: FailureKind, text: &str) {
        self.events.push(SinkEvent::Notice(kind, text.to_string()));
    }
}

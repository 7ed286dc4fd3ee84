//! The cardchat conversation layer.
//!
//! A [`ChatSession`] owns a bounded [`HistoryStore`] and runs one exchange at
//! a time against a provider:
//!
//! 1. **Render** the system instruction, prior turns, and new input
//! 2. **Send** the request and wait for a single reply
//! 3. **Record** the exchange, or turn the failure into a user-facing notice
//!
//! Output goes through an [`OutputSink`], so the same session drives the
//! console transcript and the tests.

pub mod history;
pub mod prompt;
pub mod script;
pub mod session;
pub mod sink;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use history::{DEFAULT_MAX_TURNS, HistoryStore};
pub use prompt::{PromptTemplate, SALES_ASSISTANT_PROMPT};
pub use script::{DEMO_SCRIPT, demo_script, load_script, parse_script};
pub use session::{ChatSession, ExchangeOutcome, ScriptReport};
pub use sink::{ConsoleSink, OutputSink, RecordingSink, SinkEvent, TranscriptLabels};

//! Chat session — one request/response exchange at a time over a bounded history.
//!
//! Each call to [`ChatSession::converse`]:
//!
//! 1. **Re-checks** the history bound
//! 2. **Renders** system instruction + history + user input
//! 3. **Sends** the request to the configured provider and waits for one reply
//! 4. **On success**: emits the reply, appends the exchange to history
//! 5. **On failure**: leaves history alone, classifies the error, emits a notice
//!
//! Failures never escape a session; the next call starts from the last
//! successful state.

use std::sync::Arc;
use std::time::Duration;

use cardchat_config::AppConfig;
use cardchat_core::error::ProviderError;
use cardchat_core::failure::{FailureKind, classify_provider_error};
use cardchat_core::provider::{Provider, ProviderRequest, Usage};
use tracing::{debug, error, info, warn};

use crate::history::HistoryStore;
use crate::prompt::PromptTemplate;
use crate::sink::OutputSink;

/// The result of one exchange, as seen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    /// The model answered; the exchange is now part of the history.
    Replied {
        text: String,
        usage: Option<Usage>,
    },
    /// The call failed; history is unchanged.
    Failed {
        kind: FailureKind,
        notice: &'static str,
    },
}

impl ExchangeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExchangeOutcome::Replied { .. })
    }

    /// The reply text, if the exchange succeeded.
    pub fn reply(&self) -> Option<&str> {
        match self {
            ExchangeOutcome::Replied { text, .. } => Some(text),
            ExchangeOutcome::Failed { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExchangeOutcome::Replied { .. } => None,
            ExchangeOutcome::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// Tally of a scripted run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub replied: usize,
    pub rate_limited: usize,
    pub invalid_credential: usize,
    pub other_failures: usize,
    pub total_tokens: u64,
}

impl ScriptReport {
    fn record(&mut self, outcome: &ExchangeOutcome) {
        match outcome {
            ExchangeOutcome::Replied { usage, .. } => {
                self.replied += 1;
                if let Some(u) = usage {
                    self.total_tokens += u64::from(u.total_tokens);
                }
            }
            ExchangeOutcome::Failed { kind, .. } => match kind {
                FailureKind::RateLimited => self.rate_limited += 1,
                FailureKind::InvalidCredential => self.invalid_credential += 1,
                FailureKind::Other => self.other_failures += 1,
            },
        }
    }

    pub fn failed(&self) -> usize {
        self.rate_limited + self.invalid_credential + self.other_failures
    }

    pub fn total(&self) -> usize {
        self.replied + self.failed()
    }
}

/// A single conversation with a generation provider.
///
/// The session owns its history; `converse` takes `&mut self`, so reading
/// the history and appending the new exchange can never interleave with
/// another call on the same session.
pub struct ChatSession<S: OutputSink> {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max output tokens per response
    max_tokens: Option<u32>,

    /// System instruction and user-turn template
    template: PromptTemplate,

    /// Bounded conversation history
    history: HistoryStore,

    /// Where the transcript goes
    sink: S,
}

impl<S: OutputSink> ChatSession<S> {
    /// Create a new session with an empty history bounded at `max_turns`.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        template: PromptTemplate,
        max_turns: usize,
        sink: S,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            template,
            history: HistoryStore::new(max_turns),
            sink,
        }
    }

    /// Build a session from application config.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>, sink: S) -> Self {
        let template = match &config.persona.system_prompt {
            Some(system) => PromptTemplate::new(system.as_str()),
            None => PromptTemplate::sales_assistant(),
        }
        .with_user_template(config.persona.user_template.as_str());

        Self::new(
            provider,
            config.effective_model(),
            template,
            config.history.max_turns,
            sink,
        )
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens)
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max output tokens per response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Forget the conversation so far.
    pub fn reset(&mut self) {
        info!(dropped = self.history.len(), "Conversation history cleared");
        self.history.clear();
    }

    /// Run one exchange. Never fails; see [`ExchangeOutcome`].
    pub async fn converse(&mut self, user_input: &str) -> ExchangeOutcome {
        self.sink.user(user_input);

        let dropped = self.history.truncate();
        if dropped > 0 {
            warn!(dropped, "History exceeded its bound before a request; trimmed");
        }

        let history = self.history.snapshot();
        let messages = self.template.render(&history, user_input);
        let request = ProviderRequest::new(self.model.as_str(), messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            history_turns = history.len(),
            "Sending exchange"
        );

        match self.provider.complete(request).await {
            Ok(response) => {
                let text = response.message.content().to_string();
                if let Some(usage) = &response.usage {
                    debug!(
                        model = %response.model,
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "Exchange completed"
                    );
                }

                self.sink.assistant(&text);
                self.history.append(user_input, text.as_str());

                ExchangeOutcome::Replied {
                    text,
                    usage: response.usage,
                }
            }
            Err(e) => self.handle_failure(&e),
        }
    }

    fn handle_failure(&mut self, e: &ProviderError) -> ExchangeOutcome {
        let kind = classify_provider_error(e);
        match kind {
            FailureKind::InvalidCredential => {
                error!(provider = self.provider.name(), error = %e, "API key rejected")
            }
            FailureKind::RateLimited => {
                warn!(provider = self.provider.name(), error = %e, "Rate limited")
            }
            FailureKind::Other => {
                warn!(provider = self.provider.name(), error = %e, "Exchange failed")
            }
        }

        let notice = kind.notice_for(self.provider.name());
        self.sink.notice(kind, notice);
        ExchangeOutcome::Failed { kind, notice }
    }

    /// Play a list of inputs in order, waiting `delay` between turns.
    ///
    /// Every input is attempted regardless of earlier failures.
    pub async fn run_script<I, T>(&mut self, inputs: I, delay: Duration) -> ScriptReport
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut report = ScriptReport::default();

        for (i, input) in inputs.into_iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = self.converse(input.as_ref()).await;
            report.record(&outcome);
        }

        info!(
            replied = report.replied,
            failed = report.failed(),
            "Script finished"
        );
        report
    }
}

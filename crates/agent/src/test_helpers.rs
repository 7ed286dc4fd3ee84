//! Shared test helpers for session tests.

use cardchat_core::error::ProviderError;
use cardchat_core::message::Message;
use cardchat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// One scripted provider outcome.
pub enum Step {
    Reply(String),
    Fail(ProviderError),
}

/// A mock provider that plays back a sequence of scripted outcomes
/// and records every request it receives.
///
/// Panics if more calls are made than steps provided.
pub struct ScriptedProvider {
    steps: Mutex<Vec<Step>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call succeeds, with these replies in order.
    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Step::Reply(t.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        let mut steps = self.steps.lock().unwrap();
        if steps.is_empty() {
            panic!("ScriptedProvider: no more steps (call #{call})");
        }

        match steps.remove(0) {
            Step::Reply(text) => Ok(make_text_response(&text, &request.model)),
            Step::Fail(e) => Err(e),
        }
    }
}

/// Create a simple text response with fixed usage.
pub fn make_text_response(text: &str, model: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: model.to_string(),
    }
}

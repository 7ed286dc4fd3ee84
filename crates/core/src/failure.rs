//! Classification of generation failures into user-facing notices.
//!
//! Providers report structured [`ProviderError`] variants where the backend
//! exposes enough information. Anything else falls through to
//! [`classify_failure_message`], which inspects the error text.

use serde::{Deserialize, Serialize};
use crate::error::ProviderError;

/// Substring that marks an over-quota / rate-limit failure.
const RATE_LIMIT_MARKER: &str = "429";

/// Substring that marks a rejected API key.
const INVALID_KEY_MARKER: &str = "API key not valid";

/// What kind of failure a generation call ended in, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider reported an over-limit condition.
    RateLimited,
    /// The configured API key was not accepted.
    InvalidCredential,
    /// Network errors, malformed responses, anything unrecognized.
    Other,
}

impl FailureKind {
    /// The message shown to the user for this kind of failure.
    pub fn notice(&self) -> &'static str {
        match self {
            FailureKind::RateLimited => {
                "Alcanzaste el límite de peticiones. Intenta de nuevo más tarde."
            }
            FailureKind::InvalidCredential => {
                "La clave API no es válida. Verifica tu configuración (.env)."
            }
            FailureKind::Other => "Hubo un problema al procesar tu solicitud.",
        }
    }

    /// The notice for a failure from the named provider. Gemini key
    /// failures point at the Google key in `.env`.
    pub fn notice_for(&self, provider: &str) -> &'static str {
        match (self, provider) {
            (FailureKind::InvalidCredential, "google" | "gemini") => {
                "La clave API de Google no es válida. Verifica tu archivo .env."
            }
            _ => self.notice(),
        }
    }

    /// Short machine-friendly label, used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::RateLimited => "rate_limited",
            FailureKind::InvalidCredential => "invalid_credential",
            FailureKind::Other => "other",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a failure by its message text. First match wins.
pub fn classify_failure_message(message: &str) -> FailureKind {
    if message.contains(RATE_LIMIT_MARKER) {
        FailureKind::RateLimited
    } else if message.contains(INVALID_KEY_MARKER) {
        FailureKind::InvalidCredential
    } else {
        FailureKind::Other
    }
}

/// Classify a provider error, trusting the structured variant first.
pub fn classify_provider_error(error: &ProviderError) -> FailureKind {
    match error {
        ProviderError::RateLimited(_) => FailureKind::RateLimited,
        ProviderError::AuthenticationFailed(_) => FailureKind::InvalidCredential,
        other => classify_failure_message(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_substring() {
        assert_eq!(
            classify_failure_message("[GoogleGenerativeAI Error]: [429 Too Many Requests]"),
            FailureKind::RateLimited
        );
    }

    #[test]
    fn invalid_key_substring() {
        assert_eq!(
            classify_failure_message("API key not valid. Please pass a valid API key."),
            FailureKind::InvalidCredential
        );
    }

    #[test]
    fn first_match_wins() {
        // Both markers present: the rate-limit check runs first.
        assert_eq!(
            classify_failure_message("429: API key not valid"),
            FailureKind::RateLimited
        );
    }

    #[test]
    fn unknown_message_is_other() {
        assert_eq!(classify_failure_message("connection reset by peer"), FailureKind::Other);
        assert_eq!(classify_failure_message(""), FailureKind::Other);
        // Case matters, as with the upstream error text.
        assert_eq!(classify_failure_message("api key not valid"), FailureKind::Other);
    }

    #[test]
    fn structured_variants_take_precedence() {
        assert_eq!(
            classify_provider_error(&ProviderError::RateLimited("quota".into())),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify_provider_error(&ProviderError::AuthenticationFailed("bad key".into())),
            FailureKind::InvalidCredential
        );
    }

    #[test]
    fn unstructured_variants_fall_back_to_text() {
        let err = ProviderError::ApiError {
            status_code: 400,
            message: "API key not valid. Please pass a valid API key.".into(),
        };
        assert_eq!(classify_provider_error(&err), FailureKind::InvalidCredential);

        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Resource has been exhausted".into(),
        };
        assert_eq!(classify_provider_error(&err), FailureKind::RateLimited);

        let err = ProviderError::Network("dns error".into());
        assert_eq!(classify_provider_error(&err), FailureKind::Other);

        let err = ProviderError::Timeout("after 120s".into());
        assert_eq!(classify_provider_error(&err), FailureKind::Other);
    }

    #[test]
    fn notices_are_distinct() {
        let notices = [
            FailureKind::RateLimited.notice(),
            FailureKind::InvalidCredential.notice(),
            FailureKind::Other.notice(),
        ];
        assert!(notices[0].contains("límite"));
        assert!(notices[1].contains("clave API"));
        assert_ne!(notices[0], notices[2]);
        assert_ne!(notices[1], notices[2]);
    }

    #[test]
    fn google_key_notice_names_google() {
        assert_eq!(
            FailureKind::InvalidCredential.notice_for("google"),
            "La clave API de Google no es válida. Verifica tu archivo .env."
        );
        assert_eq!(
            FailureKind::InvalidCredential.notice_for("gemini"),
            FailureKind::InvalidCredential.notice_for("google")
        );
        assert_eq!(
            FailureKind::InvalidCredential.notice_for("openai"),
            FailureKind::InvalidCredential.notice()
        );
        assert_eq!(
            FailureKind::RateLimited.notice_for("google"),
            FailureKind::RateLimited.notice()
        );
    }
}

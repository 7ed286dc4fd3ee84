//! # cardchat Core
//!
//! Domain types, traits, and error definitions for the cardchat assistant.
//! This crate has **no HTTP or runtime dependencies** — it defines the domain
//! model that the provider, config, and agent crates implement against.
//!
//! ## Layout
//!
//! - [`message`] — role-tagged turns exchanged with the model
//! - [`provider`] — the `Provider` trait over hosted generation backends
//! - [`error`] — error enums per bounded context
//! - [`failure`] — mapping generation failures to user-facing notices

pub mod error;
pub mod failure;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::ProviderError;
pub use failure::{FailureKind, classify_failure_message, classify_provider_error};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};

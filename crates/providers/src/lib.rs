//! LLM Provider implementations for cardchat.
//!
//! All providers implement the `cardchat_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod google;
pub mod openai_compat;
pub mod router;

pub use google::GoogleProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};

//! DeepSeek chat-completion client: primary-source classification and Arabic translation.

mod answer;
pub mod client;
pub mod types;

pub use client::{DeepSeekClient, DeepSeekError, TextService, is_primary_source, translate_or_none};

use tracing::warn;

use super::types::{ChatCompletionResponse, Classification};

/// Text of the first choice, if the model produced any.
pub fn completion_text(response: &ChatCompletionResponse) -> Option<String> {
    let text = response
        .choices
        .first()
        .and_then(|c| c.message.as_ref())
        .and_then(|m| m.content.clone());

    if text.is_none() {
        warn!("DeepSeek returned no completion content");
    }
    text
}

pub fn parse_classification(answer: &str) -> Classification {
    let normalized = answer.trim().to_lowercase();
    match normalized.as_str() {
        "true" | "yes" => Classification::PrimarySource,
        "false" | "no" => Classification::NotPrimarySource,
        _ => Classification::Unrecognized(answer.trim().to_string()),
    }
}

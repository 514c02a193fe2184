//! Recommendation client: sends a built prompt through a `TextGenerator` and
//! turns the model's loosely structured reply into a `RecommendationResult`.
//!
//! The model is not guaranteed to emit valid JSON. Unparseable text, or JSON
//! without a `recommendations` array, yields the degraded result instead of an
//! error, so a person waiting on a generation always gets a usable payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::llm_client::{strip_json_fences, LlmError, TextGenerator};

pub const DEGRADED_SUMMARY: &str = "Failed to parse recommendations. Please try again.";
pub const DEGRADED_NOTES: &str = "There was an issue processing the AI response. \
    Please verify your internet connection and try again.";

/// Ranked recommendations plus the model's closing remarks.
///
/// Items are kept exactly as the model produced them: rank, order and any
/// extra fields survive untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub recommendations: Vec<Value>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub additional_notes: String,
}

impl RecommendationResult {
    pub fn degraded() -> Self {
        Self {
            recommendations: Vec::new(),
            summary: DEGRADED_SUMMARY.to_string(),
            additional_notes: DEGRADED_NOTES.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

/// Parses raw model text. Never fails; falls back to `RecommendationResult::degraded`.
pub fn parse_recommendations(text: &str) -> RecommendationResult {
    let cleaned = strip_json_fences(text);

    let parsed: Value = match serde_json::from_str(&cleaned) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                "Model reply is not valid JSON ({e}); returning degraded result. {} chars received",
                text.len()
            );
            return RecommendationResult::degraded();
        }
    };

    let Some(items) = parsed.get("recommendations").and_then(Value::as_array) else {
        warn!("Model reply has no recommendations array; returning degraded result");
        return RecommendationResult::degraded();
    };

    RecommendationResult {
        recommendations: items.clone(),
        summary: text_field(&parsed, "summary"),
        additional_notes: text_field(&parsed, "additionalNotes"),
    }
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Calls the provider with `prompt` and parses its reply.
///
/// Fails with `LlmError::MissingApiKey` on a blank credential; transport,
/// status and envelope failures are passed through from the generator.
pub async fn get_recommendations(
    generator: &dyn TextGenerator,
    prompt: &str,
    api_key: &str,
) -> Result<RecommendationResult, LlmError> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(LlmError::MissingApiKey);
    }

    let text = generator.generate(prompt, api_key).await?;
    Ok(parse_recommendations(&text))
}

//! Normalization of inference API responses.
//!
//! The fallback models return wildly different shapes and label
//! vocabularies: star ratings, LABEL_n classifier outputs, emotion labels,
//! plain sentiment words, sometimes nested one array deeper. The payload is
//! classified into a tagged variant and anything unrecognized fails closed
//! to neutral rather than erroring.

use serde_json::Value;

use super::Sentiment;

/// A single classification candidate from the inference API.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// The recognized shapes an inference response can take.
#[derive(Debug, Clone, PartialEq)]
pub enum InferencePayload {
    /// `[[{label, score}, ...]]` — one level of nesting, already unwrapped.
    Nested(Vec<LabelScore>),
    /// `[{label, score}, ...]`
    Flat(Vec<LabelScore>),
    /// `{label, score}`
    Single(LabelScore),
    /// Anything else.
    Unrecognized,
}

/// Classify a raw JSON payload into one of the known shapes.
///
/// Array entries without a string `label` and numeric `score` are dropped;
/// an array with no valid entries is treated as unrecognized.
pub fn classify_payload(value: &Value) -> InferencePayload {
    match value {
        Value::Array(items) => {
            // Nested array format: unwrap one level
            if let Some(Value::Array(inner)) = items.first() {
                let entries = valid_entries(inner);
                if entries.is_empty() {
                    return InferencePayload::Unrecognized;
                }
                return InferencePayload::Nested(entries);
            }

            let entries = valid_entries(items);
            if entries.is_empty() {
                InferencePayload::Unrecognized
            } else {
                InferencePayload::Flat(entries)
            }
        }
        Value::Object(_) => match parse_entry(value) {
            Some(entry) => InferencePayload::Single(entry),
            None => InferencePayload::Unrecognized,
        },
        _ => InferencePayload::Unrecognized,
    }
}

/// Interpret a raw inference response as a sentiment.
///
/// Picks the highest-scoring valid entry and maps its label. Unrecognized
/// payloads are neutral.
pub fn interpret_response(value: &Value) -> Sentiment {
    let top = match classify_payload(value) {
        InferencePayload::Nested(entries) | InferencePayload::Flat(entries) => entries
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score)),
        InferencePayload::Single(entry) => Some(entry),
        InferencePayload::Unrecognized => {
            tracing::warn!("Unrecognized inference response shape, defaulting to neutral");
            None
        }
    };

    match top {
        Some(entry) => {
            let sentiment = map_label(&entry.label);
            tracing::debug!(
                label = %entry.label,
                score = entry.score,
                result = %sentiment,
                "Mapped inference label"
            );
            sentiment
        }
        None => Sentiment::Neutral,
    }
}

/// Map a model label to a sentiment, case-insensitively.
///
/// Covers plain sentiment labels, star ratings, generic LABEL_n classifier
/// outputs, and the go_emotions vocabulary. Unknown labels are neutral.
pub fn map_label(label: &str) -> Sentiment {
    match label.to_lowercase().as_str() {
        // Plain sentiment labels
        "positive" => Sentiment::Positive,
        "negative" => Sentiment::Negative,
        "neutral" => Sentiment::Neutral,
        // Star ratings (nlptown multilingual sentiment)
        "1 star" | "1 stars" | "2 star" | "2 stars" => Sentiment::Negative,
        "3 star" | "3 stars" => Sentiment::Neutral,
        "4 star" | "4 stars" | "5 star" | "5 stars" => Sentiment::Positive,
        // Generic classifier labels (DistilBERT SST-2, RoBERTa sentiment)
        "label_0" => Sentiment::Negative,
        "label_1" => Sentiment::Positive,
        "label_2" => Sentiment::Neutral,
        // go_emotions labels bucketed into sentiment
        "joy" | "optimism" | "love" | "excitement" | "gratitude" | "pride" | "approval"
        | "caring" | "admiration" | "relief" | "amusement" => Sentiment::Positive,
        "sadness" | "anger" | "fear" | "disappointment" | "disapproval" | "annoyance"
        | "grief" | "embarrassment" | "nervousness" | "remorse" | "disgust" => Sentiment::Negative,
        "surprise" | "curiosity" | "confusion" | "realization" | "desire" => Sentiment::Neutral,
        _ => Sentiment::Neutral,
    }
}

fn valid_entries(items: &[Value]) -> Vec<LabelScore> {
    items.iter().filter_map(parse_entry).collect()
}

fn parse_entry(value: &Value) -> Option<LabelScore> {
    let label = value.get("label")?.as_str()?;
    let score = value.get("score")?.as_f64()?;
    Some(LabelScore {
        label: label.to_string(),
        score,
    })
}

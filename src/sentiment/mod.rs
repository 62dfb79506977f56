//! Sentiment classification for reflection text.
//!
//! Wraps the Hugging Face inference API with an ordered model fallback
//! chain and a local rule-based backup, so classification always produces
//! a result even when the external service is unreachable.

pub mod classifier;
pub mod labels;
pub mod rules;

pub use classifier::SentimentClassifier;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentiment of a piece of reflection text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POSITIVE" => Ok(Sentiment::Positive),
            "NEGATIVE" => Ok(Sentiment::Negative),
            "NEUTRAL" => Ok(Sentiment::Neutral),
            other => Err(UnknownSentiment(other.to_string())),
        }
    }
}

/// Error for a sentiment string that is not one of the three values.
#[derive(Debug, thiserror::Error)]
#[error("Unknown sentiment value: {0}")]
pub struct UnknownSentiment(pub String);

//! Rule-based sentiment fallback.
//!
//! Last resort when no API token is configured or every remote model
//! failed. Case-insensitive substring matching against fixed keyword
//! lists; majority wins, ties are neutral.

use super::Sentiment;

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "wonderful",
    "fantastic",
    "awesome",
    "love",
    "enjoy",
    "happy",
    "pleased",
    "satisfied",
    "proud",
    "accomplished",
    "successful",
    "easy",
    "fun",
    "exciting",
    "perfect",
    "brilliant",
    "outstanding",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "horrible",
    "hate",
    "dislike",
    "frustrated",
    "angry",
    "disappointed",
    "difficult",
    "hard",
    "impossible",
    "failed",
    "struggled",
    "stressed",
    "worried",
    "confused",
    "overwhelmed",
    "upset",
];

/// Classify text by keyword counting.
pub fn rule_based_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();

    let positive_count = POSITIVE_WORDS.iter().filter(|w| lower.contains(**w)).count();
    let negative_count = NEGATIVE_WORDS.iter().filter(|w| lower.contains(**w)).count();

    if positive_count > negative_count {
        Sentiment::Positive
    } else if negative_count > positive_count {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        assert_eq!(
            rule_based_sentiment("This was great and fun"),
            Sentiment::Positive
        );
    }

    #[test]
    fn test_negative_text() {
        assert_eq!(
            rule_based_sentiment("This was terrible and hard"),
            Sentiment::Negative
        );
    }

    #[test]
    fn test_neutral_text() {
        assert_eq!(rule_based_sentiment("The cat sat there"), Sentiment::Neutral);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(rule_based_sentiment("It was AWESOME"), Sentiment::Positive);
    }

    #[test]
    fn test_tie_is_neutral() {
        assert_eq!(
            rule_based_sentiment("good parts and bad parts"),
            Sentiment::Neutral
        );
    }
}

//! Word-list polarity scoring.

use super::SentimentLabel;

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "appreciate", "awesome", "beautiful", "best", "better", "brilliant", "calm",
    "celebrate", "cool", "delighted", "delightful", "enjoy", "excellent", "excited", "fantastic",
    "fine", "fun", "glad", "good", "great", "happy", "helpful", "impressive", "incredible",
    "kind", "like", "love", "loved", "lovely", "nice", "outstanding", "perfect", "pleased",
    "proud", "recommend", "success", "superb", "thank", "thanks", "win", "wonderful", "yay",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry", "annoyed", "annoying", "awful", "bad", "boring", "broken", "confused",
    "disappointed", "disappointing", "disaster", "disgusting", "dislike", "fail", "failed",
    "frustrated", "furious", "hate", "hated", "horrible", "hurt", "lonely", "mad", "miserable",
    "nightmare", "pain", "pathetic", "poor", "sad", "scared", "sick", "stupid", "terrible",
    "tired", "ugly", "upset", "useless", "worse", "worst", "wrong",
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "neither", "nor", "without", "cannot", "hardly",
];

const INTENSIFIERS: &[&str] = &[
    "very", "really", "so", "extremely", "super", "totally", "absolutely", "incredibly",
];

// Tokens a negator may precede a scored word by.
const NEGATION_WINDOW: usize = 2;

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase().replace('’', "'"))
        .collect()
}

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't")
}

fn word_score(token: &str) -> Option<f64> {
    if POSITIVE_WORDS.contains(&token) {
        Some(1.0)
    } else if NEGATIVE_WORDS.contains(&token) {
        Some(-1.0)
    } else {
        None
    }
}

/// Polarity score of `text`. Positive above zero, negative below.
#[must_use]
pub(crate) fn polarity(text: &str) -> f64 {
    let tokens = tokens(text);
    let mut score = 0.0;

    for (idx, token) in tokens.iter().enumerate() {
        let Some(mut value) = word_score(token) else {
            continue;
        };

        if idx > 0 && INTENSIFIERS.contains(&tokens[idx - 1].as_str()) {
            value *= 2.0;
        }

        let window_start = idx.saturating_sub(NEGATION_WINDOW);
        if tokens[window_start..idx].iter().any(|t| is_negator(t)) {
            value = -value;
        }

        score += value;
    }

    if score.abs() > f64::EPSILON && text.contains('!') {
        score *= 1.5;
    }

    score
}

#[must_use]
pub fn classify_sentiment(text: &str) -> SentimentLabel {
    let score = polarity(text);
    if score > 0.0 {
        SentimentLabel::Positive
    } else if score < 0.0 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_message() {
        assert_eq!(classify_sentiment("I love this!"), SentimentLabel::Positive);
    }

    #[test]
    fn negative_message() {
        assert_eq!(
            classify_sentiment("This is terrible and I hate it"),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn neutral_message() {
        assert_eq!(
            classify_sentiment("What is the capital of France?"),
            SentimentLabel::Neutral
        );
        assert_eq!(classify_sentiment(""), SentimentLabel::Neutral);
    }

    #[test]
    fn negation_flips_polarity() {
        assert_eq!(classify_sentiment("This is not good"), SentimentLabel::Negative);
        assert_eq!(classify_sentiment("It isn't bad at all"), SentimentLabel::Positive);
        assert_eq!(classify_sentiment("I don’t like it"), SentimentLabel::Negative);
    }

    #[test]
    fn intensifier_and_exclamation_scale_score() {
        assert!((polarity("good") - 1.0).abs() < f64::EPSILON);
        assert!((polarity("very good") - 2.0).abs() < f64::EPSILON);
        assert!((polarity("very good!") - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mixed_words_cancel_out() {
        assert_eq!(classify_sentiment("good but bad"), SentimentLabel::Neutral);
    }
}

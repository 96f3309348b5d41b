//! Sentiment and named-entity annotation of incoming messages.
//!
//! Annotations are informational: they are logged, and a non-empty entity set
//! is appended to the reply. They never change which path a message takes.

mod entities;
mod sentiment;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

pub use entities::extract_entities;
pub use sentiment::classify_sentiment;

/// Coarse polarity of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// Entity-type label to the last span of that type seen in a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySet(BTreeMap<String, String>);

impl EntitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a span, replacing any earlier span with the same label.
    pub fn insert(&mut self, label: impl Into<String>, text: impl Into<String>) {
        self.0.insert(label.into(), text.into());
    }

    #[cfg(test)]
    pub(crate) fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Text appended to a reply. Empty when there are no entities.
    #[must_use]
    pub fn render_appendage(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("\n\n🔎 Entities: {self}")
        }
    }
}

impl fmt::Display for EntitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (label, text)) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{label}: {text}")?;
        }
        Ok(())
    }
}

/// Everything computed about a message before it is sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub sentiment: SentimentLabel,
    pub entities: EntitySet,
}

/// Produces an [`Annotation`] for a message.
pub trait TextAnnotator: Send + Sync {
    /// # Errors
    ///
    /// Implementations backed by an external service may fail; the built-in
    /// annotator never does.
    fn annotate(&self, text: &str) -> Result<Annotation>;
}

/// Word-list sentiment plus regex and gazetteer entity tagging.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconAnnotator;

impl TextAnnotator for LexiconAnnotator {
    fn annotate(&self, text: &str) -> Result<Annotation> {
        Ok(Annotation {
            sentiment: classify_sentiment(text),
            entities: extract_entities(text),
        })
    }
}

use thiserror::Error;

/// Reply sent when the model produced no text.
pub const EMPTY_GENERATION_REPLY: &str = "⚠ Sorry, I couldn't generate a response.";

/// Reply sent for every other failure while answering a message.
pub const GENERIC_FAILURE_REPLY: &str = "❌ Sorry, there was an issue processing your request.";

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Serenity error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Gemini API error ({status}): {message}")]
    GeminiApi {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Gemini response error: {0}")]
    GeminiResponse(String),

    #[error("Gemini returned an empty response")]
    EmptyGeneration,

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Text annotation error: {0}")]
    Annotation(String),
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Serenity(Box::new(err))
    }
}

impl BotError {
    /// Returns the fixed user-facing text for this error.
    ///
    /// Only two strings ever reach the user: one for an empty generation and
    /// one for everything else.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            BotError::EmptyGeneration => EMPTY_GENERATION_REPLY,
            _ => GENERIC_FAILURE_REPLY,
        }
    }

    /// Whether the same request could succeed if sent again.
    ///
    /// Configuration problems are fatal; empty generations and transport
    /// failures are not. The binary picks its exit status from this.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, BotError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

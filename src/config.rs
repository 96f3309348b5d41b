use std::env;

use log::{debug, error, info};

use crate::error::{BotError, Result};

const DEFAULT_REDIS_HOST: &str = "localhost";
const DEFAULT_REDIS_PORT: u16 = 6379;
const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub redis_host: String,
    pub redis_port: u16,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `DISCORD_TOKEN` or `GEMINI_API_KEY` is missing, or if
    /// `REDIS_PORT` is set but not a valid port number.
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = required(&lookup, "DISCORD_TOKEN")?;
        let gemini_api_key = required(&lookup, "GEMINI_API_KEY")?;

        let gemini_model =
            optional(&lookup, "GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let gemini_base_url = optional(&lookup, "GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        let redis_host =
            optional(&lookup, "REDIS_HOST").unwrap_or_else(|| DEFAULT_REDIS_HOST.to_string());
        let redis_port = match optional(&lookup, "REDIS_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                error!("Invalid REDIS_PORT value '{raw}': {e}");
                BotError::Config(format!("REDIS_PORT must be a port number, got '{raw}'"))
            })?,
            None => DEFAULT_REDIS_PORT,
        };

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("Gemini API key length: {} characters", gemini_api_key.len());
        debug!("Gemini model: {gemini_model}");
        debug!("Redis endpoint: {redis_host}:{redis_port}");

        Ok(Self {
            discord_token,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            redis_host,
            redis_port,
        })
    }

    #[must_use]
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or_else(|| {
        error!("Failed to load {name} from environment");
        BotError::Config(format!("{name} is not set"))
    })
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

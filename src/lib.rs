pub mod annotate;
pub mod bot;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod gemini;
pub mod history;
pub mod responder;
pub mod types;

pub use bot::run;

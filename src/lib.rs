//! Kaikoon backend: task management for neurodivergent teens.
//!
//! The crate provides the full service core behind the Kaikoon app:
//! tasks broken into small steps (optionally AI-generated), post-task
//! reflections with sentiment analysis, a Kaiblooms points economy with
//! a collectible garden, and per-user settings. The HTTP routing layer
//! is supplied by the embedding application; handlers in [`api`] are
//! framework-agnostic.

pub mod api;
pub mod config;
pub mod sentiment;
pub mod steps;
pub mod storage;

pub use api::ApiError;
pub use config::AppConfig;
pub use sentiment::{Sentiment, SentimentClassifier};
pub use steps::StepGenerator;
pub use storage::Database;

//! AI-assisted task breakdown.

pub mod generator;
pub mod prompt;

pub use generator::{GeneratedStep, StepError, StepGenerator};

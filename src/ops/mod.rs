//! High-level operations.
//!
//! This module contains the execution pipeline behind `runway run` and the
//! HTTP execute endpoints.

pub mod fallback;
mod java;
pub mod orchestrator;
mod python;

pub use fallback::{
    is_failed_attempt, AlternateOutputDir, FallbackContext, FallbackSequencer, FallbackStrategy,
    SourceOnClasspath, StrategyResult,
};
pub use orchestrator::Orchestrator;
pub use python::{prepare_venv, venv_python};

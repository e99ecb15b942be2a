//! Runway - build and run Java and Python projects on demand
//!
//! This crate provides the core library functionality for Runway,
//! including source resolution, build detection, bounded execution, and
//! the HTTP API used by the site's terminal.

pub mod builder;
pub mod core;
pub mod error;
pub mod ops;
pub mod runner;
pub mod server;
pub mod sources;
pub mod util;

pub use core::{
    BuildKind, BuildResult, Ecosystem, EntryPoint, ExecutionOutcome, OutcomeStatus,
    ProjectCatalog, ProjectReference, SourceKind,
};
pub use error::{ExecuteError, ExecuteResult};
pub use ops::Orchestrator;
pub use runner::BoundedExecutor;
pub use util::context::GlobalContext;

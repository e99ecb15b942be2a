//! Core data structures for Runway.
//!
//! This module contains the values that flow through one execution request:
//! - Project references and catalog metadata (WHAT to run)
//! - Build classification and results
//! - Entry points
//! - Execution outcomes

pub mod build;
pub mod catalog;
pub mod entry_point;
pub mod outcome;
pub mod project;

pub use build::{BuildKind, BuildResult, ResolvedProject};
pub use catalog::{ProjectCatalog, ProjectKind, ProjectMetadata, ReferenceOverrides};
pub use entry_point::EntryPoint;
pub use outcome::{ExecutionOutcome, OutcomeStatus};
pub use project::{Ecosystem, ProjectReference, SourceKind};

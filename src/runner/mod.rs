//! Program execution.

pub mod bounded;

pub use bounded::{BoundedExecutor, DEFAULT_TIMEOUT};

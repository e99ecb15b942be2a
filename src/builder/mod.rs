//! Build system.
//!
//! This module detects how a Java project is built, runs the build, and
//! locates the runnable artifact it produced.

pub mod adhoc;
pub mod detect;
pub mod locate;
pub mod tool;

use std::path::Path;

use crate::core::{BuildKind, BuildResult, EntryPoint};
use crate::error::ExecuteResult;
use crate::util::config::JavaConfig;

pub use adhoc::AdHocCompiler;
pub use detect::classify;
pub use locate::{find_bundle, locate, RunnableUnit};

/// Build a classified project.
///
/// Ad-hoc trees are compiled into the configured output directory; other
/// kinds run their own build tool.
pub fn build(
    root: &Path,
    kind: BuildKind,
    entry_point: Option<&EntryPoint>,
    config: &JavaConfig,
) -> ExecuteResult<BuildResult> {
    let result = match kind {
        BuildKind::AdHoc => {
            AdHocCompiler::new(&config.javac).compile(root, entry_point, &config.output_dir)?
        }
        BuildKind::Maven | BuildKind::Gradle => tool::build(root, kind, entry_point, config)?,
    };
    tracing::debug!("{} build produced {}", kind, result.path().display());
    Ok(result)
}

//! Configuration file support for Runway.
//!
//! Runway supports two configuration file locations:
//! - Global: `~/.runway/config.toml` - User-wide defaults
//! - Project: `.runway/config.toml` - Deployment-specific overrides
//!
//! Project config takes precedence over global config. A handful of
//! environment variables (`JAVA_PROJECTS_DIR`, `PYTHON_PROJECTS_DIR`,
//! `PYTHON_VENV_DIR`, `TEMP_DIR`) override both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Runway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filesystem locations
    pub paths: PathsConfig,

    /// Bounded execution settings
    pub execution: ExecutionConfig,

    /// Java toolchain settings
    pub java: JavaConfig,

    /// Python settings
    pub python: PythonConfig,

    /// HTTP server settings
    pub server: ServerSettings,
}

/// Where projects, caches and virtual environments live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory for local Java projects
    pub java_projects_dir: PathBuf,

    /// Base directory for local Python projects
    pub python_projects_dir: PathBuf,

    /// Working copies of remote projects
    pub cache_dir: PathBuf,

    /// Python virtual environments, one per project
    pub venv_dir: PathBuf,

    /// Project catalog file
    pub catalog: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            java_projects_dir: PathBuf::from("server/java-projects"),
            python_projects_dir: PathBuf::from("server/python-projects"),
            cache_dir: PathBuf::from("server/temp"),
            venv_dir: PathBuf::from("server/python-venvs"),
            catalog: PathBuf::from("projects.toml"),
        }
    }
}

/// Bounded execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Wall-clock budget for a program run, in seconds
    pub timeout_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig { timeout_secs: 5 }
    }
}

impl ExecutionConfig {
    /// The timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Java toolchain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JavaConfig {
    /// Java launcher
    pub java: String,

    /// Java compiler
    pub javac: String,

    /// Maven executable
    pub mvn: String,

    /// Gradle executable (used when the project has no wrapper)
    pub gradle: String,

    /// Output directory for ad-hoc compiles
    pub output_dir: String,

    /// Output directory used by the alternate-output-dir fallback
    pub fallback_output_dir: String,

    /// Entry point tried by the alternate-output-dir fallback
    pub fallback_entry_point: String,
}

impl Default for JavaConfig {
    fn default() -> Self {
        JavaConfig {
            java: "java".to_string(),
            javac: "javac".to_string(),
            mvn: "mvn".to_string(),
            gradle: "gradle".to_string(),
            output_dir: "build".to_string(),
            fallback_output_dir: "out".to_string(),
            fallback_entry_point: "edu.monash.fit2099.game.Application".to_string(),
        }
    }
}

/// Python settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Interpreter used when the project has no virtual environment
    pub interpreter: String,

    /// Create a venv and install requirements.txt before the first run
    pub install_requirements: bool,

    /// Main file used when the request names none
    pub default_main: String,
}

impl Default for PythonConfig {
    fn default() -> Self {
        PythonConfig {
            interpreter: "python3".to_string(),
            install_requirements: true,
            default_main: "main.py".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// A partially-specified config, as found in a single file.
///
/// Only keys present in the file override the accumulated config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    paths: toml::Table,
    execution: toml::Table,
    java: toml::Table,
    python: toml::Table,
    server: toml::Table,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Overlay the keys present in a config file onto this config.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let layer: ConfigLayer = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        self.paths = overlay(&self.paths, layer.paths)?;
        self.execution = overlay(&self.execution, layer.execution)?;
        self.java = overlay(&self.java, layer.java)?;
        self.python = overlay(&self.python, layer.python)?;
        self.server = overlay(&self.server, layer.server)?;
        Ok(())
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("JAVA_PROJECTS_DIR") {
            self.paths.java_projects_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("PYTHON_PROJECTS_DIR") {
            self.paths.python_projects_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("PYTHON_VENV_DIR") {
            self.paths.venv_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("TEMP_DIR") {
            self.paths.cache_dir = PathBuf::from(dir);
        }
    }

    /// Resolve relative paths against a base directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.paths.java_projects_dir,
            &mut self.paths.python_projects_dir,
            &mut self.paths.cache_dir,
            &mut self.paths.venv_dir,
            &mut self.paths.catalog,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

fn overlay<T>(current: &T, layer: toml::Table) -> Result<T>
where
    T: Serialize + serde::de::DeserializeOwned,
{
    let mut table = match toml::Value::try_from(current).context("failed to serialize config")? {
        toml::Value::Table(table) => table,
        _ => toml::Table::new(),
    };
    table.extend(layer);
    toml::Value::Table(table)
        .try_into()
        .context("invalid config value")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Environment variables
/// 2. Project config (.runway/config.toml)
/// 3. Global config (~/.runway/config.toml)
/// 4. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    for path in [global_path, project_path] {
        if path.exists() {
            if let Err(e) = config.merge_file(path) {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
            }
        }
    }

    config.apply_env();
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.execution.timeout_secs, 5);
        assert_eq!(config.java.output_dir, "build");
        assert_eq!(config.java.fallback_output_dir, "out");
        assert_eq!(config.paths.cache_dir, PathBuf::from("server/temp"));
        assert!(config.python.install_requirements);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[execution]
timeout_secs = 3

[java]
java = "/opt/jdk/bin/java"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.execution.timeout_secs, 3);
        assert_eq!(config.java.java, "/opt/jdk/bin/java");
        assert_eq!(config.java.javac, "javac");
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[execution]
timeout_secs = 10

[java]
mvn = "/usr/local/bin/mvn"
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[execution]
timeout_secs = 2
"#,
        )
        .unwrap();

        let config = load_config(&global_path, &project_path);

        assert_eq!(config.execution.timeout_secs, 2);
        assert_eq!(config.java.mvn, "/usr/local/bin/mvn");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_from(|key| match key {
            "TEMP_DIR" => Some("/var/cache/runway".to_string()),
            "JAVA_PROJECTS_DIR" => Some("/srv/java".to_string()),
            _ => None,
        });

        assert_eq!(config.paths.cache_dir, PathBuf::from("/var/cache/runway"));
        assert_eq!(config.paths.java_projects_dir, PathBuf::from("/srv/java"));
        assert_eq!(
            config.paths.python_projects_dir,
            PathBuf::from("server/python-projects")
        );
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = Config::default();
        config.paths.venv_dir = PathBuf::from("/abs/venvs");
        config.resolve_paths(Path::new("/srv/site"));

        assert_eq!(
            config.paths.java_projects_dir,
            PathBuf::from("/srv/site/server/java-projects")
        );
        assert_eq!(config.paths.venv_dir, PathBuf::from("/abs/venvs"));
    }

    #[test]
    fn test_invalid_project_config_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let project_path = tmp.path().join("project.toml");
        std::fs::write(&project_path, "[execution]\ntimeout_secs = \"soon\"\n").unwrap();

        let config = load_config(&tmp.path().join("missing.toml"), &project_path);
        assert_eq!(config.execution.timeout_secs, 5);
    }
}

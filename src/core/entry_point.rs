//! Java entry points - fully-qualified class names and the files they map to.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

static CLASS_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$").unwrap()
});

/// A fully-qualified Java class name such as `a.b.Main`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryPoint {
    name: String,
}

impl EntryPoint {
    /// The dotted class name.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Path of the unit relative to a root, with the given extension.
    fn relative_path(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.name.split('.').collect();
        path.set_extension(extension);
        path
    }

    /// Source file under a source root: `<root>/a/b/Main.java`.
    pub fn source_file(&self, source_root: &Path) -> PathBuf {
        source_root.join(self.relative_path("java"))
    }

    /// Compiled unit under an output directory: `<out>/a/b/Main.class`.
    pub fn class_file(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.relative_path("class"))
    }
}

impl FromStr for EntryPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if CLASS_NAME_RE.is_match(s) {
            Ok(EntryPoint {
                name: s.to_string(),
            })
        } else {
            Err(format!("invalid entry point `{}`: expected a class name like a.b.Main", s))
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_point_paths() {
        let ep: EntryPoint = "a.b.Main".parse().unwrap();
        assert_eq!(
            ep.source_file(Path::new("/p/src")),
            PathBuf::from("/p/src/a/b/Main.java")
        );
        assert_eq!(
            ep.class_file(Path::new("/p/build")),
            PathBuf::from("/p/build/a/b/Main.class")
        );
    }

    #[test]
    fn test_default_package() {
        let ep: EntryPoint = "Main".parse().unwrap();
        assert_eq!(ep.source_file(Path::new("src")), PathBuf::from("src/Main.java"));
    }

    #[test]
    fn test_rejects_invalid_names() {
        assert!("a..b".parse::<EntryPoint>().is_err());
        assert!("a/b/Main".parse::<EntryPoint>().is_err());
        assert!("1abc".parse::<EntryPoint>().is_err());
        assert!("Main; rm -rf /".parse::<EntryPoint>().is_err());
    }
}

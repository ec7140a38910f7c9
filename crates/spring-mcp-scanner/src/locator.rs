//! Source file discovery.
//!
//! Walks a project tree and yields candidate Java files. Build output, test,
//! and vendored directories are pruned by name. Files that cannot be read
//! are reported as [`WarningKind::SkippedFile`] and the walk continues.
//!
//! # Examples
//!
//! ```no_run
//! use spring_mcp_core::{Diagnostics, ScanConfig};
//! use spring_mcp_scanner::SourceLocator;
//! use std::path::Path;
//!
//! let locator = SourceLocator::new(Path::new("./petstore"), ScanConfig::default())?;
//! let mut diagnostics = Diagnostics::new();
//! let units = locator.collect_units(&mut diagnostics)?;
//! println!("{} source files", units.len());
//! # Ok::<(), spring_mcp_core::Error>(())
//! ```

use crate::types::{SourceRole, SourceUnit};
use spring_mcp_core::{Diagnostics, Error, Result, ScanConfig, Warning, WarningKind};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Locates source files under a project root.
#[derive(Debug, Clone)]
pub struct SourceLocator {
    root: PathBuf,
    config: ScanConfig,
}

impl SourceLocator {
    /// Creates a locator for `root`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProjectNotFound` if `root` does not exist and
    /// `Error::ProjectUnreadable` if it is not a readable directory.
    pub fn new(root: &Path, config: ScanConfig) -> Result<Self> {
        if !root.exists() {
            return Err(Error::ProjectNotFound {
                path: root.display().to_string(),
            });
        }
        fs::read_dir(root).map_err(|source| Error::ProjectUnreadable {
            path: root.display().to_string(),
            source,
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts a fresh walk.
    ///
    /// With `restrict_to_roots`, only files under one of the configured
    /// source roots are yielded. Each call walks the tree again, so the
    /// sequence can be restarted at will.
    #[must_use]
    pub fn locate(&self, restrict_to_roots: bool) -> Locate<'_> {
        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter();
        Locate {
            locator: self,
            walker,
            visited: HashSet::new(),
            restrict_to_roots: restrict_to_roots && !self.config.source_roots.is_empty(),
        }
    }

    /// Collects every source unit, recording skipped entries in `diagnostics`.
    ///
    /// Files under the configured source roots are preferred. When the tree
    /// has none, the whole tree is scanned instead and a warning is recorded.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoSourceFiles` if no source file can be read at all.
    pub fn collect_units(&self, diagnostics: &mut Diagnostics) -> Result<Vec<SourceUnit>> {
        let mut skipped = Vec::new();
        let mut units = Self::drain(self.locate(true), &mut skipped);

        if units.is_empty() && !self.config.source_roots.is_empty() {
            skipped.clear();
            units = Self::drain(self.locate(false), &mut skipped);
            if !units.is_empty() {
                diagnostics.warn(
                    WarningKind::DegradedExtraction,
                    None,
                    format!(
                        "no sources under {}; scanned the whole project tree",
                        self.config.source_roots.join(", ")
                    ),
                );
            }
        }
        diagnostics.extend(skipped);

        if units.is_empty() {
            return Err(Error::NoSourceFiles {
                path: self.root.display().to_string(),
            });
        }

        tracing::info!("Located {} source files", units.len());
        Ok(units)
    }

    fn drain(walk: Locate<'_>, skipped: &mut Vec<Warning>) -> Vec<SourceUnit> {
        walk.filter_map(|item| item.map_err(|w| skipped.push(w)).ok())
            .collect()
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.config.exclude_dirs.iter().any(|d| d == name)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.config.extensions.iter().any(|e| e == ext))
    }

    fn in_source_root(&self, relative: &str) -> bool {
        self.config.source_roots.iter().any(|root| {
            let root = root.trim_matches('/');
            relative.starts_with(&format!("{root}/")) || relative.contains(&format!("/{root}/"))
        })
    }

    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn read_unit(&self, entry: &DirEntry, relative_path: String) -> std::result::Result<SourceUnit, Warning> {
        let skipped = |message: String| {
            Warning::new(WarningKind::SkippedFile, Some(relative_path.clone()), message)
        };

        let size = entry
            .metadata()
            .map_err(|e| skipped(format!("cannot stat file: {e}")))?
            .len();
        if size > self.config.max_file_size {
            return Err(skipped(format!(
                "file too large ({size} bytes exceeds {} limit)",
                self.config.max_file_size
            )));
        }

        let bytes = fs::read(entry.path()).map_err(|e| skipped(format!("cannot read file: {e}")))?;
        let mut text =
            String::from_utf8(bytes).map_err(|_| skipped("file is not valid UTF-8".to_string()))?;
        if text.starts_with('\u{feff}') {
            text.remove(0);
        }

        Ok(SourceUnit {
            path: entry.path().to_path_buf(),
            role: SourceRole::detect(&text),
            relative_path,
            text,
        })
    }
}

/// Lazy walk over a project tree; see [`SourceLocator::locate`].
///
/// Yields `Err(warning)` for every entry that had to be skipped.
#[derive(Debug)]
pub struct Locate<'a> {
    locator: &'a SourceLocator,
    walker: walkdir::IntoIter,
    visited: HashSet<PathBuf>,
    restrict_to_roots: bool,
}

impl Iterator for Locate<'_> {
    type Item = std::result::Result<SourceUnit, Warning>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let location = err.path().map(|p| self.locator.relative_path(p));
                    let message = if err.loop_ancestor().is_some() {
                        "symlink loop".to_string()
                    } else {
                        format!("cannot walk entry: {err}")
                    };
                    return Some(Err(Warning::new(WarningKind::SkippedFile, location, message)));
                }
            };

            if entry.file_type().is_dir() {
                let name = entry.file_name().to_string_lossy();
                if entry.depth() > 0 && self.locator.is_excluded(&name) {
                    tracing::debug!("Skipping excluded directory {}", entry.path().display());
                    self.walker.skip_current_dir();
                    continue;
                }
                let message = match fs::canonicalize(entry.path()) {
                    Ok(real) if !self.visited.contains(&real) => {
                        self.visited.insert(real);
                        continue;
                    }
                    Ok(_) => "directory already visited (symlink loop or alias)".to_string(),
                    Err(e) => format!("cannot resolve directory: {e}"),
                };
                self.walker.skip_current_dir();
                return Some(Err(Warning::new(
                    WarningKind::SkippedFile,
                    Some(self.locator.relative_path(entry.path())),
                    message,
                )));
            }

            if !entry.file_type().is_file() || !self.locator.has_extension(entry.path()) {
                continue;
            }

            let relative = self.locator.relative_path(entry.path());
            if self.restrict_to_roots && !self.locator.in_source_root(&relative) {
                continue;
            }
            return Some(self.locator.read_unit(&entry, relative));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_root() {
        let err = SourceLocator::new(Path::new("/definitely/not/here"), ScanConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound { .. }));
    }

    #[test]
    fn test_root_that_is_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("pom.xml");
        fs::write(&file, "<project/>").unwrap();
        let err = SourceLocator::new(&file, ScanConfig::default()).unwrap_err();
        assert!(matches!(err, Error::ProjectUnreadable { .. }));
    }

    #[test]
    fn test_filters_by_root_extension_and_exclusions() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/main/java/a/A.java", "class A {}");
        write(temp.path(), "src/main/java/a/notes.txt", "x");
        write(temp.path(), "src/test/java/a/ATest.java", "class ATest {}");
        write(temp.path(), "target/generated/B.java", "class B {}");
        write(temp.path(), "tools/C.java", "class C {}");

        let locator = SourceLocator::new(temp.path(), ScanConfig::default()).unwrap();
        let mut diagnostics = Diagnostics::new();
        let units = locator.collect_units(&mut diagnostics).unwrap();

        let paths: Vec<_> = units.iter().map(|u| u.relative_path.as_str()).collect();
        assert_eq!(paths, ["src/main/java/a/A.java"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_falls_back_to_whole_tree() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "app/Ctl.java", "@RestController class Ctl {}");

        let locator = SourceLocator::new(temp.path(), ScanConfig::default()).unwrap();
        let mut diagnostics = Diagnostics::new();
        let units = locator.collect_units(&mut diagnostics).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].role, SourceRole::Controller);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_no_source_files_is_fatal() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "README.md", "# nothing");
        let locator = SourceLocator::new(temp.path(), ScanConfig::default()).unwrap();
        let err = locator.collect_units(&mut Diagnostics::new()).unwrap_err();
        assert!(err.is_fatal_input());
    }

    #[test]
    fn test_oversized_and_non_utf8_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/main/java/Ok.java", "class Ok {}");
        write(temp.path(), "src/main/java/Big.java", &"x".repeat(64));
        fs::write(temp.path().join("src/main/java/Bin.java"), [0xff, 0xfe, 0x00]).unwrap();

        let config = ScanConfig {
            max_file_size: 32,
            ..ScanConfig::default()
        };
        let locator = SourceLocator::new(temp.path(), config).unwrap();
        let mut diagnostics = Diagnostics::new();
        let units = locator.collect_units(&mut diagnostics).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(diagnostics.summary().skipped_file, 2);
    }

    #[test]
    fn test_walk_is_restartable() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/main/java/A.java", "class A {}");
        write(temp.path(), "src/main/java/B.java", "class B {}");
        let locator = SourceLocator::new(temp.path(), ScanConfig::default()).unwrap();

        let first: Vec<_> = locator.locate(true).filter_map(std::result::Result::ok).collect();
        let second: Vec<_> = locator.locate(true).filter_map(std::result::Result::ok).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(
            first.iter().map(|u| &u.relative_path).collect::<Vec<_>>(),
            second.iter().map(|u| &u.relative_path).collect::<Vec<_>>()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_does_not_hang() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/main/java/a/A.java", "class A {}");
        std::os::unix::fs::symlink(
            temp.path().join("src/main/java"),
            temp.path().join("src/main/java/a/loop"),
        )
        .unwrap();

        let locator = SourceLocator::new(temp.path(), ScanConfig::default()).unwrap();
        let mut diagnostics = Diagnostics::new();
        let units = locator.collect_units(&mut diagnostics).unwrap();

        assert_eq!(units.len(), 1);
        assert!(diagnostics.summary().skipped_file >= 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_aliased_directory_is_visited_once() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/main/java/shared/S.java", "class S {}");
        std::os::unix::fs::symlink(
            temp.path().join("src/main/java/shared"),
            temp.path().join("src/main/java/alias"),
        )
        .unwrap();

        let locator = SourceLocator::new(temp.path(), ScanConfig::default()).unwrap();
        let mut diagnostics = Diagnostics::new();
        let units = locator.collect_units(&mut diagnostics).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].relative_path, "src/main/java/alias/S.java");
        assert_eq!(diagnostics.summary().skipped_file, 1);
        assert!(diagnostics.warnings()[0].message.contains("already visited"));
    }
}

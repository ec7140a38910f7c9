//! Files produced by the project generator.
//!
//! # Examples
//!
//! ```
//! use spring_mcp_codegen::{GeneratedCode, GeneratedFile};
//!
//! let mut code = GeneratedCode::new();
//! code.add_file(GeneratedFile::new("package.json", "{}\n"));
//!
//! assert_eq!(code.file_count(), 1);
//! assert!(code.get("package.json").is_some());
//! ```

use serde::{Deserialize, Serialize};

/// Every file of one generated project, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    /// Generated files with relative paths
    pub files: Vec<GeneratedFile>,
}

impl GeneratedCode {
    /// Creates an empty container.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Appends a file.
    pub fn add_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    /// Number of files.
    #[inline]
    #[must_use]
    pub const fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Iterates over the files in write order.
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter()
    }

    /// Looks up a file by its relative path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|file| file.path == path)
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Path relative to the output directory, `/`-separated
    pub path: String,
    /// File content
    pub content: String,
}

impl GeneratedFile {
    /// Creates a file entry.
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_path() {
        let mut code = GeneratedCode::new();
        code.add_file(GeneratedFile::new("a.json", "1"));
        code.add_file(GeneratedFile::new("b.ts", "2"));

        assert_eq!(code.get("b.ts").map(|f| f.content.as_str()), Some("2"));
        assert!(code.get("c.ts").is_none());
        assert_eq!(
            code.files().map(|f| f.path.as_str()).collect::<Vec<_>>(),
            vec!["a.json", "b.ts"]
        );
    }
}

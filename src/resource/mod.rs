//! The resource table and the capabilities behind each entry.
//!
//! The table is read from configuration once and never changes. Every entry
//! maps a canonical request path to a content type and one of two
//! capabilities:
//!
//! - **`file`**: a file on disk, served byte for byte with a known length
//! - **`program`**: an executable whose standard output becomes the body;
//!   its length is never known in advance

pub mod file;
pub mod program;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// How a resource produces its body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Capability {
    File {
        path: PathBuf,
    },
    Program {
        path: PathBuf,
        /// Passed to the program ahead of the query, resolved like a path
        #[serde(default)]
        arg: Option<PathBuf>,
    },
}

/// The result of asking a resource how long its body is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Known(u64),
    /// The body runs until the connection closes
    Unknown,
    /// The resource is configured but missing on disk
    NotFound,
}

impl Length {
    pub fn is_known(&self) -> bool {
        matches!(self, Length::Known(_))
    }
}

/// One entry of the resource table.
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    /// Canonical request path, without a leading slash
    pub name: String,
    pub content_type: String,
    #[serde(flatten)]
    pub capability: Capability,
}

impl Resource {
    pub async fn content_length(&self, root: &Path) -> Length {
        match &self.capability {
            Capability::File { path } => file::length(&resolve_path(root, path)).await,
            Capability::Program { .. } => Length::Unknown,
        }
    }
}

/// The ordered, immutable list of servable resources.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ResourceTable(Vec<Resource>);

impl ResourceTable {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self(resources)
    }

    /// Finds the first entry whose name equals the canonical `path`.
    pub fn resolve(&self, path: &str) -> Option<&Resource> {
        self.0.iter().find(|r| r.name == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Prefixes relative paths with the configured root.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, path: &str) -> Resource {
        Resource {
            name: name.to_string(),
            content_type: "text/html".to_string(),
            capability: Capability::File { path: path.into() },
        }
    }

    #[test]
    fn resolve_returns_first_exact_match() {
        let table = ResourceTable::new(vec![
            file("", "index.html"),
            file("index.html", "index.html"),
            file("index.html", "shadowed.html"),
        ]);

        assert_eq!(
            table.resolve("index.html").unwrap().capability,
            Capability::File { path: "index.html".into() }
        );
        assert!(table.resolve("").is_some());
        assert!(table.resolve("missing").is_none());
        assert!(table.resolve("/index.html").is_none());
    }

    #[test]
    fn relative_paths_are_rooted() {
        let root = Path::new("/srv/http");
        assert_eq!(
            resolve_path(root, Path::new("bin/search")),
            PathBuf::from("/srv/http/bin/search")
        );
        assert_eq!(
            resolve_path(root, Path::new("/etc/motd")),
            PathBuf::from("/etc/motd")
        );
    }
}

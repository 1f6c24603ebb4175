// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Resource loading from the content root.
//!
//! This module provides the [`ResourceLoader`] trait and
//! implementations for reading named resources (template sources and
//! companion data documents).
//!
//! # Loader Implementations
//!
//! - [`FileSystemLoader`]: Reads resources from the filesystem under a
//!   configured content root
//! - [`MemoryLoader`]: Reads resources from in-memory storage (testing)
//!
//! Absence is reported distinctly from other I/O failure: a missing
//! resource is [`HbsError::NotFound`], anything else is
//! [`HbsError::Io`]. Implementations must release whatever handle they
//! acquire on every exit path; the filesystem loader relies on RAII
//! for this.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{HbsError, Result};

/// Trait for reading a named resource from the content root.
///
/// Implement this to swap the storage backing (filesystem, embedded
/// assets, network store) without touching the pipeline. Loaders are
/// shared across concurrent requests and must be thread-safe.
pub trait ResourceLoader: Send + Sync + 'static {
    /// Reads the resource at `path`, relative to the content root.
    ///
    /// Returns [`HbsError::NotFound`] when the resource is absent and
    /// [`HbsError::Io`] for any other read failure. The not-found
    /// detail is the human-readable location of the missing resource.
    fn load(&self, path: &str) -> Result<String>;
}

/// Filesystem-based resource loader.
///
/// Resolves paths relative to a root directory. The configured root
/// string (as given on the command line) is kept verbatim for
/// not-found messages, so diagnostics show the path the user typed
/// rather than a canonicalized one.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    root: PathBuf,
    display_root: String,
}

impl FileSystemLoader {
    /// Creates a new filesystem loader rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            root: root.to_path_buf(),
            display_root: root.to_string_lossy().to_string(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn not_found_detail(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.display_root, path)
        } else {
            format!("{}/{}", self.display_root, path)
        }
    }
}

impl ResourceLoader for FileSystemLoader {
    fn load(&self, path: &str) -> Result<String> {
        let file = self.resolve(path);
        match std::fs::read_to_string(&file) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(HbsError::NotFound(self.not_found_detail(path)))
            }
            Err(e) => Err(HbsError::Io(e)),
        }
    }
}

/// Memory-based resource loader that stores resources in a map.
///
/// Used by tests to exercise the pipeline without touching the
/// filesystem.
#[derive(Clone, Default)]
pub struct MemoryLoader {
    resources: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryLoader {
    /// Creates an empty memory loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a resource.
    pub fn add_resource(&self, path: &str, content: &str) {
        self.resources
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    /// Removes a resource.
    pub fn remove_resource(&self, path: &str) {
        self.resources.lock().unwrap().remove(path);
    }

    /// Clears all resources.
    pub fn clear(&self) {
        self.resources.lock().unwrap().clear();
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&self, path: &str) -> Result<String> {
        self.resources
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| HbsError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn filesystem_loader_reads_existing_resource() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hello.hbs"), "Hi {{name}}").unwrap();

        let loader = FileSystemLoader::new(dir.path());
        assert_eq!(loader.load("/hello.hbs").unwrap(), "Hi {{name}}");
        assert_eq!(loader.load("hello.hbs").unwrap(), "Hi {{name}}");
    }

    #[test]
    fn filesystem_loader_reports_absence_with_root_in_detail() {
        let dir = TempDir::new().unwrap();
        let loader = FileSystemLoader::new(dir.path());

        match loader.load("/missing.hbs") {
            Err(HbsError::NotFound(detail)) => {
                assert!(detail.contains(&dir.path().to_string_lossy().to_string()));
                assert!(detail.ends_with("/missing.hbs"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn memory_loader_round_trip() {
        let loader = MemoryLoader::new();
        loader.add_resource("/a.hbs", "A");
        assert_eq!(loader.load("/a.hbs").unwrap(), "A");

        loader.remove_resource("/a.hbs");
        assert!(matches!(loader.load("/a.hbs"), Err(HbsError::NotFound(_))));
    }
}

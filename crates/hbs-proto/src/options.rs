// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Render-time server options.
//!
//! [`Options`] is established once at startup from the CLI and is
//! read-only for the lifetime of the process. It is passed by
//! reference into the pipeline, never held as a global.

/// Immutable render-time options.
///
/// The recognized set is the response content type and the content
/// root. The content root is used only for building human-readable
/// not-found messages; resource resolution itself lives in the loader.
#[derive(Debug, Clone)]
pub struct Options {
    content_type: String,
    dir: String,
}

impl Options {
    /// Creates the option record from startup configuration.
    pub fn new(content_type: impl Into<String>, dir: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            dir: dir.into(),
        }
    }

    /// The MIME type set on successful responses.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The content root, as configured. Display use only.
    pub fn dir(&self) -> &str {
        &self.dir
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new("text/html", ".")
    }
}

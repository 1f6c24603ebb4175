// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the hbs-proto render pipeline.
//!
//! This module defines [`HbsError`], the main error enum, and
//! [`TemplateFault`], the engine error record consumed by the
//! diagnostic page.
//!
//! # Error Categories
//!
//! - **Not found**: A requested resource (template or data file) is absent
//! - **Compile faults**: Template fails to parse
//! - **Render faults**: Template compiles but fails during evaluation
//! - **Data errors**: A companion data document is present but malformed
//! - **I/O errors**: Any other read/write failure
//!
//! Not-found for the primary template maps to a 404 response; compile
//! and render faults are routed to the diagnostic page; everything else
//! propagates to the caller.

use serde::Serialize;
use thiserror::Error;

/// Engine error record for a failed compile or render.
///
/// Carries the 1-based source line reported by the engine (when known)
/// and the message of the underlying cause, if the failure wraps one.
/// The diagnostic page uses the line and the presence of a cause to
/// compute the first displayed line.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateFault {
    /// Identifier of the template that failed.
    pub template: String,
    /// Human-readable description of the failure.
    pub message: String,
    /// 1-based source line, when the engine reported one.
    pub line: Option<usize>,
    /// 1-based source column, when the engine reported one.
    pub column: Option<usize>,
    /// Message of the nested causing error, if any.
    pub cause: Option<String>,
}

/// The main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum HbsError {
    /// A requested resource is absent. The payload is the
    /// human-readable detail shown in not-found responses.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Template parsing failed.
    #[error("compile error in '{}': {}", .0.template, .0.message)]
    Compile(TemplateFault),

    /// Template evaluation failed at render time.
    #[error("render error in '{}': {}", .0.template, .0.message)]
    Render(TemplateFault),

    /// A companion data document exists but could not be parsed.
    #[error("malformed data document '{path}': {message}")]
    Data {
        /// Resource path of the offending document.
        path: String,
        /// Parser diagnostic.
        message: String,
    },

    /// Any other read/write failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HbsError {
    /// Returns the engine fault record when this error carries one.
    ///
    /// Only compile and render errors do; these are the errors routed
    /// to the diagnostic page.
    pub fn fault(&self) -> Option<&TemplateFault> {
        match self {
            HbsError::Compile(fault) | HbsError::Render(fault) => Some(fault),
            _ => None,
        }
    }
}

/// Convenience type alias for Results with [`HbsError`].
pub type Result<T> = std::result::Result<T, HbsError>;

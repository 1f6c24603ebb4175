// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Diagnostic page rendering for engine failures.
//!
//! [`ErrorReporter`] owns an isolated Handlebars instance, independent
//! of the primary engine, with a fixed string-helper set registered on
//! it. The diagnostic template is a fixed identifier embedded in the
//! binary; it is never derived from the failing request. The reporter
//! never escalates: if the diagnostic render itself fails, it falls
//! back to a plain-text body instead of recursing into the main error
//! path.

use handlebars::{handlebars_helper, Handlebars};
use serde_json::{json, Map, Value};

use crate::context::Context;
use crate::error::TemplateFault;

/// The fixed identifier of the diagnostic template.
pub const DIAGNOSTIC_TEMPLATE_ID: &str = "error-pages/error";

/// Syntax-highlighting language advertised to the diagnostic page.
const DIAGNOSTIC_LANG: &str = "Xml";

const DIAGNOSTIC_TEMPLATE: &str = include_str!("error_pages/error.hbs");

handlebars_helper!(upper: |s: str| s.to_uppercase());
handlebars_helper!(lower: |s: str| s.to_lowercase());
handlebars_helper!(capitalize: |s: str| {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
});
handlebars_helper!(abbreviate: |s: str, width: u64| {
    let width = width as usize;
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut = width.saturating_sub(3);
        let head: String = s.chars().take(cut).collect();
        format!("{head}...")
    }
});

fn register_string_helpers(registry: &mut Handlebars<'static>) {
    registry.register_helper("upper", Box::new(upper));
    registry.register_helper("lower", Box::new(lower));
    registry.register_helper("capitalize", Box::new(capitalize));
    registry.register_helper("abbreviate", Box::new(abbreviate));
}

/// Renders the diagnostic page for a failed compile or render.
///
/// Constructed once at startup and shared across requests.
pub struct ErrorReporter {
    registry: Handlebars<'static>,
}

impl ErrorReporter {
    /// Creates the reporter and compiles the built-in diagnostic page.
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        register_string_helpers(&mut registry);
        if let Err(e) =
            registry.register_template_string(DIAGNOSTIC_TEMPLATE_ID, DIAGNOSTIC_TEMPLATE)
        {
            // The page ships with the binary; a compile failure here
            // means a broken build. Rendering falls back to plain text.
            tracing::error!(error = %e, "built-in diagnostic template failed to compile");
        }
        Self { registry }
    }

    /// Computes the first displayed source line for a fault.
    ///
    /// Without a line the default is 1. A fault wrapping a nested
    /// cause reports the offending line directly; a leaf fault reports
    /// the line after the offending construct, so it is shifted back
    /// by one (never below 1).
    pub fn first_line(fault: Option<&TemplateFault>) -> usize {
        match fault.and_then(|f| f.line.map(|line| (line, f.cause.is_some()))) {
            None => 1,
            Some((line, true)) => line.max(1),
            Some((line, false)) => line.saturating_sub(1).max(1),
        }
    }

    /// Renders the diagnostic body for `fault`. Always succeeds.
    pub fn render_error(&self, fault: &TemplateFault) -> String {
        let first_line = Self::first_line(Some(fault));

        let error_value =
            serde_json::to_value(fault).unwrap_or_else(|_| Value::Object(Map::new()));
        let context = Context::new(error_value)
            .combine("lang", json!(DIAGNOSTIC_LANG))
            .combine("firstLine", json!(first_line));

        // The title goes through the resolver chain so differently
        // shaped fault payloads still produce a usable heading.
        let template = context
            .lookup("template")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "<unknown template>".to_string());
        let message = context
            .lookup("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let context = context.combine("title", json!(format!("{template}: {message}")));

        match self.registry.render(DIAGNOSTIC_TEMPLATE_ID, &context.to_value()) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "diagnostic render failed, falling back to plain text");
                format!(
                    "Template error in {template}: {message} (first line {first_line})"
                )
            }
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fault(line: Option<usize>, cause: Option<&str>) -> TemplateFault {
        TemplateFault {
            template: "/broken".to_string(),
            message: "invalid handlebars syntax".to_string(),
            line,
            column: Some(7),
            cause: cause.map(str::to_string),
        }
    }

    #[test]
    fn first_line_defaults_to_one_without_a_record() {
        assert_eq!(ErrorReporter::first_line(None), 1);
        assert_eq!(ErrorReporter::first_line(Some(&fault(None, None))), 1);
    }

    #[test]
    fn leaf_fault_shifts_the_line_back_by_one() {
        assert_eq!(ErrorReporter::first_line(Some(&fault(Some(5), None))), 4);
        assert_eq!(ErrorReporter::first_line(Some(&fault(Some(2), None))), 1);
        assert_eq!(ErrorReporter::first_line(Some(&fault(Some(1), None))), 1);
    }

    #[test]
    fn fault_with_a_cause_keeps_the_line_as_is() {
        assert_eq!(
            ErrorReporter::first_line(Some(&fault(Some(5), Some("boom")))),
            5
        );
        assert_eq!(
            ErrorReporter::first_line(Some(&fault(Some(1), Some("boom")))),
            1
        );
    }

    #[test]
    fn diagnostic_body_carries_the_computed_first_line() {
        let reporter = ErrorReporter::new();
        let body = reporter.render_error(&fault(Some(5), None));
        assert!(body.contains("first-line: 4"));
        assert!(body.contains("invalid handlebars syntax"));
        assert!(body.contains("/broken"));
    }

    #[test]
    fn diagnostic_body_shows_the_cause_when_present() {
        let reporter = ErrorReporter::new();
        let body = reporter.render_error(&fault(Some(3), Some("helper exploded")));
        assert!(body.contains("first-line: 3"));
        assert!(body.contains("helper exploded"));
    }

    #[test]
    fn diagnostic_render_never_fails() {
        let reporter = ErrorReporter::new();
        // Hostile message content must not break the page.
        let hostile = TemplateFault {
            template: "/x".to_string(),
            message: "{{#if}} <script> & unclosed".to_string(),
            line: None,
            column: None,
            cause: None,
        };
        let body = reporter.render_error(&hostile);
        assert!(!body.is_empty());
        // Handlebars escapes interpolated values on the page.
        assert!(!body.contains("<script> &"));
    }
}

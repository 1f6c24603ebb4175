// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Loader-backed facade over the Handlebars engine.
//!
//! [`TemplateEngine`] binds a [`ResourceLoader`] to a shared
//! `handlebars::Handlebars` registry. Template identifiers map to
//! resources by appending the configured suffix (default `.hbs`);
//! compiled templates stay in the registry for the lifetime of the
//! process, so each identifier is parsed at most once.
//!
//! Failure classes are kept distinct on purpose:
//!
//! - a missing template resource surfaces as [`HbsError::NotFound`]
//!   (the pipeline turns this into a 404),
//! - a template that exists but does not parse surfaces as
//!   [`HbsError::Compile`] with the engine's source line,
//! - a template that parses but fails during evaluation surfaces as
//!   [`HbsError::Render`].
//!
//! # Thread Safety
//!
//! The registry sits behind an `RwLock`; render takes a read lock and
//! only the first compile of an identifier takes the write lock. The
//! engine is shared across concurrent requests via `Arc`.

use std::sync::{Arc, RwLock};

use handlebars::{Handlebars, RenderError, TemplateError};
use serde_json::Value;

use crate::error::{HbsError, Result, TemplateFault};
use crate::loader::ResourceLoader;

/// Default resource suffix appended to template identifiers.
pub const DEFAULT_SUFFIX: &str = ".hbs";

/// Shared, loader-backed template engine.
pub struct TemplateEngine {
    loader: Arc<dyn ResourceLoader>,
    suffix: String,
    registry: RwLock<Handlebars<'static>>,
}

impl TemplateEngine {
    /// Creates an engine reading template sources through `loader`.
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            loader,
            suffix: DEFAULT_SUFFIX.to_string(),
            registry: RwLock::new(Handlebars::new()),
        }
    }

    /// Overrides the resource suffix (e.g. `.html`).
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Ensures the template for `id` is compiled and cached.
    ///
    /// Loads `id + suffix` through the loader on a cache miss. A
    /// missing resource propagates as [`HbsError::NotFound`]; a parse
    /// failure becomes [`HbsError::Compile`].
    pub fn compile(&self, id: &str) -> Result<()> {
        if self.registry.read().unwrap().get_template(id).is_some() {
            return Ok(());
        }

        let source = self.loader.load(&format!("{}{}", id, self.suffix))?;

        let mut registry = self.registry.write().unwrap();
        // Another request may have compiled it while we were loading.
        if registry.get_template(id).is_some() {
            return Ok(());
        }
        registry
            .register_template_string(id, &source)
            .map_err(|e| HbsError::Compile(compile_fault(id, &e)))?;
        tracing::debug!(template = id, "compiled template");
        Ok(())
    }

    /// Renders the template for `id` against `data`.
    ///
    /// Compiles first if needed. Evaluation failures (unknown helper,
    /// missing partial, bad expression) become [`HbsError::Render`].
    pub fn render(&self, id: &str, data: &Value) -> Result<String> {
        self.compile(id)?;
        self.registry
            .read()
            .unwrap()
            .render(id, data)
            .map_err(|e| HbsError::Render(render_fault(id, &e)))
    }
}

fn compile_fault(id: &str, err: &TemplateError) -> TemplateFault {
    TemplateFault {
        template: id.to_string(),
        message: err.reason.to_string(),
        line: err.line_no,
        column: err.column_no,
        // Parse failures are leaf errors; they never wrap a cause.
        cause: None,
    }
}

fn render_fault(id: &str, err: &RenderError) -> TemplateFault {
    use std::error::Error;
    TemplateFault {
        template: err.template_name.clone().unwrap_or_else(|| id.to_string()),
        message: err.desc.clone(),
        line: err.line_no,
        column: err.column_no,
        cause: err.source().map(|cause| cause.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use serde_json::json;

    fn engine_with(resources: &[(&str, &str)]) -> TemplateEngine {
        let loader = MemoryLoader::new();
        for (path, content) in resources {
            loader.add_resource(path, content);
        }
        TemplateEngine::new(Arc::new(loader))
    }

    #[test]
    fn compiles_and_renders() {
        let engine = engine_with(&[("/hello.hbs", "Hi {{name}}")]);
        let out = engine.render("/hello", &json!({ "name": "Ana" })).unwrap();
        assert_eq!(out, "Hi Ana");
    }

    #[test]
    fn missing_template_is_not_found() {
        let engine = engine_with(&[]);
        assert!(matches!(
            engine.compile("/nope"),
            Err(HbsError::NotFound(_))
        ));
    }

    #[test]
    fn broken_template_is_a_compile_fault_with_a_line() {
        let engine = engine_with(&[("/broken.hbs", "line one\n{{#if cond}}x{{/unless}}")]);
        match engine.compile("/broken") {
            Err(HbsError::Compile(fault)) => {
                assert_eq!(fault.template, "/broken");
                assert!(fault.line.is_some());
                assert!(fault.cause.is_none());
            }
            other => panic!("expected Compile fault, got {other:?}"),
        }
    }

    #[test]
    fn evaluation_failure_is_a_render_fault() {
        let engine = engine_with(&[("/bad.hbs", "{{unknown_helper 1}}")]);
        match engine.render("/bad", &json!({})) {
            Err(HbsError::Render(fault)) => {
                assert!(!fault.message.is_empty());
            }
            other => panic!("expected Render fault, got {other:?}"),
        }
    }

    #[test]
    fn compiled_templates_are_cached() {
        let loader = MemoryLoader::new();
        loader.add_resource("/hello.hbs", "Hi {{name}}");
        let engine = TemplateEngine::new(Arc::new(loader.clone()));

        engine.compile("/hello").unwrap();
        loader.remove_resource("/hello.hbs");

        // The source is gone but the compiled form is still served.
        let out = engine.render("/hello", &json!({ "name": "Ana" })).unwrap();
        assert_eq!(out, "Hi Ana");
    }

    #[test]
    fn custom_suffix_is_honored() {
        let loader = MemoryLoader::new();
        loader.add_resource("/page.html", "<p>{{x}}</p>");
        let engine = TemplateEngine::new(Arc::new(loader)).with_suffix(".html");
        assert_eq!(engine.render("/page", &json!({ "x": 1 })).unwrap(), "<p>1</p>");
    }
}

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The request-to-render pipeline.
//!
//! Maps a request path to a template identifier, assembles the data
//! context, and renders. Per request the flow is:
//!
//! ```text
//! Start -> ResolvingTemplate -> LoadingContext -> Rendering
//!       -> Success | TemplateMissing | EngineFailure
//! ```
//!
//! Every failure is terminal for the request. A missing template maps
//! to a not-found response; compile and render faults are recovered by
//! the diagnostic page ([`crate::report`]); anything else propagates.

use std::sync::Arc;

use crate::context::ContextAssembler;
use crate::engine::TemplateEngine;
use crate::error::Result;
use crate::loader::ResourceLoader;
use crate::options::Options;

/// Request method. POST is handled identically to GET; no other verbs
/// reach the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

/// Raw request information, immutable per invocation.
#[derive(Debug, Clone)]
pub struct RawRequest {
    /// The request path, as received.
    pub path: String,
    /// The mount prefix to strip from the path.
    pub mount_prefix: String,
    /// The request method.
    pub method: RequestMethod,
}

impl RawRequest {
    /// Creates a GET request for `path` under `mount_prefix`.
    pub fn get(path: impl Into<String>, mount_prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mount_prefix: mount_prefix.into(),
            method: RequestMethod::Get,
        }
    }

    /// The template identifier this request resolves to.
    pub fn template_id(&self) -> String {
        template_id(&self.path, &self.mount_prefix)
    }
}

/// Resolves a request path to a template identifier.
///
/// Removes the first occurrence of the mount prefix anywhere in the
/// path (looser than prefix-anchored stripping, kept for parity with
/// existing deployments) and the trailing file extension. A dot inside
/// a directory name is not an extension.
pub fn template_id(path: &str, mount_prefix: &str) -> String {
    let stripped = if mount_prefix.is_empty() {
        path.to_string()
    } else {
        path.replacen(mount_prefix, "", 1)
    };
    remove_extension(&stripped)
}

fn remove_extension(path: &str) -> String {
    match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => path[..dot].to_string(),
        _ => path.to_string(),
    }
}

/// The rendered result of a successful request.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// The rendered template output.
    pub body: String,
    /// The configured response MIME type.
    pub content_type: String,
}

/// Orchestrates loader, assembler, and engine for the primary path.
///
/// Process-lifetime, shared read-only across concurrent requests.
pub struct RenderPipeline {
    engine: Arc<TemplateEngine>,
    assembler: ContextAssembler,
    options: Options,
}

impl RenderPipeline {
    /// Creates a pipeline serving templates and data through `loader`.
    pub fn new(loader: Arc<dyn ResourceLoader>, engine: Arc<TemplateEngine>, options: Options) -> Self {
        Self {
            engine,
            assembler: ContextAssembler::new(loader),
            options,
        }
    }

    /// Handles one request: resolve, compile, assemble, render.
    ///
    /// Compilation and data loading have no required relative order;
    /// both complete before render. A missing companion data document
    /// is not an error; a missing template resource is
    /// [`crate::HbsError::NotFound`]; engine failures carry their
    /// fault record for the diagnostic page.
    pub fn handle(&self, request: &RawRequest) -> Result<Rendered> {
        let id = request.template_id();
        tracing::debug!(path = %request.path, template = %id, "handling request");

        self.engine.compile(&id)?;
        let data = self.assembler.build_data_context(&id)?;
        let body = self.engine.render(&id, &data)?;

        Ok(Rendered {
            body,
            content_type: self.options.content_type().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HbsError;
    use crate::loader::MemoryLoader;

    #[test]
    fn template_id_strips_prefix_and_extension() {
        assert_eq!(template_id("/mount/hello.html", "/mount"), "/hello");
        assert_eq!(template_id("/hello.hbs", ""), "/hello");
        assert_eq!(template_id("/hello", ""), "/hello");
    }

    #[test]
    fn prefix_removal_is_first_occurrence_anywhere() {
        // Loose substring removal, not anchored to the start.
        assert_eq!(template_id("/a/mount/hello", "/mount"), "/a/hello");
        assert_eq!(template_id("/mount/mount/x.html", "/mount"), "/mount/x");
    }

    #[test]
    fn dots_in_directories_are_not_extensions() {
        assert_eq!(template_id("/v1.2/hello", ""), "/v1.2/hello");
        assert_eq!(template_id("/v1.2/hello.html", ""), "/v1.2/hello");
    }

    fn pipeline_with(resources: &[(&str, &str)]) -> RenderPipeline {
        let loader = MemoryLoader::new();
        for (path, content) in resources {
            loader.add_resource(path, content);
        }
        let loader: Arc<dyn ResourceLoader> = Arc::new(loader);
        let engine = Arc::new(TemplateEngine::new(loader.clone()));
        RenderPipeline::new(loader, engine, Options::new("text/html", "/content"))
    }

    #[test]
    fn renders_template_with_companion_data() {
        let pipeline = pipeline_with(&[
            ("/hello.hbs", "Hi {{name}}"),
            ("/hello.js", r#"{name: "Ana"}"#),
        ]);
        let rendered = pipeline
            .handle(&RawRequest::get("/mount/hello", "/mount"))
            .unwrap();
        assert_eq!(rendered.body, "Hi Ana");
        assert_eq!(rendered.content_type, "text/html");
    }

    #[test]
    fn missing_companion_data_renders_against_empty_object() {
        let pipeline = pipeline_with(&[("/hello.hbs", "Hi {{name}}!")]);
        let rendered = pipeline.handle(&RawRequest::get("/hello", "")).unwrap();
        assert_eq!(rendered.body, "Hi !");
    }

    #[test]
    fn missing_template_propagates_not_found() {
        let pipeline = pipeline_with(&[]);
        assert!(matches!(
            pipeline.handle(&RawRequest::get("/nope", "")),
            Err(HbsError::NotFound(_))
        ));
    }

    #[test]
    fn malformed_companion_data_propagates() {
        let pipeline = pipeline_with(&[
            ("/hello.hbs", "Hi"),
            ("/hello.js", "{oops"),
        ]);
        assert!(matches!(
            pipeline.handle(&RawRequest::get("/hello", "")),
            Err(HbsError::Data { .. })
        ));
    }
}

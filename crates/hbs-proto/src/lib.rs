// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Request-to-render pipeline for prototyping Handlebars templates.
//!
//! hbs-proto resolves an incoming HTTP request to a named template,
//! loads the template's companion data document, renders the template
//! against that data, and returns the result. On failure it renders a
//! diagnostic page pinpointing the source line of the error, or a
//! not-found response when the template resource is absent.
//!
//! # Conventions
//!
//! - A request path `<mount>/<name>[.<ext>]` resolves to the template
//!   resource `<name>.hbs` under the content root.
//! - The companion data document lives at `<name>.js` and contains a
//!   lenient-JSON object (unquoted keys and comments are fine). An
//!   absent document means `{}`.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hbs_proto::{
//!     MemoryLoader, Options, RawRequest, RenderPipeline, ResourceLoader, TemplateEngine,
//! };
//!
//! let loader = MemoryLoader::new();
//! loader.add_resource("/hello.hbs", "Hi {{name}}");
//! loader.add_resource("/hello.js", r#"{name: "Ana"}"#);
//!
//! let loader: Arc<dyn ResourceLoader> = Arc::new(loader);
//! let engine = Arc::new(TemplateEngine::new(loader.clone()));
//! let pipeline = RenderPipeline::new(loader, engine, Options::default());
//!
//! let rendered = pipeline.handle(&RawRequest::get("/hello.html", "")).unwrap();
//! assert_eq!(rendered.body, "Hi Ana");
//! ```
//!
//! # Architecture
//!
//! - **Loader** ([`loader`]): reads named resources from the content
//!   root, reporting absence distinctly from other I/O failure
//! - **Engine** ([`engine`]): loader-backed compile/render facade over
//!   a shared Handlebars registry with a process-lifetime template cache
//! - **Context** ([`context`]): lenient-JSON companion data, layered
//!   contexts, and the value-resolution strategy chain
//! - **Pipeline** ([`pipeline`]): orchestrates the primary path
//! - **Report** ([`report`]): renders the diagnostic page for compile
//!   and render faults on an isolated engine instance

pub mod context;
pub mod engine;
pub mod error;
pub mod loader;
pub mod options;
pub mod pipeline;
pub mod report;

pub use context::{Context, ContextAssembler, ValueResolver};
pub use engine::TemplateEngine;
pub use error::{HbsError, Result, TemplateFault};
pub use loader::{FileSystemLoader, MemoryLoader, ResourceLoader};
pub use options::Options;
pub use pipeline::{RawRequest, Rendered, RenderPipeline, RequestMethod};
pub use report::ErrorReporter;

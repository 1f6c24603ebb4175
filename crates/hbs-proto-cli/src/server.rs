// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP server for template prototyping.
//!
//! This is a thin adapter that converts HTTP requests to
//! [`RawRequest`], calls the render pipeline, and maps the outcome to
//! an HTTP response:
//!
//! - success: 200 with the configured content type,
//! - missing template: 404 with a `NOT FOUND: <detail>` body,
//! - compile/render fault: the diagnostic page,
//! - anything else: 500 with a short message.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Router,
};
use tower_http::services::ServeDir;

use hbs_proto::{
    ErrorReporter, FileSystemLoader, HbsError, Options, RawRequest, RenderPipeline,
    RequestMethod, ResourceLoader, TemplateEngine,
};

/// Startup configuration for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Content root holding template and data resources.
    pub dir: String,
    /// Mount path stripped from request paths.
    pub mount: String,
    /// Response content type for rendered templates.
    pub content_type: String,
    /// Template resource suffix.
    pub suffix: String,
    /// Optional directory of static assets served under `/public`.
    pub public_dir: Option<String>,
}

/// Shared application state, built once at startup.
pub struct AppState {
    pipeline: RenderPipeline,
    reporter: ErrorReporter,
    mount: String,
    public_dir: Option<PathBuf>,
}

impl AppState {
    /// Wires loader, engine, pipeline, and reporter from `config`.
    pub fn new(config: ServerConfig) -> Self {
        let loader: Arc<dyn ResourceLoader> = Arc::new(FileSystemLoader::new(&config.dir));
        let engine = Arc::new(TemplateEngine::new(loader.clone()).with_suffix(config.suffix));
        let options = Options::new(config.content_type, config.dir);

        Self {
            pipeline: RenderPipeline::new(loader, engine, options),
            reporter: ErrorReporter::new(),
            mount: config.mount,
            public_dir: config.public_dir.map(PathBuf::from),
        }
    }
}

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new();
    if let Some(public_dir) = &state.public_dir {
        router = router.nest_service("/public", ServeDir::new(public_dir));
    }
    router.fallback(render_handler).with_state(state)
}

/// Creates and starts the prototyping server.
pub async fn create_server(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr, "serving templates");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Fallback handler: every non-static path is a template request.
async fn render_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let method = match *request.method() {
        Method::GET => RequestMethod::Get,
        Method::POST => RequestMethod::Post,
        _ => return (StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response(),
    };

    let raw = RawRequest {
        path: request.uri().path().to_string(),
        mount_prefix: state.mount.clone(),
        method,
    };

    match state.pipeline.handle(&raw) {
        Ok(rendered) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, rendered.content_type)
            .body(Body::from(rendered.body))
            .unwrap_or_else(|_| {
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to build response").into_response()
            }),
        Err(HbsError::NotFound(detail)) => {
            (StatusCode::NOT_FOUND, format!("NOT FOUND: {detail}")).into_response()
        }
        Err(HbsError::Compile(fault)) | Err(HbsError::Render(fault)) => {
            tracing::warn!(
                template = %fault.template,
                line = fault.line,
                "engine failure, rendering diagnostic page"
            );
            // Status stays 200 on engine failures, matching the
            // original servlet behavior (see DESIGN.md).
            Html(state.reporter.render_error(&fault)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, path = %raw.path, "unhandled failure");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hbs_proto_cli::server::{self, AppState, ServerConfig};

#[derive(Parser)]
#[command(name = "hbs-proto")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Prototype Handlebars templates over HTTP", long_about = None)]
struct Cli {
    /// Content root holding template and data files
    #[arg(short, long, default_value = ".")]
    dir: String,

    /// Port to serve on
    #[arg(short, long, default_value = "6780")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Mount path stripped from request paths
    #[arg(long, default_value = "")]
    context: String,

    /// Response content type for rendered templates
    #[arg(long, default_value = "text/html")]
    content_type: String,

    /// Template resource suffix
    #[arg(long, default_value = ".hbs")]
    suffix: String,

    /// Directory of static assets served under /public
    #[arg(long)]
    public_dir: Option<String>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let state = Arc::new(AppState::new(ServerConfig {
        dir: cli.dir,
        mount: cli.context,
        content_type: cli.content_type,
        suffix: cli.suffix,
        public_dir: cli.public_dir,
    }));

    let addr = format!("{}:{}", cli.host, cli.port);
    server::create_server(&addr, state).await
}

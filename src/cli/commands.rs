use crate::config::ApiConfig;
use crate::controller::Controller;
use crate::demo;
use crate::error::ApiError;
use crate::server::{ApiService, RawRequestParts};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use std::io::Write;
use std::path::PathBuf;

/// Command-line interface for helmsman
///
/// Runs requests through the demonstration controller tree without a network
/// server, which makes the routing and documentation behaviour easy to inspect.
#[derive(Parser, Debug)]
#[command(name = "helmsman")]
#[command(about = "Convention-driven API router", long_about = None)]
pub struct Cli {
    /// TOML configuration file (defaults to HELMSMAN_* environment variables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Send one request through the router and print the raw HTTP response
    Call {
        /// HTTP verb (GET, POST, ...)
        method: String,

        /// Request path, optionally with a query string
        path: String,

        /// Request body; JSON bodies are sent as application/json
        #[arg(short, long)]
        body: Option<String>,

        /// Extra header as `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Preferred response format (json, yaml, text) or a raw Accept value
        #[arg(short, long)]
        accept: Option<String>,
    },
    /// Print the documentation of the controller at a path
    Docs {
        /// Path of a controller, `/` for the root
        #[arg(default_value = "/")]
        path: String,
    },
}

/// Parse the command line and run the selected command, writing to stdout.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the arguments are
/// malformed, or writing the output fails.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &mut out)
}

/// Run a parsed command against the demonstration tree.
///
/// # Errors
///
/// See [`run_cli`].
pub fn execute<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ApiConfig::from_file(path)?,
        None => ApiConfig::from_env(),
    };

    match &cli.command {
        Commands::Call {
            method,
            path,
            body,
            headers,
            accept,
        } => {
            let raw = build_request(method, path, body.as_deref(), headers, accept.as_deref())?;
            let service = ApiService::new(demo::root_controller).with_config(config);
            service.respond(&raw, out)?;
            writeln!(out)?;
            Ok(())
        }
        Commands::Docs { path } => {
            let controller = controller_at(demo::root_controller(), path)?;
            let documentation = controller.documentation();
            serde_json::to_writer_pretty(&mut *out, &documentation)
                .context("Failed to write documentation")?;
            writeln!(out)?;
            Ok(())
        }
    }
}

fn build_request(
    method: &str,
    path: &str,
    body: Option<&str>,
    headers: &[String],
    accept: Option<&str>,
) -> Result<RawRequestParts> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{method}'"))?;
    let uri = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    let mut raw = RawRequestParts::new(method, uri);

    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow!("Header '{header}' must look like 'Name: value'"))?;
        raw = raw.header(name.trim(), value.trim());
    }

    if let Some(accept) = accept {
        raw = raw.header("Accept", media_type_for(accept));
    }

    if let Some(body) = body {
        raw = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => raw.json(&value),
            Err(_) => raw.body(body),
        };
    }
    Ok(raw)
}

fn media_type_for(format: &str) -> &str {
    match format.to_ascii_lowercase().as_str() {
        "json" => "application/json",
        "yaml" | "yml" => "application/x-yaml",
        "text" | "txt" => "text/plain",
        _ => format,
    }
}

/// Walk child controllers from `root` along `path`.
fn controller_at(root: Controller, path: &str) -> Result<Controller> {
    let mut controller = root;
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !controller.has_child_controller(segment) {
            return Err(ApiError::RouteNotFound {
                segment: segment.to_string(),
            }
            .into());
        }
        controller = controller.get_child_controller(segment)?;
    }
    Ok(controller)
}

//! Resilient HTTP client CLI.
//!
//! Issues a single request through [`HttpClient`], so the configured retry
//! policy or circuit breaker applies exactly as it would in a library caller.
//!
//! ```text
//! resilient-http [--config FILE] [--base-url URL] [-H name:value]... [--stats]
//!     <get|post|put|patch|delete> <URL> [--param k=v]... [--data JSON]
//! resilient-http check --config FILE
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

use resilient_http::config::{load_config, AppConfig};
use resilient_http::lifecycle::signals::trigger_on_signal;
use resilient_http::observability::init_logging;
use resilient_http::{HttpClient, Method, RequestConfig, Shutdown};

#[derive(Parser)]
#[command(name = "resilient-http")]
#[command(about = "HTTP client with retry and circuit breaking", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL, overrides the config file
    #[arg(short, long)]
    base_url: Option<String>,

    /// Extra header, as name:value
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Print circuit breaker stats after the request
    #[arg(long)]
    stats: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get(RequestArgs),
    /// Send a POST request
    Post(RequestArgs),
    /// Send a PUT request
    Put(RequestArgs),
    /// Send a PATCH request
    Patch(RequestArgs),
    /// Send a DELETE request
    Delete(RequestArgs),
    /// Validate the configuration file and exit
    Check,
}

#[derive(Args)]
struct RequestArgs {
    /// Request URL, absolute or relative to the base URL
    url: String,

    /// Query parameter, as key=value
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// JSON request body
    #[arg(short, long)]
    data: Option<String>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected name:value, got '{}'", raw))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut app_config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    let (method, args) = match cli.command {
        Commands::Check => {
            let path = cli.config.ok_or("check requires --config")?;
            println!("{}: configuration OK", path.display());
            return Ok(());
        }
        Commands::Get(args) => (Method::Get, args),
        Commands::Post(args) => (Method::Post, args),
        Commands::Put(args) => (Method::Put, args),
        Commands::Patch(args) => (Method::Patch, args),
        Commands::Delete(args) => (Method::Delete, args),
    };

    init_logging(&app_config.observability)?;

    if let Some(base_url) = cli.base_url {
        app_config.client.base_url = Some(base_url);
    }
    for (name, value) in cli.headers {
        app_config.client.headers.insert(name, value);
    }

    let shutdown = Shutdown::new();
    tokio::spawn(trigger_on_signal(shutdown.clone()));

    let client = HttpClient::builder(app_config.client)
        .shutdown_signal(shutdown.subscribe())
        .build()?;

    let mut request = RequestConfig::new(method, args.url);
    for (key, value) in args.params {
        request = request.param(key, value);
    }
    if let Some(raw) = args.data {
        let data: Value = serde_json::from_str(&raw)?;
        request = request.data(data);
    }

    let outcome = client.execute(request).await;

    if cli.stats {
        if let Some(stats) = client.circuit_breaker_stats() {
            eprintln!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    match outcome {
        Ok(response) => {
            let printed = json!({
                "status": response.status,
                "status_text": response.status_text,
                "headers": response.headers,
                "data": response.data,
            });
            println!("{}", serde_json::to_string_pretty(&printed)?);
            Ok(())
        }
        Err(e) => {
            if let Some(response) = e.response() {
                eprintln!("{}", serde_json::to_string_pretty(&response.data)?);
            }
            Err(e.into())
        }
    }
}

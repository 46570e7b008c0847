use std::path::{Path, PathBuf};
use std::process::ExitCode;

use axum::http::Method;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use api_gateway::config::{self, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use api_gateway::proxy::dispatcher::outbound_uri;
use api_gateway::routing::{rewrite_path, RouteMatch, RouteTable, Router};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the API gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file and print its route table
    Check {
        #[arg(short, long, env = CONFIG_PATH_ENV, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Show how a request would be routed, without sending it
    Resolve {
        #[arg(short, long, env = CONFIG_PATH_ENV, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Request method, e.g. GET
        method: String,
        /// Request path, optionally with a query string
        path: String,
    },
    /// List the route table of a running gateway
    Routes {
        #[arg(short, long, default_value = "http://localhost:8081")]
        url: String,
    },
    /// Probe a running gateway's health endpoint
    Health {
        #[arg(short, long, default_value = "http://localhost:8081")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { config } => check(&config),
        Commands::Resolve { config, method, path } => resolve(&config, &method, &path),
        Commands::Routes { url } => fetch(&format!("{}/admin/routes", url)).await,
        Commands::Health { url } => fetch(&format!("{}/healthz", url)).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_table(path: &Path) -> Result<RouteTable, Box<dyn std::error::Error>> {
    let config = config::load_config(path)?;
    Ok(RouteTable::from_config(&config.routes, &config.timeouts)?)
}

fn check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(path)?;
    println!("{}", serde_json::to_string_pretty(&table.summaries())?);
    Ok(())
}

fn resolve(path: &Path, method: &str, target: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = Router::new(load_table(path)?.into());
    let decision = decide(&router, method, target)?;
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

/// The routing decision for `method target` as JSON.
fn decide(router: &Router, method: &str, target: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let method = Method::from_bytes(method.as_bytes())?;
    let (request_path, query) = match target.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (target, None),
    };

    let decision = match router.resolve(request_path, &method) {
        RouteMatch::Matched { route, index } => {
            let outbound_path = rewrite_path(route.pattern(), request_path);
            let outbound_url = outbound_uri(route, &outbound_path, query)?;
            json!({
                "decision": "forward",
                "route_index": index,
                "pattern": route.pattern(),
                "outbound_url": outbound_url.to_string(),
            })
        }
        RouteMatch::MethodNotAllowed { route, index } => json!({
            "decision": "method_rejected",
            "status": 405,
            "route_index": index,
            "pattern": route.pattern(),
            "allowed_methods": route.allowed_methods().iter().map(Method::as_str).collect::<Vec<_>>(),
        }),
        RouteMatch::NotFound => json!({
            "decision": "not_found",
            "status": 404,
        }),
    };
    Ok(decision)
}

async fn fetch(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let res = reqwest::Client::new().get(url).send().await?;
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        return Err(format!("{} returned status {}: {}", url, status, text).into());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

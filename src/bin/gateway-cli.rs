use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use edge_gateway::config::{load_config, GatewayConfig};
use edge_gateway::security::Allowlist;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the edge gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search through the gateway
    Search { query: String },
    /// Fetch a URL through the gateway passthrough
    Fetch { target: String },
    /// Check a URL against the allowlist locally
    Check {
        target: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Load and validate a config file
    Validate { config: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Search { query } => {
            let res = client
                .get(format!("{}/search", cli.url))
                .query(&[("q", query.as_str())])
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Fetch { target } => {
            let res = client
                .get(format!("{}/proxy", cli.url))
                .query(&[("url", target.as_str())])
                .send()
                .await?;
            println!("{}", res.status());
            for (name, value) in res.headers() {
                println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
            let body = res.bytes().await?;
            println!("\n{} bytes", body.len());
        }
        Commands::Check { target, config } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => GatewayConfig::default(),
            };
            let allowlist = Allowlist::new(config.allowlist.entries);
            if allowlist.is_allowed(&target) {
                println!("allowed: {}", target);
            } else {
                println!("denied: {}", target);
                std::process::exit(1);
            }
        }
        Commands::Validate { config } => {
            let config = load_config(&config)?;
            println!(
                "ok: {} allowlist entries, {} families",
                config.allowlist.entries.len(),
                config.families.len()
            );
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

use std::fs;

use budget_engine::api::{self, Cli, Command};
use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "budget_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let policy = match api::build_policy(&cli.policy) {
        Ok(policy) => policy,
        Err(msg) => {
            error!("Invalid tax policy: {msg}");
            std::process::exit(2);
        }
    };

    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = api::run_http_server(port, policy).await {
                error!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Calculate { input, pretty } => {
            let json = match fs::read_to_string(&input) {
                Ok(json) => json,
                Err(e) => {
                    error!("Cannot read {}: {e}", input.display());
                    std::process::exit(1);
                }
            };
            let response = api::request_from_json(&json).and_then(|request| {
                api::run_calculation(&request, &policy).map_err(|e| e.to_string())
            });
            let response = match response {
                Ok(response) => response,
                Err(msg) => {
                    error!("Budget calculation failed: {msg}");
                    std::process::exit(1);
                }
            };
            let rendered = if pretty {
                serde_json::to_string_pretty(&response)
            } else {
                serde_json::to_string(&response)
            };
            match rendered {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    error!("Cannot serialize report: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

use common::utils::logging::{init_logging, LogFormat};
use configs::AppConfig;
use models::{errors::ModelError, parse_owner_id, validate_kit_name};

#[derive(Parser)]
#[command(name = "kitstore", version, about = "Inspect and maintain per-player kit files")]
struct Cli {
    /// Without a subcommand, prints every owner and their kit count.
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print an owner's kits as JSON.
    Show {
        #[arg(value_parser = parse_owner_id)]
        owner: Uuid,
    },
    /// Delete one kit from an owner's collection.
    Delete {
        #[arg(value_parser = parse_owner_id)]
        owner: Uuid,
        #[arg(value_parser = parse_kit_name)]
        kit: String,
    },
}

fn parse_kit_name(raw: &str) -> Result<String, ModelError> {
    validate_kit_name(raw)?;
    Ok(raw.to_string())
}

fn main() -> ExitCode {
    // load .env before reading RUST_LOG / CONFIG_PATH
    dotenv().ok();
    let cli = Cli::parse();

    let config_path = configs::config_path();
    let (cfg, defaulted) = match AppConfig::load_or_default_from(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            // logging is not configured yet
            eprintln!("kitstore: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(LogFormat::from_name(&cfg.logging.format));
    if defaulted {
        warn!(service = "kitstore", event = "config_fallback", %config_path, "config file not found; using defaults");
    }

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "kitstore", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(&config_path, cfg, cli.command)) {
        Ok(code) => code,
        Err(e) => {
            error!(service = "kitstore", event = "run_failed", error = %e, "kitstore failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config_path: &str, cfg: AppConfig, command: Option<Cmd>) -> anyhow::Result<ExitCode> {
    let store = service::runtime::open_store(config_path, &cfg.storage).await?;

    match command {
        None => {
            let owners = store.owners().await;
            info!(service = "kitstore", event = "summary", dir = %store.dir().display(), owners = owners.len(), "kit store summary");
            for owner in owners {
                println!("{owner}\t{}", store.kit_count(&owner).await);
            }
        }
        Some(Cmd::Show { owner }) => {
            let kits = store.get_owner_kits(&owner).await;
            println!("{}", serde_json::to_string_pretty(&kits)?);
        }
        Some(Cmd::Delete { owner, kit }) => {
            if !store.delete_kit(&owner, &kit).await? {
                warn!(service = "kitstore", %owner, %kit, "no such kit");
                return Ok(ExitCode::FAILURE);
            }
            info!(service = "kitstore", event = "kit_deleted", %owner, %kit, "kit deleted");
        }
    }
    Ok(ExitCode::SUCCESS)
}

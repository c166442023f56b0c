mod browser;
mod notifier;
mod prompt;
mod watch;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vaxslot_client::{search_slots, AuthOutcome, SessionClient};
use vaxslot_core::{load_search_config, AppConfig};

use crate::prompt::PromptOtp;

#[derive(Debug, Parser)]
#[command(name = "vaxslot")]
#[command(about = "Watch the vaccination-booking API for open appointment slots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Authenticate once with an OTP and report the result
    Login,
    /// List beneficiary reference ids registered to the account
    Beneficiaries,
    /// Run a single search pass and print the matching sessions
    Search {
        /// Search filters file (overrides VAXSLOT_SEARCH_CONFIG_PATH)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Search periodically, notifying and opening the dashboard on matches
    Watch {
        /// Search filters file (overrides VAXSLOT_SEARCH_CONFIG_PATH)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Minutes between passes (overrides VAXSLOT_POLL_INTERVAL_MINS)
        #[arg(long)]
        interval_mins: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("no command given; run `vaxslot --help` for usage");
        return Ok(());
    };

    let config = vaxslot_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut client = SessionClient::new(&config, PromptOtp::stdin())?;

    match command {
        Commands::Login => match client.authenticate().await? {
            AuthOutcome::Authenticated { attempts, .. } => {
                println!("authenticated after {attempts} OTP attempt(s)");
            }
            AuthOutcome::Failed { attempts } => {
                anyhow::bail!("authentication failed after {attempts} OTP attempt(s)");
            }
        },
        Commands::Beneficiaries => {
            for id in client.fetch_beneficiaries().await? {
                println!("{id}");
            }
        }
        Commands::Search { config: path } => {
            let filters = load_search_config(&search_config_path(&config, path))?;
            let matches = search_slots(&mut client, &filters).await?;
            if matches.is_empty() {
                println!("no matching sessions");
            }
            for m in &matches {
                println!("{m}");
            }
        }
        Commands::Watch {
            config: path,
            interval_mins,
        } => {
            let filters = load_search_config(&search_config_path(&config, path))?;
            let mins = interval_mins.unwrap_or(config.poll_interval_mins).max(1);
            let interval = Duration::from_secs(mins.saturating_mul(60));
            watch::run_watch(&mut client, &filters, interval).await?;
        }
    }

    Ok(())
}

fn search_config_path(config: &AppConfig, override_path: Option<PathBuf>) -> PathBuf {
    override_path.unwrap_or_else(|| config.search_config_path.clone())
}

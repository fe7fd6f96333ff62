//! CLI command definitions and dispatch.
//!
//! Each subcommand lives in its own submodule:
//! - `run`: create (or reuse) a webset, wait for it and export the results
//! - `check`: export the results of an existing webset if it is idle
//! - `search`: one-off search with a text report
//! - `export`: turn a saved results file into a spreadsheet

mod check;
mod export;
mod run;
mod search;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use webset_services::{Settings, WebsetService};

pub use check::cmd_check;
pub use export::cmd_export;
pub use run::cmd_run;
pub use search::cmd_search;

const DEFAULT_CONFIG: &str = "config/config.json";

/// Exa Websets CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a webset (or reuse one), wait for it and save formatted results
    Run {
        /// Path to the job configuration file
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// Output JSON file; a spreadsheet is written next to it
        #[arg(short, long, default_value = "results/webset_results.json")]
        output: PathBuf,
        /// Use an existing webset instead of creating a new one
        #[arg(long)]
        webset_id: Option<String>,
        /// Register a webhook notified when the webset becomes idle
        #[arg(long)]
        webhook_url: Option<String>,
        /// Seconds to wait for the webset to finish
        #[arg(long, default_value = "300")]
        timeout: u64,
    },
    /// Check an existing webset and save its results if it is idle
    Check {
        /// Webset to check
        #[arg(long)]
        webset_id: String,
        /// Path to the job configuration file
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// Output JSON file; a spreadsheet is written next to it
        #[arg(short, long, default_value = "results/webset_check_results.json")]
        output: PathBuf,
        /// Also save the raw items as raw_<output file>
        #[arg(long)]
        raw: bool,
    },
    /// Search the web and save a text report
    Search {
        /// Search query
        #[arg(long, default_value = "Top AI research labs focusing on large language models")]
        query: String,
        /// Output text file; a spreadsheet is written next to it
        #[arg(short, long, default_value = "results/search_results.txt")]
        output: PathBuf,
        /// Number of results
        #[arg(short, long, default_value = "3")]
        limit: u32,
    },
    /// Convert a saved results JSON file into a spreadsheet
    Export {
        /// Results file (`{"results": [...]}`)
        #[arg(long, default_value = "results/webset_results.json")]
        input: PathBuf,
        /// Spreadsheet path, defaults to the input with an .xlsx extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Build the webset service from environment settings.
///
/// Fails when the API key is missing.
pub fn build_service() -> anyhow::Result<WebsetService> {
    let settings = Settings::from_env()?;
    let client = settings.exa_client()?;
    let id_map = settings.load_id_map()?;

    Ok(
        WebsetService::new(Arc::new(client), id_map, settings.unmatched_policy)
            .with_poll_interval(settings.poll_interval),
    )
}

/// Run the specified CLI command
pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            config,
            output,
            webset_id,
            webhook_url,
            timeout,
        } => {
            cmd_run(
                &build_service()?,
                &config,
                &output,
                webset_id.as_deref(),
                webhook_url.as_deref(),
                timeout,
            )
            .await
        }
        Commands::Check {
            webset_id,
            config,
            output,
            raw,
        } => cmd_check(&build_service()?, &webset_id, &config, &output, raw).await,
        Commands::Search {
            query,
            output,
            limit,
        } => cmd_search(&build_service()?, &query, &output, limit).await,
        // Works on a saved file, no API key needed
        Commands::Export { input, output } => cmd_export(&input, output.as_deref()).map(|_| ()),
    }
}

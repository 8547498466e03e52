mod config;
mod error;
mod models;
mod pipeline;
mod scraper;
mod server;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;
use crate::models::Site;
use crate::pipeline::Pipeline;
use crate::scraper::ContestScraper;

#[derive(Parser)]
#[command(name = "contest-radar", about = "Upcoming programming contests", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Print upcoming contests for one site as JSON
    Fetch {
        #[arg(value_enum)]
        site: Site,
    },

    /// Fetch every site concurrently; failures are reported per site
    All,

    /// Serve one GET endpoint per site
    Serve {
        /// Overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "contest_radar=info,warn",
        1 => "contest_radar=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;
    let scraper = Arc::new(ContestScraper::from_config(&config)?);

    match cli.command {
        Command::Fetch { site } => {
            let _t = utils::Timer::start(format!("{} fetch", site));
            let contests = scraper
                .upcoming(site)
                .await
                .with_context(|| format!("{} adapter failed", site))?;
            println!("{}", serde_json::to_string_pretty(&contests)?);
        }

        Command::All => {
            let _t = utils::Timer::start("All sites");
            let (outcomes, stats) = Pipeline::new(scraper).run(&Site::ALL).await;

            let mut out = Map::new();
            for (site, outcome) in outcomes {
                let value = match outcome {
                    Ok(contests) => serde_json::to_value(contests)?,
                    Err(e) => json!({ "error": e.to_string() }),
                };
                out.insert(site.slug().to_string(), value);
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(out))?);
            info!(
                "Done: {} sites ok, {} failed, {} contests",
                stats.sites_ok, stats.sites_failed, stats.contests
            );
        }

        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(scraper, &config.server).await?;
        }
    }

    Ok(())
}

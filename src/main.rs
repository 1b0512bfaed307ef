//! # Blog Digest
//!
//! A daily batch job that follows a blog's RSS feed, scrapes each recent
//! article for its author and body text, keeps the results in SQLite and
//! writes short summaries of the posts published today.
//!
//! ## Usage
//!
//! ```sh
//! blog_digest                    # built-in defaults
//! blog_digest -c digest.yaml     # override feed, paths, selectors
//! ```
//!
//! ## Architecture
//!
//! The run is a single sequential pipeline:
//! 1. **Feed**: read the RSS feed and keep entries from the last 30 days
//! 2. **Scrape**: fetch each article and recover author and body text
//!    through ordered selector cascades and text-noise filters
//! 3. **Store**: insert each post into SQLite, keyed by URL
//! 4. **Output**: write the full-run JSON, then summarize today's stored
//!    posts into a second JSON file and print a console report

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod feed;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod store;
mod summarize;
mod utils;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("blog_digest starting up");

    let args = Cli::parse();
    debug!(?args.config, "Parsed CLI arguments");

    let config = config::load_config(args.config.as_deref())?;

    match pipeline::run(&config).await {
        Ok(outcome) => {
            info!(
                entries = outcome.entries,
                newly_stored = outcome.newly_stored,
                todays_posts = outcome.todays_posts,
                elapsed_secs = start_time.elapsed().as_secs(),
                "blog_digest finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "blog_digest failed");
            Err(e)
        }
    }
}

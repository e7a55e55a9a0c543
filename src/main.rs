mod cli;
mod config;
mod db;
mod error;
mod models;
mod schedule;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers::{self, Session};
use config::AppConfig;
use db::Store;
use utils::clock::CivilClock;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    let clock = CivilClock::new(config.clock.timezone_offset, &config.clock.zone_label)?;

    // Open (or create) the store once for this invocation
    let store_path = config.store_path(cli.store)?;
    let store = Store::open(&store_path)?;
    log::debug!("Using store at {:?}", store_path);

    let session = Session {
        store: &store,
        clock: &clock,
        config: &config,
    };

    match cli.command {
        Some(Commands::Reminder { action }) => handlers::handle_reminder(&session, &action)?,
        Some(Commands::Medication { action }) => handlers::handle_medication(&session, &action)?,
        Some(Commands::Config) => handlers::handle_config(&session)?,

        // No subcommand → interactive menu
        None => cli::menu::run(&session)?,
    }

    store.close()
}

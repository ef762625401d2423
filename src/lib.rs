pub mod chart;
mod cli;
mod commands;
pub mod db;
pub mod error;
pub mod gradient;
pub mod paths;
pub mod progress;
pub mod settings;
pub mod store;
pub mod widget;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use cli::{Cli, Command};
use db::Database;
use settings::SettingsStore;
use store::CountdownStore;
use widget::WidgetNotifier;

pub(crate) struct AppState {
    pub(crate) store: CountdownStore,
    pub(crate) settings: SettingsStore,
}

impl AppState {
    /// Open the shared store (or an in-memory fallback) and its settings.
    fn open(db_path: Option<std::path::PathBuf>) -> Result<Self> {
        let db_path = db_path.unwrap_or_else(paths::database_path);
        let database = Database::open_or_fallback(db_path.clone())?;
        let settings_path = paths::settings_path_for(&db_path);
        let settings = SettingsStore::new(settings_path)?;

        Ok(Self {
            store: CountdownStore::new(database, WidgetNotifier::new()),
            settings,
        })
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG, when set, wins over the flag.
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    log::info!("Remaining starting up...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        let state = AppState::open(cli.db)?;
        let command = cli.command.unwrap_or(Command::List { today: None });
        commands::dispatch(&state, command, cli.json).await
    })
}

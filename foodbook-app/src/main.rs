//! foodbook - local recipe manager
//!
//! Imports recipes from video links, photos, websites or typed input, keeps
//! them in a local SQLite-backed store, and plans the week's meals.

use anyhow::Result;
use clap::Parser;
use foodbook_common::config::{resolve_root_folder, TomlConfig};
use std::io::{self, Write};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use foodbook_app::cli::Cli;
use foodbook_app::{App, ClientSettings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let toml_config = TomlConfig::load_or_default();

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let root_folder = resolve_root_folder(cli.root_folder.as_deref(), &toml_config);
    debug!("Root folder: {}", root_folder.display());

    let settings = ClientSettings::resolve(cli.api_url.as_deref(), cli.timeout_secs, &toml_config);
    debug!("Extraction API: {}", settings.api_base_url);

    let app = App::open(&root_folder, settings).await?;

    let stdout = io::stdout();
    let stdin = io::stdin();
    let status = app
        .execute(cli.command, &mut stdout.lock(), &mut stdin.lock())
        .await?;

    let mut stderr = io::stderr();
    writeln!(stderr, "{}", status)?;

    if status.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

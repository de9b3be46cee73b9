mod app;
mod cli;
mod client;
mod command;
mod error;
mod keymap;
mod protocol;
mod settings;
mod state;

use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use client::Client;
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load()?;
    let mut client = Client::new(&cli.server, cli.secret.clone(), settings)?;

    client.run().await?;

    Ok(())
}

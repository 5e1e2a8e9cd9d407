use clap::Parser;

use comanda_relay::cli::commands::{config, serve};
use comanda_relay::cli::{Cli, Commands, ConfigAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        None => serve::handle_serve(None, None).await,
        Some(Commands::Serve { port, config }) => {
            serve::handle_serve(port, config.as_deref()).await
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { force, path } => config::handle_init(force, path).await,
            ConfigAction::Show => config::handle_show(None).await,
            ConfigAction::Validate => config::handle_validate(None).await,
        },
    }
}

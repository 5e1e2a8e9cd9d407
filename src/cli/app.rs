use std::path::PathBuf;

use clap::Parser;

/// HTTP relay for push notifications and account decision emails
#[derive(Parser, Debug)]
#[command(name = "comanda-relay", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run the relay (default)
    Serve {
        /// Listen port (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Config file path
        #[arg(short, long, env = "COMANDA_RELAY_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize configuration file
    Init {
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
        /// Write to this path instead of the default location
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show current configuration
    Show,
    /// Validate configuration
    Validate,
}

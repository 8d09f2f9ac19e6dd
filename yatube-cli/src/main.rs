//! yatube - a small blogging site
//!
//! This is the entry point for the `yatube` binary, which provides:
//! - The web site itself (`serve`)
//! - Schema management (`migrate`)
//! - Account administration (`user`)
//! - Group administration (`group`), since groups are not created through the site

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use commands::{GroupArgs, MigrateArgs, ServeArgs, UserArgs};
use config::YatubeConfig;

#[derive(Parser, Debug)]
#[command(
    name = "yatube",
    author,
    version,
    about = "Blogging site: posts, groups and author profiles",
    long_about = "Run the yatube web site and administer its users and groups. \
                  Settings come from flags, environment variables (.env is honoured) \
                  and ~/.yatube/config.toml, in that order."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web site
    Serve(ServeArgs),
    /// Create or update the database schema
    Migrate(MigrateArgs),
    /// Manage user accounts
    User(UserArgs),
    /// Manage post groups
    Group(GroupArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(err) = tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }) {
        eprintln!("Failed to initialise logging: {err}");
    }

    let config = YatubeConfig::load()?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &config).await,
        Commands::Migrate(args) => commands::run_migrate(args, &config).await,
        Commands::User(args) => commands::run_user(args, &config).await,
        Commands::Group(args) => commands::run_group(args, &config).await,
    }
}

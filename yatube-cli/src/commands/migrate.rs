//! Create or update the database schema

use anyhow::Result;
use clap::Parser;

use super::{connect, DbArgs};
use crate::config::YatubeConfig;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

pub async fn run_migrate(args: MigrateArgs, config: &YatubeConfig) -> Result<()> {
    connect(config, &args.db, true).await?;
    println!("Database schema is up to date");
    Ok(())
}

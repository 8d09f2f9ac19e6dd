//! Command implementations

pub mod group;
pub mod migrate;
pub mod serve;
pub mod user;

use anyhow::{Context, Result};
use clap::Args;
use yatube_server::db::{open_store, PgStore};

use crate::config::YatubeConfig;

pub use group::{run_group, GroupArgs};
pub use migrate::{run_migrate, MigrateArgs};
pub use serve::{run_serve, ServeArgs};
pub use user::{run_user, UserArgs};

/// Database connection flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct DbArgs {
    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,
}

/// Open the Postgres store, optionally bringing the schema up to date.
pub async fn connect(config: &YatubeConfig, db: &DbArgs, migrate: bool) -> Result<PgStore> {
    let database_url = config.database_url(db.database_url.clone())?;

    open_store(&database_url, config.max_connections(), migrate)
        .await
        .context(if migrate {
            "Failed to open database and run migrations"
        } else {
            "Failed to open database"
        })
}

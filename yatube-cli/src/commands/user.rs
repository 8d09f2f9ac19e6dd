//! Account administration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use yatube_server::auth::{self, RegisterError};
use yatube_server::db::{BlogStore, DbError};
use yatube_server::models::{NewPassword, Username};

use super::{connect, DbArgs};
use crate::config::YatubeConfig;

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,

    #[command(flatten)]
    pub db: DbArgs,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an account
    Add(AddUserArgs),
    /// Delete an account together with all of its posts
    Remove(RemoveUserArgs),
}

#[derive(Parser, Debug)]
pub struct AddUserArgs {
    /// Login name (letters, digits and @/./+/-/_)
    pub username: String,

    /// Password (at least 8 characters)
    #[arg(long, env = "YATUBE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Parser, Debug)]
pub struct RemoveUserArgs {
    /// Login name
    pub username: String,
}

pub async fn run_user(args: UserArgs, config: &YatubeConfig) -> Result<()> {
    let store = connect(config, &args.db, false).await?;

    match args.command {
        UserCommands::Add(add) => {
            let username = Username::new(&add.username).context("Invalid username")?;
            let password = NewPassword::new(&add.password).context("Invalid password")?;
            match auth::register(&store, &username, &password).await {
                Ok(user) => println!("Created user '{}' (id {})", user.username, user.id),
                Err(RegisterError::Store(DbError::Conflict { .. })) => bail!("User '{}' already exists", add.username),
                Err(e) => return Err(e).context("Failed to create user"),
            }
        }
        UserCommands::Remove(remove) => {
            store
                .delete_user(&remove.username)
                .await
                .with_context(|| format!("Failed to remove user '{}'", remove.username))?;
            println!("Removed user '{}' and their posts", remove.username);
        }
    }

    Ok(())
}

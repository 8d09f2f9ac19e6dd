//! Group administration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use yatube_server::db::{BlogStore, DbError};
use yatube_server::models::NewGroup;

use super::{connect, DbArgs};
use crate::config::YatubeConfig;

#[derive(Parser, Debug)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommands,

    #[command(flatten)]
    pub db: DbArgs,
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Create a group
    Add(AddGroupArgs),
    /// List all groups
    List,
    /// Delete a group; its posts are kept without a group
    Remove(RemoveGroupArgs),
}

#[derive(Parser, Debug)]
pub struct AddGroupArgs {
    /// Unique address of the group page (/group/<slug>/)
    #[arg(long)]
    pub slug: String,

    /// Display title
    #[arg(long)]
    pub title: String,

    /// What the group is about
    #[arg(long)]
    pub description: String,
}

#[derive(Parser, Debug)]
pub struct RemoveGroupArgs {
    /// Group slug
    pub slug: String,
}

pub async fn run_group(args: GroupArgs, config: &YatubeConfig) -> Result<()> {
    let store = connect(config, &args.db, false).await?;

    match args.command {
        GroupCommands::Add(add) => {
            let group = NewGroup::new(&add.title, &add.slug, &add.description)
                .context("Invalid group")?;
            match store.create_group(&group).await {
                Ok(group) => println!("Created group '{}' at /group/{}/", group.title, group.slug),
                Err(DbError::Conflict { .. }) => bail!("Group slug '{}' is already taken", add.slug),
                Err(e) => return Err(e).context("Failed to create group"),
            }
        }
        GroupCommands::List => {
            let groups = store.list_groups().await.context("Failed to list groups")?;
            if groups.is_empty() {
                println!("No groups yet");
            }
            for group in groups {
                println!("{:>5}  {:<30}  {}", group.id, group.slug, group.title);
            }
        }
        GroupCommands::Remove(remove) => {
            store
                .delete_group(&remove.slug)
                .await
                .with_context(|| format!("Failed to remove group '{}'", remove.slug))?;
            println!("Removed group '{}'; its posts remain without a group", remove.slug);
        }
    }

    Ok(())
}

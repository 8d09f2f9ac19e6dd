//! HTTP server command
//!
//! Runs the yatube site against Postgres, or against a throwaway
//! in-memory store with `--in-memory`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use yatube_server::db::{BlogStore, MemoryStore};
use yatube_server::http::{run_server, ServerConfig, SiteConfig};

use super::{connect, DbArgs};
use crate::config::YatubeConfig;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:8000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Posts shown per feed page (default: 10)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub per_page: Option<u32>,

    /// Keep everything in memory; nothing survives a restart
    #[arg(long)]
    pub in_memory: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: &YatubeConfig) -> Result<()> {
    let store: Arc<dyn BlogStore> = if args.in_memory {
        tracing::warn!("Using in-memory store - data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(connect(config, &args.db, true).await?)
    };

    let server_config = ServerConfig {
        bind_addr: config.bind(args.bind),
        cors_permissive: config.cors_permissive(args.cors_permissive),
        site: SiteConfig {
            posts_per_page: config.posts_per_page(args.per_page),
        },
    };

    tracing::info!("Starting yatube on {}", server_config.bind_addr);

    // Run server (blocks until shutdown)
    run_server(store, server_config)
        .await
        .context("Server error")?;

    Ok(())
}

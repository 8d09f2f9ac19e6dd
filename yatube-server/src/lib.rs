//! yatube-server: a small blogging site over HTTP
//!
//! Authors write posts, optionally inside a group; visitors browse the
//! site-wide feed, group feeds, author profiles and single posts.
//!
//! - [`models`]: validated input types and pagination
//! - [`db`]: the `BlogStore` trait with Postgres and in-memory stores
//! - [`auth`]: password hashes and session cookies
//! - [`http`]: axum router, extractors and handlers
//! - [`render`]: server-rendered HTML pages

pub mod auth;
pub mod db;
pub mod http;
pub mod models;
pub mod render;

pub use db::{BlogStore, DbError, MemoryStore, PgStore};
pub use http::{build_router, run_server, AppState, ServerConfig, SiteConfig};

//! Database layer - storage trait, Postgres and in-memory stores
//!
//! # Design Principles
//!
//! - Handlers depend on `BlogStore`, never on a concrete pool
//! - All list operations use JOINs - no N+1 queries
//! - Rely on DB constraints, handle conflicts - no check-then-insert

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options, open_store};
pub use postgres::PgStore;
pub use store::{session_max_age, BlogStore, DbError, Group, GroupRef, Post, PostFilter, User};

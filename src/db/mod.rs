//! Database module: store interface, row models and schema.
//!
//! Layout:
//! - `store.rs`: the `Store` trait handlers are written against
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the `sqlx`-backed `Store` implementation

pub mod models;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use sqlite::{SqlitePool, SqliteStore};
pub use store::{Store, StoreResult};

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod types;

pub use db::{SqliteStore, Store};
pub use error::GatewayError;
pub use router::{GatewayState, gateway_router};

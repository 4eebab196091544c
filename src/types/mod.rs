pub mod principal;
pub mod views;

pub use principal::{Principal, Role, SessionToken};

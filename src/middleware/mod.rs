pub mod auth;
pub mod path_id;

pub use auth::{Access, require_admin, require_faculty, require_session};
pub use path_id::ValidId;

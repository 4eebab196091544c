pub mod admin;
pub mod catalog;
pub mod faculty;
pub mod session;

//! Data models for the application
//!
//! Organized by domain: users and their exchange areas, offered/wanted books,
//! exchange requests, and the pending-cover staging record.

mod book;
mod exchange;
mod pending_cover;
mod user;

pub use book::*;
pub use exchange::*;
pub use pending_cover::*;
pub use user::*;

//! Object storage for normalized cover images.
//!
//! A small backend abstraction plus the local-filesystem implementation the
//! server ships with. Keys are generated by [keys], never from client input.

pub mod keys;
pub mod local;
pub mod traits;

pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};

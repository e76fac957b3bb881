//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod viewing_repo;

pub use viewing_repo::{PgViewingStore, ViewingRepo};

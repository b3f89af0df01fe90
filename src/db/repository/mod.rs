//! Repository functions over the local SQLite cache.

mod user_data;

pub use user_data::*;

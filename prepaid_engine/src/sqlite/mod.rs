//! SQLite backend for the prepaid order engine.
//!
//! The schema lives in `migrations/` and is embedded into the binary by [`SqliteDatabase::migrate`].
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;

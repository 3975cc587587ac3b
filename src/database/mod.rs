//! qrstudio database layer.
//!
//! Provides SQLite connection management, schema migrations and the
//! key-value storage used for history and presets.
//!
//! # Usage
//!
//! ```no_run
//! use qrstudio::database::{Database, KeyValueStore};
//!
//! let db = Database::open("qrstudio.db").expect("failed to open database");
//! db.set_item("greeting", "\"hello\"").expect("write failed");
//! ```

pub mod connection;
pub mod key_value;
pub mod migrations;

pub use connection::Database;
pub use key_value::KeyValueStore;

// qrstudio shared type definitions
// Each submodule defines types used across the application.

pub mod config;
pub mod content;
pub mod errors;
pub mod events;
pub mod export;
pub mod record;

//! qrstudio: a local-first QR code studio.
//!
//! Formats typed content (text, URL, email, phone, WiFi, contact card) into
//! QR payloads, renders them, exports PNG/JPEG/SVG and keeps a bounded
//! history. This library crate exposes all modules for use by the RPC
//! binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;

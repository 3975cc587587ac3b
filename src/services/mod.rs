// qrstudio services
// Services provide core functionality: formatting, encoding, rendering, export,
// customization, notifications and configuration.

pub mod config_engine;
pub mod content_formatter;
pub mod customization;
pub mod export_service;
pub mod notification_bus;
pub mod qr_encoder;
pub mod qr_service;

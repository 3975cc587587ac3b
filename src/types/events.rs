use serde::Serialize;

use super::record::QrRecord;

/// Signals published by core components. Any UI layer may subscribe;
/// the core only publishes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QrEvent {
    GenerationSucceeded { record: QrRecord },
    GenerationFailed { error: String, context: String },
    ExportSucceeded { message: String },
    ValidationFailed { field: String, message: String },
}

impl QrEvent {
    /// Short name of the event, as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            QrEvent::GenerationSucceeded { .. } => "generation_succeeded",
            QrEvent::GenerationFailed { .. } => "generation_failed",
            QrEvent::ExportSucceeded { .. } => "export_succeeded",
            QrEvent::ValidationFailed { .. } => "validation_failed",
        }
    }
}

use std::fmt;

// === ValidationError ===

/// Errors raised while turning user input into a QR payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was empty or absent.
    MissingField(String),
    /// A field was present but did not have the expected shape.
    Malformed { field: String, reason: String },
}

impl ValidationError {
    /// Name of the form field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::Malformed { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "Missing required field: {}", field),
            ValidationError::Malformed { field, reason } => {
                write!(f, "Invalid value for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// === QrError ===

/// Errors related to rendering QR codes.
#[derive(Debug, Clone, PartialEq)]
pub enum QrError {
    /// The payload handed to the encoder was empty.
    EmptyPayload,
    /// The payload does not fit at the chosen error-correction level.
    CapacityExceeded { limit: usize, length: usize },
    /// Regenerate or export was requested before anything was generated.
    NoActiveRecord,
    /// The render options cannot be drawn (zero size, unparsable color).
    InvalidOptions(String),
    /// The encoder failed to produce a module matrix or bitmap.
    EncodeFailed(String),
    /// The encoder did not finish within the configured bound.
    RenderTimeout(u64),
    /// A newer render superseded this one before it completed.
    Superseded,
}

impl fmt::Display for QrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QrError::EmptyPayload => write!(f, "Nothing to encode: payload is empty"),
            QrError::CapacityExceeded { limit, length } => write!(
                f,
                "Content too long: {} characters exceeds the limit of {}",
                length, limit
            ),
            QrError::NoActiveRecord => write!(f, "No QR code has been generated yet"),
            QrError::InvalidOptions(msg) => write!(f, "Invalid render options: {}", msg),
            QrError::EncodeFailed(msg) => write!(f, "QR encoding failed: {}", msg),
            QrError::RenderTimeout(ms) => write!(f, "QR rendering timed out after {} ms", ms),
            QrError::Superseded => write!(f, "QR render superseded by a newer request"),
        }
    }
}

impl std::error::Error for QrError {}

// === ExportError ===

/// Errors related to exporting a rendered QR code.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportError {
    /// There is no rendered surface to export.
    MissingSurface,
    /// The JPEG quality factor is outside (0, 1].
    InvalidQuality(f32),
    /// The image encoder failed.
    EncodeFailed(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::MissingSurface => write!(f, "Nothing to export: generate a QR code first"),
            ExportError::InvalidQuality(q) => write!(f, "Invalid export quality: {}", q),
            ExportError::EncodeFailed(msg) => write!(f, "Export encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {}

// === StorageError ===

/// Errors related to reading or writing persisted state.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Database operation failed.
    DatabaseError(String),
    /// Failed to serialize or deserialize stored data.
    SerializationError(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DatabaseError(msg) => write!(f, "Storage database error: {}", msg),
            StorageError::SerializationError(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StorageError {}

// === CustomizationError ===

/// Errors related to style customization and presets.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomizationError {
    /// The color is not a `#RRGGBB` hex value.
    InvalidColor(String),
    /// The value could not be parsed for the given field.
    InvalidValue { field: String, reason: String },
    /// The field name is not a known customization field.
    UnknownField(String),
    /// No preset is stored under the given name.
    PresetNotFound(String),
    /// Persisting presets failed.
    Storage(StorageError),
}

impl fmt::Display for CustomizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomizationError::InvalidColor(color) => {
                write!(f, "Invalid color: {} (expected #RRGGBB)", color)
            }
            CustomizationError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for {}: {}", field, reason)
            }
            CustomizationError::UnknownField(name) => {
                write!(f, "Unknown customization field: {}", name)
            }
            CustomizationError::PresetNotFound(name) => write!(f, "Preset not found: {}", name),
            CustomizationError::Storage(err) => write!(f, "Preset storage failed: {}", err),
        }
    }
}

impl std::error::Error for CustomizationError {}

impl From<StorageError> for CustomizationError {
    fn from(err: StorageError) -> Self {
        CustomizationError::Storage(err)
    }
}

// === ConfigError ===

/// Errors related to the application configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing the config file.
    IoError(String),
    /// Failed to serialize or deserialize the config.
    SerializationError(String),
    /// The provided config key is invalid.
    InvalidKey(String),
    /// The provided config value is invalid.
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::SerializationError(msg) => {
                write!(f, "Config serialization error: {}", msg)
            }
            ConfigError::InvalidKey(key) => write!(f, "Invalid config key: {}", key),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// === AppError ===

/// Any failure surfaced by the application context. The Display output is
/// the message shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    Validation(ValidationError),
    Qr(QrError),
    Export(ExportError),
    Customization(CustomizationError),
    Storage(StorageError),
    /// No history entry carries the given ID.
    HistoryEntryNotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(err) => write!(f, "{}", err),
            AppError::Qr(err) => write!(f, "{}", err),
            AppError::Export(err) => write!(f, "{}", err),
            AppError::Customization(err) => write!(f, "{}", err),
            AppError::Storage(err) => write!(f, "{}", err),
            AppError::HistoryEntryNotFound(id) => write!(f, "History entry not found: {}", id),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Validation(err) => Some(err),
            AppError::Qr(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Customization(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::HistoryEntryNotFound(_) => None,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<QrError> for AppError {
    fn from(err: QrError) -> Self {
        AppError::Qr(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err)
    }
}

impl From<CustomizationError> for AppError {
    fn from(err: CustomizationError) -> Self {
        AppError::Customization(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

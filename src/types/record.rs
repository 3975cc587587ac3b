use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::ContentKind;

/// QR redundancy setting, trading capacity for damage resilience.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorCorrectionLevel {
    #[serde(alias = "L")]
    Low,
    #[serde(alias = "M")]
    Medium,
    #[serde(alias = "Q")]
    Quartile,
    #[serde(alias = "H")]
    High,
}

impl ErrorCorrectionLevel {
    pub const ALL: [ErrorCorrectionLevel; 4] = [
        ErrorCorrectionLevel::Low,
        ErrorCorrectionLevel::Medium,
        ErrorCorrectionLevel::Quartile,
        ErrorCorrectionLevel::High,
    ];

    /// Maximum payload length, in characters, accepted at this level.
    pub fn capacity(self) -> usize {
        match self {
            ErrorCorrectionLevel::Low => 2953,
            ErrorCorrectionLevel::Medium => 2331,
            ErrorCorrectionLevel::Quartile => 1663,
            ErrorCorrectionLevel::High => 1273,
        }
    }

    /// Single-letter code used by QR tooling.
    pub fn code(self) -> &'static str {
        match self {
            ErrorCorrectionLevel::Low => "L",
            ErrorCorrectionLevel::Medium => "M",
            ErrorCorrectionLevel::Quartile => "Q",
            ErrorCorrectionLevel::High => "H",
        }
    }
}

impl Default for ErrorCorrectionLevel {
    fn default() -> Self {
        ErrorCorrectionLevel::Medium
    }
}

impl fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ErrorCorrectionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(ErrorCorrectionLevel::Low),
            "m" | "medium" => Ok(ErrorCorrectionLevel::Medium),
            "q" | "quartile" => Ok(ErrorCorrectionLevel::Quartile),
            "h" | "high" => Ok(ErrorCorrectionLevel::High),
            other => Err(format!("unknown error-correction level '{}'", other)),
        }
    }
}

/// Returns true for `#RRGGBB` (hex digits in either case).
pub fn is_valid_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Parses `#RRGGBB` into its RGB components.
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    if !is_valid_hex_color(color) {
        return None;
    }
    let hex = &color[1..];
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Style applied when drawing a QR code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderOptions {
    pub size: u32,
    pub color_dark: String,
    pub color_light: String,
    pub error_correction_level: ErrorCorrectionLevel,
    pub margin: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: 200,
            color_dark: "#000000".to_string(),
            color_light: "#ffffff".to_string(),
            error_correction_level: ErrorCorrectionLevel::Medium,
            margin: 4,
        }
    }
}

/// One successful generation. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QrRecord {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub kind: ContentKind,
    pub options: RenderOptions,
    pub created_at: DateTime<Utc>,
}

impl QrRecord {
    /// Creates a record with a fresh ID and the current time.
    pub fn new(content: &str, options: RenderOptions) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            kind: ContentKind::detect(content),
            options,
            created_at: Utc::now(),
        }
    }
}

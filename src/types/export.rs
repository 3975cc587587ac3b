use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// Output formats offered for download.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    /// SVG wrapper around an embedded PNG of the rendered surface.
    Svg,
    /// SVG drawn from the QR module matrix.
    SvgVector,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Svg | ExportFormat::SvgVector => "svg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Svg | ExportFormat::SvgVector => "image/svg+xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => f.write_str("png"),
            ExportFormat::Jpeg => f.write_str("jpeg"),
            ExportFormat::Svg => f.write_str("svg"),
            ExportFormat::SvgVector => f.write_str("svgvector"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "svg" => Ok(ExportFormat::Svg),
            "svgvector" | "svg-vector" | "vector" => Ok(ExportFormat::SvgVector),
            other => Err(format!("unsupported export format '{}'", other)),
        }
    }
}

/// Knobs for a single export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// JPEG quality factor in (0, 1].
    pub quality: f32,
    /// When set, the bitmap is resampled to this edge length before encoding.
    pub target_size: Option<u32>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            quality: 0.9,
            target_size: None,
        }
    }
}

/// Encoded file ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// `data:` URL suitable for an `<img src>` or a copy-to-clipboard action.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }
}

//! Export Service: turns the rendered surface into downloadable files.
//!
//! PNG and JPEG encode the bitmap directly (optionally resampled first).
//! `Svg` wraps a PNG of the bitmap in a minimal SVG document; `SvgVector`
//! redraws the module matrix as SVG paths instead.

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder};

use crate::services::notification_bus::NotificationBus;
use crate::services::qr_encoder::{ModuleMatrix, Surface, MAX_RENDER_SIZE};
use crate::types::errors::ExportError;
use crate::types::events::QrEvent;
use crate::types::export::{ExportArtifact, ExportFormat, ExportOptions};
use crate::types::record::{parse_hex_color, QrRecord};

/// Trait defining the export service interface.
pub trait ExportServiceTrait {
    fn export(
        &self,
        format: ExportFormat,
        record: &QrRecord,
        surface: Option<&Surface>,
        options: &ExportOptions,
    ) -> Result<ExportArtifact, ExportError>;
}

/// `qrcode-<timestamp>.<ext>`, with the timestamp in ISO form minus the
/// characters file systems dislike.
pub fn export_filename(format: ExportFormat, at: DateTime<Utc>) -> String {
    format!(
        "qrcode-{}.{}",
        at.format("%Y-%m-%dT%H-%M-%S"),
        format.extension()
    )
}

pub struct ExportService {
    bus: NotificationBus,
}

impl ExportService {
    pub fn new(bus: NotificationBus) -> Self {
        Self { bus }
    }

    fn encode(
        format: ExportFormat,
        record: &QrRecord,
        surface: &Surface,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Png => encode_png(&resampled(surface, options.target_size)?),
            ExportFormat::Jpeg => {
                let quality = jpeg_quality(options.quality)?;
                encode_jpeg(&resampled(surface, options.target_size)?, quality)
            }
            ExportFormat::Svg => {
                let png = encode_png(surface)?;
                Ok(raster_svg(&png, record.options.size).into_bytes())
            }
            ExportFormat::SvgVector => Ok(vector_svg(record)?.into_bytes()),
        }
    }
}

impl ExportServiceTrait for ExportService {
    fn export(
        &self,
        format: ExportFormat,
        record: &QrRecord,
        surface: Option<&Surface>,
        options: &ExportOptions,
    ) -> Result<ExportArtifact, ExportError> {
        let result = surface
            .ok_or(ExportError::MissingSurface)
            .and_then(|surface| Self::encode(format, record, surface, options));

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("export {} of {} failed: {}", format, record.id, err);
                return Err(err);
            }
        };

        let artifact = ExportArtifact {
            filename: export_filename(format, Utc::now()),
            format,
            bytes,
        };
        log::info!("exported {} ({} bytes)", artifact.filename, artifact.bytes.len());
        self.bus.publish(QrEvent::ExportSucceeded {
            message: format!("QR code saved as {}", artifact.filename),
        });
        Ok(artifact)
    }
}

/// Maps a (0, 1] quality factor to the encoder's 1..=100 scale.
fn jpeg_quality(quality: f32) -> Result<u8, ExportError> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(ExportError::InvalidQuality(quality));
    }
    Ok(((quality * 100.0).round() as u8).max(1))
}

fn resampled(surface: &Surface, target_size: Option<u32>) -> Result<Surface, ExportError> {
    match target_size {
        Some(size) if size > MAX_RENDER_SIZE => Err(ExportError::EncodeFailed(format!(
            "target size {} exceeds the maximum of {}",
            size, MAX_RENDER_SIZE
        ))),
        Some(size) if size > 0 && (size != surface.width() || size != surface.height()) => {
            // Nearest keeps module edges hard.
            Ok(imageops::resize(surface, size, size, FilterType::Nearest))
        }
        _ => Ok(surface.clone()),
    }
}

fn encode_png(surface: &Surface) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            surface.as_raw(),
            surface.width(),
            surface.height(),
            ColorType::Rgb8,
        )
        .map_err(|e| ExportError::EncodeFailed(e.to_string()))?;
    Ok(bytes)
}

fn encode_jpeg(surface: &Surface, quality: u8) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode(
            surface.as_raw(),
            surface.width(),
            surface.height(),
            ColorType::Rgb8,
        )
        .map_err(|e| ExportError::EncodeFailed(e.to_string()))?;
    Ok(bytes)
}

fn raster_svg(png: &[u8], size: u32) -> String {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" "#,
            r#"width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#,
            r#"<image width="{size}" height="{size}" xlink:href="data:image/png;base64,{data}"/>"#,
            "</svg>"
        ),
        size = size,
        data = BASE64.encode(png)
    )
}

fn vector_svg(record: &QrRecord) -> Result<String, ExportError> {
    let options = &record.options;
    let matrix = ModuleMatrix::encode(&record.content, options.error_correction_level)
        .map_err(|e| ExportError::EncodeFailed(e.to_string()))?;
    for color in [&options.color_dark, &options.color_light] {
        if parse_hex_color(color).is_none() {
            return Err(ExportError::EncodeFailed(format!("bad color {}", color)));
        }
    }

    let margin = options.margin as usize;
    let total = matrix.width() + 2 * margin;
    let mut path = String::new();
    for y in 0..matrix.width() {
        for x in 0..matrix.width() {
            if matrix.is_dark(x, y) {
                path.push_str(&format!("M{},{}h1v1h-1z", x + margin, y + margin));
            }
        }
    }

    Ok(format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" "#,
            r#"viewBox="0 0 {total} {total}" shape-rendering="crispEdges">"#,
            r#"<rect width="{total}" height="{total}" fill="{light}"/>"#,
            r#"<path d="{path}" fill="{dark}"/>"#,
            "</svg>"
        ),
        size = options.size,
        total = total,
        light = options.color_light,
        dark = options.color_dark,
        path = path
    ))
}

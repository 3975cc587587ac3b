//! QR encoder boundary.
//!
//! The rest of the crate only sees [`QrEncoder`]: given a payload, pixel
//! dimensions, colors and an error-correction level, draw into a
//! caller-supplied [`Surface`]. [`ModuleEncoder`] is the default
//! implementation, built on the `qrcode` crate for the module matrix and
//! `image` for the bitmap.

use image::{Rgb, RgbImage};
use qrcode::{EcLevel, QrCode};

use crate::types::errors::QrError;
use crate::types::record::{parse_hex_color, ErrorCorrectionLevel, RenderOptions};

/// Rendered bitmap, the source for every raster export.
pub type Surface = RgbImage;

/// Largest edge length, in pixels, the encoder will allocate a surface for.
pub const MAX_RENDER_SIZE: u32 = 4096;

/// Everything the encoder needs for one drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub payload: String,
    pub width: u32,
    pub height: u32,
    pub dark: [u8; 3],
    pub light: [u8; 3],
    pub level: ErrorCorrectionLevel,
    /// Quiet zone, in modules, on every side.
    pub margin: u32,
}

impl EncodeRequest {
    /// Maps render options to an encoder request, rejecting options that
    /// cannot be drawn.
    pub fn from_options(payload: &str, options: &RenderOptions) -> Result<Self, QrError> {
        if options.size == 0 {
            return Err(QrError::InvalidOptions("size must be positive".to_string()));
        }
        if options.size > MAX_RENDER_SIZE {
            return Err(QrError::InvalidOptions(format!(
                "size {} exceeds the maximum of {}",
                options.size, MAX_RENDER_SIZE
            )));
        }
        let dark = parse_hex_color(&options.color_dark).ok_or_else(|| {
            QrError::InvalidOptions(format!("bad dark color {}", options.color_dark))
        })?;
        let light = parse_hex_color(&options.color_light).ok_or_else(|| {
            QrError::InvalidOptions(format!("bad light color {}", options.color_light))
        })?;
        Ok(Self {
            payload: payload.to_string(),
            width: options.size,
            height: options.size,
            dark,
            light,
            level: options.error_correction_level,
            margin: options.margin,
        })
    }

    /// A blank surface of the requested size filled with the light color.
    pub fn blank_surface(&self) -> Surface {
        RgbImage::from_pixel(self.width, self.height, Rgb(self.light))
    }
}

/// Draws QR codes onto surfaces.
pub trait QrEncoder {
    fn draw(&self, request: &EncodeRequest, surface: &mut Surface) -> Result<(), QrError>;
}

/// Square grid of dark/light modules, without quiet zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl ModuleMatrix {
    /// Encodes `payload` at `level`. Multibyte text can fit the character
    /// limit yet overflow the symbol; that is still reported as
    /// `CapacityExceeded`.
    pub fn encode(payload: &str, level: ErrorCorrectionLevel) -> Result<Self, QrError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), to_ec_level(level))
            .map_err(|e| match e {
                qrcode::types::QrError::DataTooLong => QrError::CapacityExceeded {
                    limit: level.capacity(),
                    length: payload.chars().count(),
                },
                other => QrError::EncodeFailed(other.to_string()),
            })?;
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == qrcode::Color::Dark)
            .collect();
        Ok(Self {
            width: code.width(),
            modules,
        })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }
}

fn to_ec_level(level: ErrorCorrectionLevel) -> EcLevel {
    match level {
        ErrorCorrectionLevel::Low => EcLevel::L,
        ErrorCorrectionLevel::Medium => EcLevel::M,
        ErrorCorrectionLevel::Quartile => EcLevel::Q,
        ErrorCorrectionLevel::High => EcLevel::H,
    }
}

/// Default encoder: scales the module grid plus quiet zone to fill the
/// surface exactly.
#[derive(Debug, Clone, Default)]
pub struct ModuleEncoder;

impl ModuleEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrEncoder for ModuleEncoder {
    fn draw(&self, request: &EncodeRequest, surface: &mut Surface) -> Result<(), QrError> {
        if surface.width() != request.width || surface.height() != request.height {
            return Err(QrError::InvalidOptions(format!(
                "surface is {}x{}, expected {}x{}",
                surface.width(),
                surface.height(),
                request.width,
                request.height
            )));
        }

        let matrix = ModuleMatrix::encode(&request.payload, request.level)?;
        let margin = request.margin as usize;
        let total = (matrix.width() + 2 * margin) as f64;
        let scale_x = request.width as f64 / total;
        let scale_y = request.height as f64 / total;

        let dark = Rgb(request.dark);
        let light = Rgb(request.light);
        for (px, py, pixel) in surface.enumerate_pixels_mut() {
            let mx = (px as f64 / scale_x).floor() as usize;
            let my = (py as f64 / scale_y).floor() as usize;
            let on = mx >= margin
                && my >= margin
                && matrix.is_dark(mx - margin, my - margin);
            *pixel = if on { dark } else { light };
        }
        Ok(())
    }
}

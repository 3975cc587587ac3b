//! Customization State: the user's current style preferences and their
//! mapping to encoder render options.

use std::fmt;
use std::str::FromStr;

use crate::types::errors::CustomizationError;
use crate::types::record::{is_valid_hex_color, ErrorCorrectionLevel, RenderOptions};

/// Trait defining the customization state interface.
pub trait CustomizationStateTrait {
    fn set(&mut self, field: CustomizationField, value: &str) -> Result<(), CustomizationError>;
    fn set_value(&mut self, key: &str, value: &serde_json::Value) -> Result<(), CustomizationError>;
    fn apply(&mut self, options: RenderOptions) -> Result<(), CustomizationError>;
    fn to_render_options(&self) -> RenderOptions;
    fn reset(&mut self);
}

/// Fields the user can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomizationField {
    Size,
    ColorDark,
    ColorLight,
    ErrorCorrectionLevel,
    Margin,
}

impl CustomizationField {
    pub fn as_str(self) -> &'static str {
        match self {
            CustomizationField::Size => "size",
            CustomizationField::ColorDark => "color_dark",
            CustomizationField::ColorLight => "color_light",
            CustomizationField::ErrorCorrectionLevel => "error_correction_level",
            CustomizationField::Margin => "margin",
        }
    }
}

impl fmt::Display for CustomizationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomizationField {
    type Err = CustomizationError;

    /// Accepts snake_case and the camelCase names form inputs use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "size" => Ok(CustomizationField::Size),
            "color_dark" | "colorDark" => Ok(CustomizationField::ColorDark),
            "color_light" | "colorLight" => Ok(CustomizationField::ColorLight),
            "error_correction_level" | "errorCorrectionLevel" | "level" => {
                Ok(CustomizationField::ErrorCorrectionLevel)
            }
            "margin" => Ok(CustomizationField::Margin),
            other => Err(CustomizationError::UnknownField(other.to_string())),
        }
    }
}

/// Holds the current render options. Size is not clamped here; callers
/// enforce their own UI bounds.
#[derive(Debug, Clone, Default)]
pub struct CustomizationState {
    options: RenderOptions,
}

impl CustomizationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn parse_u32(field: CustomizationField, value: &str) -> Result<u32, CustomizationError> {
        value
            .trim()
            .parse::<u32>()
            .map_err(|e| CustomizationError::InvalidValue {
                field: field.to_string(),
                reason: format!("'{}' is not a whole number ({})", value, e),
            })
    }

    fn check_color(value: &str) -> Result<String, CustomizationError> {
        let value = value.trim();
        if !is_valid_hex_color(value) {
            return Err(CustomizationError::InvalidColor(value.to_string()));
        }
        Ok(value.to_string())
    }
}

impl CustomizationStateTrait for CustomizationState {
    /// Updates one field. On error the previous value is kept.
    fn set(&mut self, field: CustomizationField, value: &str) -> Result<(), CustomizationError> {
        match field {
            CustomizationField::Size => self.options.size = Self::parse_u32(field, value)?,
            CustomizationField::Margin => self.options.margin = Self::parse_u32(field, value)?,
            CustomizationField::ColorDark => self.options.color_dark = Self::check_color(value)?,
            CustomizationField::ColorLight => self.options.color_light = Self::check_color(value)?,
            CustomizationField::ErrorCorrectionLevel => {
                self.options.error_correction_level = value
                    .parse::<ErrorCorrectionLevel>()
                    .map_err(|reason| CustomizationError::InvalidValue {
                        field: field.to_string(),
                        reason,
                    })?;
            }
        }
        log::debug!("customization {} = {}", field, value);
        Ok(())
    }

    /// Wire entry point: `key` names the field, `value` is a JSON string or number.
    fn set_value(&mut self, key: &str, value: &serde_json::Value) -> Result<(), CustomizationError> {
        let field = key.parse::<CustomizationField>()?;
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(CustomizationError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("expected a string or number, got {}", other),
                })
            }
        };
        self.set(field, &text)
    }

    /// Replaces all options at once, e.g. from a preset or a history entry.
    fn apply(&mut self, options: RenderOptions) -> Result<(), CustomizationError> {
        Self::check_color(&options.color_dark)?;
        Self::check_color(&options.color_light)?;
        self.options = options;
        Ok(())
    }

    fn to_render_options(&self) -> RenderOptions {
        self.options.clone()
    }

    /// Restores the documented defaults.
    fn reset(&mut self) {
        self.options = RenderOptions::default();
    }
}

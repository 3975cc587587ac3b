use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::ValidationError;

/// The six kinds of content the studio can encode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Url,
    Email,
    Phone,
    Wifi,
    Vcard,
}

impl Default for ContentKind {
    fn default() -> Self {
        ContentKind::Text
    }
}

impl ContentKind {
    /// Classifies an already-formatted payload by its scheme prefix.
    pub fn detect(payload: &str) -> Self {
        let lower = payload.trim_start().to_ascii_lowercase();
        if lower.starts_with("mailto:") {
            ContentKind::Email
        } else if lower.starts_with("tel:") {
            ContentKind::Phone
        } else if lower.starts_with("wifi:") {
            ContentKind::Wifi
        } else if lower.starts_with("begin:vcard") {
            ContentKind::Vcard
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            ContentKind::Url
        } else {
            ContentKind::Text
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Url => "url",
            ContentKind::Email => "email",
            ContentKind::Phone => "phone",
            ContentKind::Wifi => "wifi",
            ContentKind::Vcard => "vcard",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ContentKind::Text),
            "url" => Ok(ContentKind::Url),
            "email" => Ok(ContentKind::Email),
            "phone" | "tel" => Ok(ContentKind::Phone),
            "wifi" => Ok(ContentKind::Wifi),
            "vcard" | "contact" => Ok(ContentKind::Vcard),
            other => Err(ValidationError::Malformed {
                field: "kind".to_string(),
                reason: format!("unknown content kind '{}'", other),
            }),
        }
    }
}

/// WiFi authentication mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WifiSecurity {
    #[serde(alias = "wpa", alias = "WPA2")]
    Wpa,
    #[serde(alias = "wep")]
    Wep,
    #[serde(alias = "open", alias = "nopass")]
    Open,
}

impl Default for WifiSecurity {
    fn default() -> Self {
        WifiSecurity::Wpa
    }
}

impl WifiSecurity {
    /// Value of the `T:` field in a WIFI payload.
    pub fn code(self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::Open => "nopass",
        }
    }
}

impl FromStr for WifiSecurity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "WPA" | "WPA2" | "WPA3" => Ok(WifiSecurity::Wpa),
            "WEP" => Ok(WifiSecurity::Wep),
            "OPEN" | "NOPASS" | "NONE" => Ok(WifiSecurity::Open),
            other => Err(ValidationError::Malformed {
                field: "security".to_string(),
                reason: format!("unknown security mode '{}'", other),
            }),
        }
    }
}

/// Contact card fields; every field is optional on its own but at least one
/// name part must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VCardFields {
    pub first_name: String,
    pub last_name: String,
    pub organization: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
}

/// Structured user input for one content kind. Built from form state and
/// discarded once formatted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentRequest {
    Text {
        text: String,
    },
    Url {
        url: String,
    },
    Email {
        address: String,
        #[serde(default)]
        subject: Option<String>,
        #[serde(default)]
        body: Option<String>,
    },
    Phone {
        number: String,
    },
    Wifi {
        ssid: String,
        #[serde(default)]
        password: String,
        #[serde(default)]
        security: Option<WifiSecurity>,
        #[serde(default)]
        hidden: bool,
    },
    Vcard(VCardFields),
}

impl ContentRequest {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentRequest::Text { .. } => ContentKind::Text,
            ContentRequest::Url { .. } => ContentKind::Url,
            ContentRequest::Email { .. } => ContentKind::Email,
            ContentRequest::Phone { .. } => ContentKind::Phone,
            ContentRequest::Wifi { .. } => ContentKind::Wifi,
            ContentRequest::Vcard(_) => ContentKind::Vcard,
        }
    }

    /// Builds a request from loose form fields. Absent fields read as empty;
    /// emptiness of required fields is checked when formatting.
    pub fn from_fields(
        kind: ContentKind,
        fields: &HashMap<String, String>,
    ) -> Result<Self, ValidationError> {
        let get = |name: &str| fields.get(name).cloned().unwrap_or_default();
        let optional = |name: &str| fields.get(name).filter(|v| !v.trim().is_empty()).cloned();

        let request = match kind {
            ContentKind::Text => ContentRequest::Text { text: get("text") },
            ContentKind::Url => ContentRequest::Url { url: get("url") },
            ContentKind::Email => ContentRequest::Email {
                address: get("address"),
                subject: optional("subject"),
                body: optional("body"),
            },
            ContentKind::Phone => ContentRequest::Phone { number: get("number") },
            ContentKind::Wifi => {
                let security = match fields.get("security") {
                    Some(value) => Some(value.parse::<WifiSecurity>()?),
                    None => None,
                };
                ContentRequest::Wifi {
                    ssid: get("ssid"),
                    password: get("password"),
                    security,
                    hidden: parse_flag(&get("hidden")),
                }
            }
            ContentKind::Vcard => ContentRequest::Vcard(VCardFields {
                first_name: get("first_name"),
                last_name: get("last_name"),
                organization: get("organization"),
                phone: get("phone"),
                email: get("email"),
                website: get("website"),
                address: get("address"),
            }),
        };
        Ok(request)
    }
}

/// Checkbox-style flag: "true", "1", "on" and "yes" are set.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

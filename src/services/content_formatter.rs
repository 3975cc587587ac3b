//! Content Formatter: turns structured user input into the payload string
//! a QR encoder expects (`mailto:`, `tel:`, `WIFI:`, vCard 3.0, ...).

use std::collections::HashMap;

use crate::types::content::{ContentKind, ContentRequest, VCardFields, WifiSecurity};
use crate::types::errors::ValidationError;

/// Trait defining the content formatter interface.
pub trait ContentFormatterTrait {
    fn format(&self, request: &ContentRequest) -> Result<String, ValidationError>;
    fn format_fields(
        &self,
        kind: ContentKind,
        fields: &HashMap<String, String>,
    ) -> Result<String, ValidationError>;
}

/// Stateless formatter for the six supported content kinds.
#[derive(Debug, Clone, Default)]
pub struct ContentFormatter;

impl ContentFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl ContentFormatterTrait for ContentFormatter {
    fn format(&self, request: &ContentRequest) -> Result<String, ValidationError> {
        match request {
            ContentRequest::Text { text } => format_text(text),
            ContentRequest::Url { url } => format_url(url),
            ContentRequest::Email {
                address,
                subject,
                body,
            } => format_email(address, subject.as_deref(), body.as_deref()),
            ContentRequest::Phone { number } => format_phone(number),
            ContentRequest::Wifi {
                ssid,
                password,
                security,
                hidden,
            } => format_wifi(ssid, password, security.unwrap_or_default(), *hidden),
            ContentRequest::Vcard(fields) => format_vcard(fields),
        }
    }

    fn format_fields(
        &self,
        kind: ContentKind,
        fields: &HashMap<String, String>,
    ) -> Result<String, ValidationError> {
        let request = ContentRequest::from_fields(kind, fields)?;
        self.format(&request)
    }
}

fn format_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("text".to_string()));
    }
    Ok(trimmed.to_string())
}

fn format_url(url: &str) -> Result<String, ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("url".to_string()));
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("http://{}", trimmed))
    }
}

fn format_email(
    address: &str,
    subject: Option<&str>,
    body: Option<&str>,
) -> Result<String, ValidationError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ValidationError::MissingField("address".to_string()));
    }
    if let Err(reason) = check_email_address(address) {
        return Err(ValidationError::Malformed {
            field: "address".to_string(),
            reason,
        });
    }

    let mut query = Vec::new();
    if let Some(subject) = subject.filter(|s| !s.trim().is_empty()) {
        query.push(format!("subject={}", uri_component(subject)));
    }
    if let Some(body) = body.filter(|b| !b.trim().is_empty()) {
        query.push(format!("body={}", uri_component(body)));
    }

    if query.is_empty() {
        Ok(format!("mailto:{}", address))
    } else {
        Ok(format!("mailto:{}?{}", address, query.join("&")))
    }
}

/// Exactly one `@`, a non-empty local part, and a dotted domain with no
/// empty labels.
fn check_email_address(address: &str) -> Result<(), String> {
    if address.chars().any(char::is_whitespace) {
        return Err("must not contain whitespace".to_string());
    }
    let mut parts = address.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err("must contain exactly one '@'".to_string()),
    };
    if local.is_empty() {
        return Err("missing the part before '@'".to_string());
    }
    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Err(format!("'{}' is not a valid domain", domain));
    }
    Ok(())
}

fn format_phone(number: &str) -> Result<String, ValidationError> {
    let trimmed = number.trim();
    let mut digits = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        digits.push('+');
    }
    digits.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));

    if digits.trim_start_matches('+').is_empty() {
        return Err(ValidationError::MissingField("number".to_string()));
    }
    Ok(format!("tel:{}", digits))
}

fn format_wifi(
    ssid: &str,
    password: &str,
    security: WifiSecurity,
    hidden: bool,
) -> Result<String, ValidationError> {
    if ssid.trim().is_empty() {
        return Err(ValidationError::MissingField("ssid".to_string()));
    }
    Ok(format!(
        "WIFI:T:{};S:{};P:{};H:{};;",
        security.code(),
        escape_wifi(ssid),
        escape_wifi(password),
        hidden
    ))
}

/// Backslash-escapes the characters reserved by the WIFI grammar.
fn escape_wifi(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ',' | '"' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn format_vcard(fields: &VCardFields) -> Result<String, ValidationError> {
    let first = fields.first_name.trim();
    let last = fields.last_name.trim();
    if first.is_empty() && last.is_empty() {
        return Err(ValidationError::MissingField("first_name".to_string()));
    }

    let full_name = [first, last]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", escape_vcard(&full_name)),
        format!("N:{};{};;;", escape_vcard(last), escape_vcard(first)),
    ];

    let organization = fields.organization.trim();
    if !organization.is_empty() {
        lines.push(format!("ORG:{}", escape_vcard(organization)));
    }
    let phone = fields.phone.trim();
    if !phone.is_empty() {
        lines.push(format!("TEL:{}", phone));
    }
    let email = fields.email.trim();
    if !email.is_empty() {
        lines.push(format!("EMAIL:{}", email));
    }
    let website = fields.website.trim();
    if !website.is_empty() {
        lines.push(format!("URL:{}", website));
    }
    let address = fields.address.trim();
    if !address.is_empty() {
        lines.push(format!("ADR:;;{};;;;", escape_vcard(address)));
    }
    lines.push("END:VCARD".to_string());

    Ok(lines.join("\n"))
}

/// vCard 3.0 text escaping.
fn escape_vcard(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | ';' | ',' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes everything outside the URI-component unreserved set,
/// so a space becomes `%20`.
fn uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(b as char),
            _ => {
                out.push('%');
                out.push(char::from(b"0123456789ABCDEF"[(b >> 4) as usize]));
                out.push(char::from(b"0123456789ABCDEF"[(b & 0xf) as usize]));
            }
        }
    }
    out
}

//! Unit tests for the ContentFormatter.
//!
//! Each content kind is checked against its destination grammar, including
//! the optional-field rules for email and vCard and the error cases.

use std::collections::HashMap;

use rstest::rstest;

use qrstudio::services::content_formatter::{ContentFormatter, ContentFormatterTrait};
use qrstudio::types::content::{ContentKind, ContentRequest, VCardFields, WifiSecurity};
use qrstudio::types::errors::ValidationError;

fn format(request: ContentRequest) -> Result<String, ValidationError> {
    ContentFormatter::new().format(&request)
}

fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ─── Text ───

#[test]
fn test_text_is_trimmed_pass_through() {
    let payload = format(ContentRequest::Text {
        text: "  hello world \n".to_string(),
    })
    .unwrap();
    assert_eq!(payload, "hello world");
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
fn test_text_empty_is_rejected(#[case] text: &str) {
    let err = format(ContentRequest::Text {
        text: text.to_string(),
    })
    .unwrap_err();
    assert_eq!(err, ValidationError::MissingField("text".to_string()));
}

// ─── Url ───

#[rstest]
#[case("example.com", "http://example.com")]
#[case("http://example.com", "http://example.com")]
#[case("https://example.com/path?q=1", "https://example.com/path?q=1")]
#[case("HTTPS://EXAMPLE.COM", "HTTPS://EXAMPLE.COM")]
#[case("ftp.example.com", "http://ftp.example.com")]
#[case("  rust-lang.org  ", "http://rust-lang.org")]
fn test_url_prefixing(#[case] input: &str, #[case] expected: &str) {
    let payload = format(ContentRequest::Url {
        url: input.to_string(),
    })
    .unwrap();
    assert_eq!(payload, expected);
}

#[test]
fn test_url_empty_is_rejected() {
    assert!(format(ContentRequest::Url { url: " ".to_string() }).is_err());
}

// ─── Email ───

#[test]
fn test_email_with_subject_only() {
    let payload = format(ContentRequest::Email {
        address: "a@b.com".to_string(),
        subject: Some("Hi there".to_string()),
        body: None,
    })
    .unwrap();
    assert_eq!(payload, "mailto:a@b.com?subject=Hi%20there");
}

#[test]
fn test_email_with_subject_and_body() {
    let payload = format(ContentRequest::Email {
        address: "a@b.com".to_string(),
        subject: Some("Hi".to_string()),
        body: Some("See you & bye".to_string()),
    })
    .unwrap();
    assert_eq!(payload, "mailto:a@b.com?subject=Hi&body=See%20you%20%26%20bye");
}

#[test]
fn test_email_with_body_only() {
    let payload = format(ContentRequest::Email {
        address: "a@b.com".to_string(),
        subject: Some(String::new()),
        body: Some("x".to_string()),
    })
    .unwrap();
    assert_eq!(payload, "mailto:a@b.com?body=x");
}

#[rstest]
#[case(Some("   "), None, "mailto:a@b.com")]
#[case(Some("  "), Some("x"), "mailto:a@b.com?body=x")]
#[case(Some("Hi"), Some(" \n "), "mailto:a@b.com?subject=Hi")]
fn test_email_drops_blank_subject_and_body(
    #[case] subject: Option<&str>,
    #[case] body: Option<&str>,
    #[case] expected: &str,
) {
    let payload = format(ContentRequest::Email {
        address: "a@b.com".to_string(),
        subject: subject.map(str::to_string),
        body: body.map(str::to_string),
    })
    .unwrap();
    assert_eq!(payload, expected);
}

#[test]
fn test_email_without_optional_fields() {
    let payload = format(ContentRequest::Email {
        address: "someone@example.org".to_string(),
        subject: None,
        body: None,
    })
    .unwrap();
    assert_eq!(payload, "mailto:someone@example.org");
}

#[rstest]
#[case("plainaddress")]
#[case("a@b")]
#[case("a@@b.com")]
#[case("a@b@c.com")]
#[case("@example.com")]
#[case("user@.com")]
#[case("user@example.")]
fn test_email_invalid_addresses(#[case] address: &str) {
    let err = format(ContentRequest::Email {
        address: address.to_string(),
        subject: None,
        body: None,
    })
    .unwrap_err();
    assert_eq!(err.field(), "address");
    assert!(matches!(err, ValidationError::Malformed { .. }));
}

#[test]
fn test_email_missing_address() {
    let err = format(ContentRequest::Email {
        address: String::new(),
        subject: Some("Hi".to_string()),
        body: None,
    })
    .unwrap_err();
    assert_eq!(err, ValidationError::MissingField("address".to_string()));
}

// ─── Phone ───

#[rstest]
#[case("+55 (11) 99999-9999", "tel:+5511999999999")]
#[case("555-0100", "tel:5550100")]
#[case("  +1 800 FLOWERS 42", "tel:+180042")]
#[case("00 44 20 7946 0958", "tel:00442079460958")]
#[case("12+34", "tel:1234")]
fn test_phone_stripping(#[case] input: &str, #[case] expected: &str) {
    let payload = format(ContentRequest::Phone {
        number: input.to_string(),
    })
    .unwrap();
    assert_eq!(payload, expected);
}

#[rstest]
#[case("")]
#[case("+")]
#[case("call me")]
fn test_phone_without_digits_is_rejected(#[case] input: &str) {
    let err = format(ContentRequest::Phone {
        number: input.to_string(),
    })
    .unwrap_err();
    assert_eq!(err.field(), "number");
}

// ─── WiFi ───

#[test]
fn test_wifi_defaults_to_wpa_and_keeps_empty_password() {
    let payload = format(ContentRequest::Wifi {
        ssid: "HomeNet".to_string(),
        password: String::new(),
        security: None,
        hidden: false,
    })
    .unwrap();
    assert_eq!(payload, "WIFI:T:WPA;S:HomeNet;P:;H:false;;");
}

#[rstest]
#[case(WifiSecurity::Wpa, "WPA")]
#[case(WifiSecurity::Wep, "WEP")]
#[case(WifiSecurity::Open, "nopass")]
fn test_wifi_security_codes(#[case] security: WifiSecurity, #[case] code: &str) {
    let payload = format(ContentRequest::Wifi {
        ssid: "Cafe".to_string(),
        password: "secret".to_string(),
        security: Some(security),
        hidden: true,
    })
    .unwrap();
    assert_eq!(payload, format!("WIFI:T:{};S:Cafe;P:secret;H:true;;", code));
}

#[test]
fn test_wifi_escapes_reserved_characters() {
    let payload = format(ContentRequest::Wifi {
        ssid: "My;Net".to_string(),
        password: r#"p"a:ss"#.to_string(),
        security: None,
        hidden: false,
    })
    .unwrap();
    assert_eq!(payload, r#"WIFI:T:WPA;S:My\;Net;P:p\"a\:ss;H:false;;"#);
}

#[test]
fn test_wifi_requires_ssid() {
    let err = format(ContentRequest::Wifi {
        ssid: "  ".to_string(),
        password: "x".to_string(),
        security: None,
        hidden: false,
    })
    .unwrap_err();
    assert_eq!(err, ValidationError::MissingField("ssid".to_string()));
}

// ─── vCard ───

#[test]
fn test_vcard_full_field_order() {
    let payload = format(ContentRequest::Vcard(VCardFields {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        organization: "Analytical Engines".to_string(),
        phone: "+44 20 1234".to_string(),
        email: "ada@example.com".to_string(),
        website: "https://ada.example.com".to_string(),
        address: "12 St James's Square, London".to_string(),
    }))
    .unwrap();

    let expected = [
        "BEGIN:VCARD",
        "VERSION:3.0",
        "FN:Ada Lovelace",
        "N:Lovelace;Ada;;;",
        "ORG:Analytical Engines",
        "TEL:+44 20 1234",
        "EMAIL:ada@example.com",
        "URL:https://ada.example.com",
        r"ADR:;;12 St James's Square\, London;;;;",
        "END:VCARD",
    ]
    .join("\n");
    assert_eq!(payload, expected);
}

#[test]
fn test_vcard_omits_empty_optional_fields() {
    let payload = format(ContentRequest::Vcard(VCardFields {
        last_name: "Hopper".to_string(),
        email: "grace@example.com".to_string(),
        ..VCardFields::default()
    }))
    .unwrap();

    assert_eq!(
        payload,
        "BEGIN:VCARD\nVERSION:3.0\nFN:Hopper\nN:Hopper;;;;\nEMAIL:grace@example.com\nEND:VCARD"
    );
    assert!(!payload.contains("ORG:"));
    assert!(!payload.contains("TEL:"));
}

#[test]
fn test_vcard_requires_a_name() {
    let err = format(ContentRequest::Vcard(VCardFields {
        organization: "Nobody Inc".to_string(),
        ..VCardFields::default()
    }))
    .unwrap_err();
    assert!(matches!(err, ValidationError::MissingField(_)));
}

// ─── Field maps ───

#[test]
fn test_format_fields_email() {
    let payload = ContentFormatter::new()
        .format_fields(
            ContentKind::Email,
            &fields(&[("address", "a@b.com"), ("subject", "Hi there"), ("body", "")]),
        )
        .unwrap();
    assert_eq!(payload, "mailto:a@b.com?subject=Hi%20there");
}

#[test]
fn test_format_fields_vcard_and_missing_keys() {
    let formatter = ContentFormatter::new();
    let payload = formatter
        .format_fields(ContentKind::Vcard, &fields(&[("first_name", "Linus")]))
        .unwrap();
    assert!(payload.starts_with("BEGIN:VCARD\nVERSION:3.0\nFN:Linus\n"));

    assert!(formatter.format_fields(ContentKind::Text, &HashMap::new()).is_err());
}

//! Property-based tests for the Content Formatter.
//!
//! These check that formatted payloads always follow their destination
//! grammar, for arbitrary user input.

use proptest::prelude::*;

use qrstudio::services::content_formatter::{ContentFormatter, ContentFormatterTrait};
use qrstudio::types::content::{ContentKind, ContentRequest, WifiSecurity};

fn arb_security() -> impl Strategy<Value = Option<WifiSecurity>> {
    proptest::option::of(prop_oneof![
        Just(WifiSecurity::Wpa),
        Just(WifiSecurity::Wep),
        Just(WifiSecurity::Open),
    ])
}

/// Splits a WIFI field body on unescaped `;`.
fn unescaped_semicolons(s: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in s.chars() {
        match (escaped, c) {
            (true, _) => escaped = false,
            (false, '\\') => escaped = true,
            (false, ';') => count += 1,
            _ => {}
        }
    }
    count
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Any non-blank URL comes out with an http(s) scheme and its text intact.
    #[test]
    fn url_always_has_scheme(url in "[a-zA-Z0-9./:?=&_-]{1,40}") {
        prop_assume!(!url.trim().is_empty());
        let payload = ContentFormatter::new()
            .format(&ContentRequest::Url { url: url.clone() })
            .unwrap();
        let lower = payload.to_ascii_lowercase();
        prop_assert!(lower.starts_with("http://") || lower.starts_with("https://"));
        prop_assert!(payload.ends_with(url.trim()));
        prop_assert_eq!(ContentKind::detect(&payload), ContentKind::Url);
    }

    // Phone payloads keep only digits and at most one leading '+'.
    #[test]
    fn phone_keeps_only_digits(number in "[+]?[0-9 ()-]{0,6}[0-9][0-9 ()a-z-]{0,12}") {
        let payload = ContentFormatter::new()
            .format(&ContentRequest::Phone { number: number.clone() })
            .unwrap();
        let body = payload.strip_prefix("tel:").unwrap();
        let digits = body.strip_prefix('+').unwrap_or(body);
        prop_assert!(!digits.is_empty());
        prop_assert!(digits.chars().all(|c| c.is_ascii_digit()));
        prop_assert_eq!(body.starts_with('+'), number.trim().starts_with('+'));
    }

    // Reserved characters in SSID or password never break the field layout.
    #[test]
    fn wifi_layout_survives_any_ssid(
        ssid in "[a-zA-Z0-9 ;:,\"\\\\]{1,20}",
        password in "[a-zA-Z0-9 ;:,\"\\\\]{0,20}",
        security in arb_security(),
        hidden in any::<bool>(),
    ) {
        prop_assume!(!ssid.trim().is_empty());
        let payload = ContentFormatter::new()
            .format(&ContentRequest::Wifi { ssid, password, security, hidden })
            .unwrap();

        prop_assert!(payload.starts_with("WIFI:T:"));
        let expected_tail = format!(";H:{};;", hidden);
        prop_assert!(payload.ends_with(&expected_tail));
        // T, S, P and H terminators plus the closing one.
        prop_assert_eq!(unescaped_semicolons(&payload), 5);
    }

    // The email query string never contains raw spaces or stray separators.
    #[test]
    fn email_query_is_percent_encoded(
        local in "[a-z][a-z0-9.]{0,10}",
        domain in "[a-z]{1,10}\\.(com|org|net)",
        subject in "[a-zA-Z &=?#]{0,20}",
        body in "[a-zA-Z &=?#\n]{0,20}",
    ) {
        prop_assume!(!local.ends_with('.'));
        let address = format!("{}@{}", local, domain);
        let payload = ContentFormatter::new()
            .format(&ContentRequest::Email {
                address: address.clone(),
                subject: Some(subject.clone()),
                body: Some(body.clone()),
            })
            .unwrap();

        let expected_head = format!("mailto:{}", address);
        prop_assert!(payload.starts_with(&expected_head));
        prop_assert!(!payload.contains(' '));
        prop_assert!(!payload.contains('\n'));
        let params = payload.split_once('?').map(|(_, q)| q.split('&').count()).unwrap_or(0);
        let expected = usize::from(!subject.trim().is_empty()) + usize::from(!body.trim().is_empty());
        prop_assert_eq!(params, expected);
    }

    // Every vCard is framed and keeps one field per line.
    #[test]
    fn vcard_is_framed(
        first in "[a-zA-Z,;]{0,10}",
        last in "[a-zA-Z]{1,10}",
        org in "[a-zA-Z ,\n]{0,15}",
    ) {
        let mut fields = std::collections::HashMap::new();
        fields.insert("first_name".to_string(), first);
        fields.insert("last_name".to_string(), last);
        fields.insert("organization".to_string(), org);

        let payload = ContentFormatter::new()
            .format_fields(ContentKind::Vcard, &fields)
            .unwrap();
        let lines: Vec<&str> = payload.lines().collect();
        prop_assert_eq!(lines[0], "BEGIN:VCARD");
        prop_assert_eq!(lines[1], "VERSION:3.0");
        prop_assert_eq!(*lines.last().unwrap(), "END:VCARD");
        prop_assert!(lines.iter().all(|l| l.contains(':')));
    }
}

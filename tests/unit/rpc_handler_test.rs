//! Unit tests for the RPC handler, covering every JSON-RPC method dispatched by
//! `handle_method`.
//!
//! These go through the same code path as the real `qrstudio-rpc` binary,
//! using a temporary on-disk SQLite database.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::json;
use tempfile::TempDir;

use qrstudio::app::App;
use qrstudio::rpc_handler::handle_method;
use qrstudio::services::qr_encoder::{EncodeRequest, QrEncoder, Surface};
use qrstudio::services::qr_service::QrCodeService;
use qrstudio::types::config::AppConfig;
use qrstudio::types::errors::QrError;

/// Create a fresh App backed by a temp directory DB.
fn setup() -> (Mutex<App>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let app = App::new(db_path.to_str().unwrap(), AppConfig::default()).expect("Failed to init App");
    (Mutex::new(app), tmp)
}

fn generate_url(app: &Mutex<App>, url: &str) -> serde_json::Value {
    handle_method(
        app,
        "qr.generate",
        &json!({"kind": "url", "fields": {"url": url}}),
    )
    .unwrap()
}

fn generate_url_err(app: &Mutex<App>, url: &str) -> String {
    handle_method(
        app,
        "qr.generate",
        &json!({"kind": "url", "fields": {"url": url}}),
    )
    .unwrap_err()
}

/// Sleeps past any reasonable render timeout.
struct SlowEncoder(Duration);

impl QrEncoder for SlowEncoder {
    fn draw(&self, _request: &EncodeRequest, _surface: &mut Surface) -> Result<(), QrError> {
        std::thread::sleep(self.0);
        Ok(())
    }
}

// ─── Ping ───

#[test]
fn test_ping() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "ping", &json!({})).unwrap();
    assert_eq!(res, json!({"pong": true}));
}

// ─── Unknown method ───

#[test]
fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "nonexistent.method", &json!({}));
    assert!(res.unwrap_err().contains("unknown method"));
}

// ─── QR ───

#[test]
fn test_generate_returns_record() {
    let (app, _tmp) = setup();
    let res = generate_url(&app, "example.com");

    assert_eq!(res["content"], "http://example.com");
    assert_eq!(res["kind"], "url");
    assert_eq!(res["options"]["size"], 200);
    assert_eq!(res["options"]["error_correction_level"], "Medium");
    assert!(res["id"].as_str().is_some());
}

#[test]
fn test_generate_wifi_with_checkbox_and_numbers() {
    let (app, _tmp) = setup();
    let res = handle_method(
        &app,
        "qr.generate",
        &json!({"kind": "wifi", "fields": {"ssid": 1234, "password": "pw", "security": "WEP", "hidden": true}}),
    )
    .unwrap();
    assert_eq!(res["content"], "WIFI:T:WEP;S:1234;P:pw;H:true;;");
}

#[test]
fn test_generate_errors() {
    let (app, _tmp) = setup();
    assert_eq!(
        handle_method(&app, "qr.generate", &json!({"fields": {}})).unwrap_err(),
        "missing kind"
    );
    assert!(handle_method(&app, "qr.generate", &json!({"kind": "fax"})).is_err());
    assert_eq!(
        handle_method(&app, "qr.generate", &json!({"kind": "url", "fields": "x"})).unwrap_err(),
        "fields must be an object"
    );
    assert_eq!(
        handle_method(&app, "qr.generate", &json!({"kind": "text", "fields": {}})).unwrap_err(),
        "Missing required field: text"
    );
}

#[test]
fn test_current_regenerate_and_clear() {
    let (app, _tmp) = setup();
    assert_eq!(handle_method(&app, "qr.current", &json!({})).unwrap(), json!(null));
    assert_eq!(
        handle_method(&app, "qr.regenerate", &json!({})).unwrap_err(),
        "No QR code has been generated yet"
    );

    let generated = generate_url(&app, "https://example.com");
    let current = handle_method(&app, "qr.current", &json!({})).unwrap();
    assert_eq!(current["id"], generated["id"]);

    let regenerated = handle_method(&app, "qr.regenerate", &json!({})).unwrap();
    assert_eq!(regenerated["content"], generated["content"]);
    assert_ne!(regenerated["id"], generated["id"]);

    assert_eq!(handle_method(&app, "qr.clear", &json!({})).unwrap(), json!({"ok": true}));
    assert_eq!(handle_method(&app, "qr.current", &json!({})).unwrap(), json!(null));
}

#[test]
fn test_export_png_and_svg() {
    let (app, _tmp) = setup();
    generate_url(&app, "example.com");

    let png = handle_method(&app, "qr.export", &json!({})).unwrap();
    assert_eq!(png["mime_type"], "image/png");
    assert!(png["filename"].as_str().unwrap().ends_with(".png"));
    let bytes = BASE64.decode(png["data"].as_str().unwrap()).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");

    let svg = handle_method(&app, "qr.export", &json!({"format": "svgvector"})).unwrap();
    assert_eq!(svg["mime_type"], "image/svg+xml");
    let text = String::from_utf8(BASE64.decode(svg["data"].as_str().unwrap()).unwrap()).unwrap();
    assert!(text.starts_with("<svg"));
}

#[test]
fn test_export_errors() {
    let (app, _tmp) = setup();
    assert_eq!(
        handle_method(&app, "qr.export", &json!({"format": "png"})).unwrap_err(),
        "No QR code has been generated yet"
    );

    generate_url(&app, "example.com");
    assert!(handle_method(&app, "qr.export", &json!({"format": "bmp"}))
        .unwrap_err()
        .contains("unsupported export format"));
    assert!(handle_method(&app, "qr.export", &json!({"format": "jpeg", "quality": 3.0}))
        .unwrap_err()
        .contains("Invalid export quality"));
}

#[test]
fn test_export_size_out_of_range() {
    let (app, _tmp) = setup();
    generate_url(&app, "example.com");

    let err = handle_method(&app, "qr.export", &json!({"format": "png", "size": 4294967396u64}))
        .unwrap_err();
    assert!(err.contains("size out of range"));

    let err = handle_method(&app, "qr.export", &json!({"format": "png", "size": 5000}))
        .unwrap_err();
    assert!(err.contains("exceeds the maximum"));
}

#[test]
fn test_oversized_customization_fails_generate_without_poisoning() {
    let (app, _tmp) = setup();
    handle_method(&app, "customize.set", &json!({"field": "size", "value": 4294967295u64})).unwrap();

    let err = generate_url_err(&app, "example.com");
    assert!(err.contains("exceeds the maximum"));

    // The lock still works after the failure.
    assert_eq!(handle_method(&app, "qr.current", &json!({})).unwrap(), json!(null));
    handle_method(&app, "customize.set", &json!({"field": "size", "value": 300})).unwrap();
    let res = generate_url(&app, "example.com");
    assert_eq!(res["options"]["size"], 300);
}

#[test]
fn test_generate_is_bounded_by_render_timeout() {
    let mut config = AppConfig::default();
    config.render.timeout_ms = 20;
    let mut app = App::open_in_memory(config).expect("Failed to init App");
    app.qr_service = QrCodeService::with_encoder(
        app.bus.clone(),
        Arc::new(SlowEncoder(Duration::from_millis(300))),
    );
    let app = Mutex::new(app);

    let err = generate_url_err(&app, "example.com");
    assert_eq!(err, "QR rendering timed out after 20 ms");
    assert_eq!(handle_method(&app, "qr.current", &json!({})).unwrap(), json!(null));
    let list = handle_method(&app, "history.list", &json!({})).unwrap();
    assert!(list["items"].as_array().unwrap().is_empty());
}

// ─── History ───

#[test]
fn test_history_list_remove_clear() {
    let (app, _tmp) = setup();
    let first = generate_url(&app, "one.example");
    generate_url(&app, "two.example");

    let list = handle_method(&app, "history.list", &json!({})).unwrap();
    assert_eq!(list["capacity"], 10);
    let items = list["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["content"], "http://two.example");

    let removed = handle_method(&app, "history.remove", &json!({"id": first["id"]})).unwrap();
    assert_eq!(removed, json!({"removed": true}));
    let again = handle_method(&app, "history.remove", &json!({"id": first["id"]})).unwrap();
    assert_eq!(again, json!({"removed": false}));
    assert!(handle_method(&app, "history.remove", &json!({})).is_err());

    handle_method(&app, "history.clear", &json!({})).unwrap();
    handle_method(&app, "history.clear", &json!({})).unwrap();
    let list = handle_method(&app, "history.list", &json!({})).unwrap();
    assert!(list["items"].as_array().unwrap().is_empty());
}

#[test]
fn test_history_restore() {
    let (app, _tmp) = setup();
    let first = generate_url(&app, "first.example");
    generate_url(&app, "second.example");

    let restored = handle_method(&app, "history.restore", &json!({"id": first["id"]})).unwrap();
    assert_eq!(restored["content"], "http://first.example");

    let current = handle_method(&app, "qr.current", &json!({})).unwrap();
    assert_eq!(current["id"], restored["id"]);

    assert!(handle_method(&app, "history.restore", &json!({"id": "missing"}))
        .unwrap_err()
        .contains("History entry not found"));
}

// ─── Customization ───

#[test]
fn test_customize_get_set_reset() {
    let (app, _tmp) = setup();
    let options = handle_method(&app, "customize.get", &json!({})).unwrap();
    assert_eq!(options["color_dark"], "#000000");

    let res = handle_method(
        &app,
        "customize.set",
        &json!({"field": "colorDark", "value": "#00aa00"}),
    )
    .unwrap();
    assert_eq!(res["options"]["color_dark"], "#00aa00");
    assert_eq!(res["record"], json!(null));

    generate_url(&app, "example.com");
    let res = handle_method(&app, "customize.set", &json!({"field": "size", "value": 256})).unwrap();
    assert_eq!(res["record"]["options"]["size"], 256);

    let err = handle_method(&app, "customize.set", &json!({"field": "colorDark", "value": "red"}))
        .unwrap_err();
    assert_eq!(err, "Invalid color: red (expected #RRGGBB)");

    let res = handle_method(&app, "customize.reset", &json!({})).unwrap();
    assert_eq!(res["record"]["options"]["size"], 200);
    let options = handle_method(&app, "customize.get", &json!({})).unwrap();
    assert_eq!(options["color_dark"], "#000000");
}

#[test]
fn test_customize_set_missing_params() {
    let (app, _tmp) = setup();
    assert_eq!(
        handle_method(&app, "customize.set", &json!({"value": 1})).unwrap_err(),
        "missing field"
    );
    assert_eq!(
        handle_method(&app, "customize.set", &json!({"field": "size"})).unwrap_err(),
        "missing value"
    );
}

// ─── Presets ───

#[test]
fn test_preset_roundtrip() {
    let (app, _tmp) = setup();
    handle_method(&app, "customize.set", &json!({"field": "margin", "value": 1})).unwrap();
    assert_eq!(
        handle_method(&app, "preset.save", &json!({"name": "tight"})).unwrap(),
        json!({"ok": true})
    );
    assert_eq!(
        handle_method(&app, "preset.list", &json!({})).unwrap(),
        json!(["tight"])
    );

    handle_method(&app, "customize.reset", &json!({})).unwrap();
    let applied = handle_method(&app, "preset.apply", &json!({"name": "tight"})).unwrap();
    assert_eq!(applied, json!({"record": null}));
    let options = handle_method(&app, "customize.get", &json!({})).unwrap();
    assert_eq!(options["margin"], 1);

    assert_eq!(
        handle_method(&app, "preset.delete", &json!({"name": "tight"})).unwrap(),
        json!({"removed": true})
    );
    assert!(handle_method(&app, "preset.apply", &json!({"name": "tight"}))
        .unwrap_err()
        .contains("Preset not found"));
}

// ─── Config ───

#[test]
fn test_config_get() {
    let (app, _tmp) = setup();
    let config = handle_method(&app, "config.get", &json!({})).unwrap();
    assert_eq!(config["history"]["capacity"], 10);
    assert_eq!(config["render"]["timeout_ms"], 500);
    assert_eq!(config["export"]["default_format"], "png");
}

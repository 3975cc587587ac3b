//! RPC method handler for the qrstudio JSON-RPC protocol.
//!
//! Kept separate from `rpc_server.rs` so it can be unit-tested without
//! stdin/stdout. `handle_method` dispatches a method call to the `App`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::history_store::HistoryStoreTrait;
use crate::managers::preset_store::PresetStoreTrait;
use crate::services::customization::CustomizationStateTrait;
use crate::services::qr_service::QrCodeServiceTrait;
use crate::types::content::ContentKind;
use crate::types::export::ExportFormat;
use crate::types::record::QrRecord;

fn record_json(record: &QrRecord) -> Result<Value, String> {
    serde_json::to_value(record).map_err(|e| e.to_string())
}

fn optional_record_json(record: Option<QrRecord>) -> Result<Value, String> {
    match record {
        Some(r) => record_json(&r),
        None => Ok(Value::Null),
    }
}

/// Reads `params.fields` as a flat string map; numbers and booleans are
/// stringified so checkbox and numeric inputs pass through.
fn string_fields(params: &Value) -> Result<HashMap<String, String>, String> {
    let mut fields = HashMap::new();
    let map = match params.get("fields") {
        Some(Value::Object(map)) => map,
        Some(_) => return Err("fields must be an object".to_string()),
        None => return Ok(fields),
    };
    for (key, value) in map {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Null => continue,
            _ => return Err(format!("field {} must be a string", key)),
        };
        fields.insert(key.clone(), text);
    }
    Ok(fields)
}

/// Drives `future` on a throwaway current-thread runtime. Shutdown does not
/// wait for an encoder that outlived its timeout.
fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| format!("could not start render runtime: {}", e))?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with a user-facing message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── QR ───
        "qr.generate" => {
            let kind = params.get("kind").and_then(|v| v.as_str()).ok_or("missing kind")?;
            let kind = kind.parse::<ContentKind>().map_err(|e| e.to_string())?;
            let fields = string_fields(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let record = block_on(a.generate_fields_bounded(kind, &fields))?
                .map_err(|e| e.to_string())?;
            record_json(&record)
        }
        "qr.regenerate" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let record = a.regenerate().map_err(|e| e.to_string())?;
            record_json(&record)
        }
        "qr.clear" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.clear();
            Ok(json!({"ok": true}))
        }
        "qr.current" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            optional_record_json(a.qr_service.current().map(|active| active.record.clone()))
        }
        "qr.export" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let format = match params.get("format").and_then(|v| v.as_str()) {
                Some(f) => f.parse::<ExportFormat>()?,
                None => a.config.export.default_format,
            };
            let size = match params.get("size").and_then(|v| v.as_u64()) {
                Some(s) => Some(u32::try_from(s).map_err(|_| format!("size out of range: {}", s))?),
                None => None,
            };
            let mut options = a.export_options(size);
            if let Some(q) = params.get("quality").and_then(|v| v.as_f64()) {
                options.quality = q as f32;
            }
            let artifact = a.export(format, &options).map_err(|e| e.to_string())?;
            Ok(json!({
                "filename": artifact.filename,
                "mime_type": artifact.mime_type(),
                "data": artifact.to_base64(),
            }))
        }

        // ─── History ───
        "history.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let records = a.history.list();
            let items = serde_json::to_value(&records).map_err(|e| e.to_string())?;
            Ok(json!({"items": items, "capacity": a.history.capacity()}))
        }
        "history.remove" => {
            let id = params.get("id").and_then(|v| v.as_str()).ok_or("missing id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let removed = a.history.remove(id).map_err(|e| e.to_string())?;
            Ok(json!({"removed": removed}))
        }
        "history.clear" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.history.clear().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "history.restore" => {
            let id = params.get("id").and_then(|v| v.as_str()).ok_or("missing id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let record = a.restore_from_history(id).map_err(|e| e.to_string())?;
            record_json(&record)
        }

        // ─── Customization ───
        "customize.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(a.customization.to_render_options()).map_err(|e| e.to_string())
        }
        "customize.set" => {
            let field = params.get("field").and_then(|v| v.as_str()).ok_or("missing field")?;
            let value = params.get("value").ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let record = a.customize(field, value).map_err(|e| e.to_string())?;
            Ok(json!({
                "options": serde_json::to_value(a.customization.to_render_options()).map_err(|e| e.to_string())?,
                "record": optional_record_json(record)?,
            }))
        }
        "customize.reset" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let record = a.reset_customization().map_err(|e| e.to_string())?;
            Ok(json!({"record": optional_record_json(record)?}))
        }

        // ─── Presets ───
        "preset.save" => {
            let name = params.get("name").and_then(|v| v.as_str()).ok_or("missing name")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.save_preset(name).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "preset.apply" => {
            let name = params.get("name").and_then(|v| v.as_str()).ok_or("missing name")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let record = a.apply_preset(name).map_err(|e| e.to_string())?;
            Ok(json!({"record": optional_record_json(record)?}))
        }
        "preset.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!(a.presets.list()))
        }
        "preset.delete" => {
            let name = params.get("name").and_then(|v| v.as_str()).ok_or("missing name")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let removed = a.presets.delete(name).map_err(|e| e.to_string())?;
            Ok(json!({"removed": removed}))
        }

        // ─── Config ───
        "config.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(&a.config).map_err(|e| e.to_string())
        }

        // ─── Ping ───
        "ping" => Ok(json!({"pong": true})),

        _ => Err(format!("unknown method: {}", method)),
    }
}

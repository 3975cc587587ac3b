//! qrstudio RPC Server: JSON-RPC over stdin/stdout for UI front ends.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"qr.generate", "params":{"kind":"url","fields":{"url":"..."}}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Events:   {"event":"generation_succeeded", ...} lines follow the response
//!           that caused them.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use qrstudio::app::App;
use qrstudio::platform;
use qrstudio::rpc_handler::handle_method;
use qrstudio::services::config_engine::{ConfigEngine, ConfigEngineTrait};
use qrstudio::services::notification_bus;
use qrstudio::types::config::AppConfig;

use serde_json::{json, Value};

fn emit(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn main() {
    let mut config_engine = ConfigEngine::new(None);
    let (config, config_error) = match config_engine.load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if let Some(e) = config_error {
        log::warn!("using default config: {}", e);
    }

    let data_dir = platform::resolve_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        log::warn!("could not create data dir {}: {}", data_dir.display(), e);
    }
    let db_path = data_dir.join("qrstudio.db");

    let app = match App::new(&db_path.to_string_lossy(), config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("failed to initialize qrstudio at {}: {}", db_path.display(), e);
            std::process::exit(1);
        }
    };
    let mut events = app.bus.subscribe();
    let app = Mutex::new(app);
    log::info!("qrstudio-rpc ready, database at {}", db_path.display());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if emit(&mut out, &ready).is_err() {
        return;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(json!({}));

                match handle_method(&app, method, &params) {
                    Ok(val) => json!({"id": id, "result": val}),
                    Err(err) => {
                        log::debug!("{} failed: {}", method, err);
                        json!({"id": id, "error": err})
                    }
                }
            }
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
        };

        if emit(&mut out, &response).is_err() {
            break;
        }
        for event in notification_bus::drain(&mut events) {
            match serde_json::to_value(&event) {
                Ok(value) => {
                    if emit(&mut out, &value).is_err() {
                        return;
                    }
                }
                Err(e) => log::error!("could not serialize {}: {}", event.name(), e),
            }
        }
    }
}

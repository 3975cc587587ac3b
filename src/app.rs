//! App Core for qrstudio.
//!
//! The session context: owns every component and the only mutable state
//! (the active QR code, the history log, the customization), and wires the
//! generate → notify → record-in-history flow between them. Failures are
//! caught here, logged, published on the bus, and returned as [`AppError`].

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use crate::database::connection::Database;
use crate::managers::history_store::{HistoryStore, HistoryStoreTrait};
use crate::managers::preset_store::{PresetStore, PresetStoreTrait};
use crate::services::content_formatter::{ContentFormatter, ContentFormatterTrait};
use crate::services::customization::{CustomizationState, CustomizationStateTrait};
use crate::services::export_service::{ExportService, ExportServiceTrait};
use crate::services::notification_bus::NotificationBus;
use crate::services::qr_service::{QrCodeService, QrCodeServiceTrait};
use crate::types::config::AppConfig;
use crate::types::content::{ContentKind, ContentRequest};
use crate::types::errors::{AppError, CustomizationError, QrError, ValidationError};
use crate::types::events::QrEvent;
use crate::types::export::{ExportArtifact, ExportFormat, ExportOptions};
use crate::types::record::QrRecord;

/// Central application struct holding all components.
pub struct App {
    pub db: Arc<Database>,
    pub bus: NotificationBus,
    pub config: AppConfig,
    pub formatter: ContentFormatter,
    pub qr_service: QrCodeService,
    pub export_service: ExportService,
    pub history: HistoryStore,
    pub presets: PresetStore,
    pub customization: CustomizationState,
}

impl App {
    /// Opens the database at `db_path` and builds every component.
    pub fn new(db_path: &str, config: AppConfig) -> Result<Self, Box<dyn Error>> {
        let db = Database::open(db_path)?;
        Ok(Self::with_database(db, config))
    }

    /// Same as [`App::new`] with a throwaway in-memory database.
    pub fn open_in_memory(config: AppConfig) -> Result<Self, Box<dyn Error>> {
        let db = Database::open_in_memory()?;
        Ok(Self::with_database(db, config))
    }

    fn with_database(db: Database, config: AppConfig) -> Self {
        let db = Arc::new(db);
        let bus = NotificationBus::new();
        Self {
            qr_service: QrCodeService::new(bus.clone()),
            export_service: ExportService::new(bus.clone()),
            history: HistoryStore::with_capacity(db.clone(), config.history.capacity),
            presets: PresetStore::new(db.clone()),
            customization: CustomizationState::new(),
            formatter: ContentFormatter::new(),
            db,
            bus,
            config,
        }
    }

    fn format_payload(&self, request: &ContentRequest) -> Result<String, AppError> {
        self.formatter
            .format(request)
            .map_err(|err| self.validation_failed(err))
    }

    fn validation_failed(&self, err: ValidationError) -> AppError {
        log::info!("validation failed on {}: {}", err.field(), err);
        self.bus.publish(QrEvent::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        });
        AppError::Validation(err)
    }

    fn customization_failed(&self, field: &str, err: CustomizationError) -> AppError {
        log::info!("customization of {} rejected: {}", field, err);
        self.bus.publish(QrEvent::ValidationFailed {
            field: field.to_string(),
            message: err.to_string(),
        });
        AppError::Customization(err)
    }

    /// History write failures never block generation.
    fn record_history(&mut self, record: &QrRecord) {
        if let Err(e) = self.history.append(record.clone()) {
            log::error!("could not save {} to history: {}", record.id, e);
        }
    }

    /// Formats `request`, renders it with the current customization, and
    /// records the result in history.
    pub fn generate(&mut self, request: &ContentRequest) -> Result<QrRecord, AppError> {
        let payload = self.format_payload(request)?;
        let options = self.customization.to_render_options();
        let record = self.qr_service.generate(&payload, &options)?;
        self.record_history(&record);
        Ok(record)
    }

    /// Form-field entry point for [`App::generate`].
    pub fn generate_fields(
        &mut self,
        kind: ContentKind,
        fields: &HashMap<String, String>,
    ) -> Result<QrRecord, AppError> {
        let request =
            ContentRequest::from_fields(kind, fields).map_err(|err| self.validation_failed(err))?;
        self.generate(&request)
    }

    /// Like [`App::generate`], bounding the encoder by `render.timeout_ms`.
    pub async fn generate_bounded(&mut self, request: &ContentRequest) -> Result<QrRecord, AppError> {
        let payload = self.format_payload(request)?;
        let options = self.customization.to_render_options();
        let timeout = Duration::from_millis(self.config.render.timeout_ms);
        let record = self
            .qr_service
            .generate_bounded(&payload, &options, timeout)
            .await?;
        self.record_history(&record);
        Ok(record)
    }

    /// Form-field entry point for [`App::generate_bounded`].
    pub async fn generate_fields_bounded(
        &mut self,
        kind: ContentKind,
        fields: &HashMap<String, String>,
    ) -> Result<QrRecord, AppError> {
        let request =
            ContentRequest::from_fields(kind, fields).map_err(|err| self.validation_failed(err))?;
        self.generate_bounded(&request).await
    }

    /// Re-renders the active payload with the current customization.
    pub fn regenerate(&mut self) -> Result<QrRecord, AppError> {
        let options = self.customization.to_render_options();
        let record = self.qr_service.regenerate(&options)?;
        self.record_history(&record);
        Ok(record)
    }

    /// Re-renders only when something is on display.
    fn refresh(&mut self) -> Result<Option<QrRecord>, AppError> {
        if self.qr_service.current().is_none() {
            return Ok(None);
        }
        self.regenerate().map(Some)
    }

    /// Changes one style field, then refreshes the active QR code.
    pub fn customize(
        &mut self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<Option<QrRecord>, AppError> {
        if let Err(err) = self.customization.set_value(key, value) {
            return Err(self.customization_failed(key, err));
        }
        self.refresh()
    }

    pub fn reset_customization(&mut self) -> Result<Option<QrRecord>, AppError> {
        self.customization.reset();
        self.refresh()
    }

    /// Stores the current customization under `name`.
    pub fn save_preset(&mut self, name: &str) -> Result<(), AppError> {
        let options = self.customization.to_render_options();
        self.presets
            .save(name, &options)
            .map_err(|err| self.customization_failed("name", err))
    }

    /// Adopts a stored preset, then refreshes the active QR code.
    pub fn apply_preset(&mut self, name: &str) -> Result<Option<QrRecord>, AppError> {
        let options = self
            .presets
            .load(name)
            .map_err(|err| self.customization_failed("name", err))?;
        if let Err(err) = self.customization.apply(options) {
            return Err(self.customization_failed("preset", err));
        }
        self.refresh()
    }

    /// Export options with the configured default JPEG quality.
    pub fn export_options(&self, target_size: Option<u32>) -> ExportOptions {
        ExportOptions {
            quality: self.config.export.jpeg_quality,
            target_size,
        }
    }

    /// Exports the active QR code.
    pub fn export(
        &self,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<ExportArtifact, AppError> {
        let active = match self.qr_service.current() {
            Some(active) => active,
            None => {
                log::info!("export requested with nothing generated");
                self.bus.publish(QrEvent::GenerationFailed {
                    error: QrError::NoActiveRecord.to_string(),
                    context: "export".to_string(),
                });
                return Err(QrError::NoActiveRecord.into());
            }
        };
        let artifact = self.export_service.export(
            format,
            &active.record,
            Some(&active.surface),
            options,
        )?;
        Ok(artifact)
    }

    /// Renders a past record again, adopting its render options.
    pub fn restore_from_history(&mut self, id: &str) -> Result<QrRecord, AppError> {
        let past = self
            .history
            .get(id)
            .ok_or_else(|| AppError::HistoryEntryNotFound(id.to_string()))?;
        if let Err(err) = self.customization.apply(past.options.clone()) {
            return Err(self.customization_failed("history", err));
        }
        let record = self.qr_service.generate(&past.content, &past.options)?;
        self.record_history(&record);
        Ok(record)
    }

    pub fn clear(&mut self) {
        self.qr_service.clear();
    }
}

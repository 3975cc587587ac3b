//! QR Code Service: owns the single active QR code.
//!
//! Rendering is split into `begin` / `render` / `complete` so a caller that
//! drives the encoder asynchronously can start a new render while an older
//! one is still running: every `begin` (and every `clear`) bumps a
//! generation counter, and `complete` discards tickets from older
//! generations instead of letting them overwrite newer output.

use std::sync::Arc;
use std::time::Duration;

use crate::services::notification_bus::NotificationBus;
use crate::services::qr_encoder::{EncodeRequest, ModuleEncoder, QrEncoder, Surface};
use crate::types::errors::QrError;
use crate::types::events::QrEvent;
use crate::types::record::{ErrorCorrectionLevel, QrRecord, RenderOptions};

/// Trait defining the QR code service interface.
pub trait QrCodeServiceTrait {
    fn generate(&mut self, payload: &str, options: &RenderOptions) -> Result<QrRecord, QrError>;
    fn regenerate(&mut self, options: &RenderOptions) -> Result<QrRecord, QrError>;
    fn clear(&mut self);
    fn current(&self) -> Option<&ActiveQr>;
}

/// The QR code currently on display.
#[derive(Debug, Clone)]
pub struct ActiveQr {
    pub record: QrRecord,
    pub surface: Surface,
}

/// A render that has been started but not completed.
#[derive(Debug, Clone)]
pub struct RenderTicket {
    generation: u64,
    options: RenderOptions,
    request: EncodeRequest,
}

impl RenderTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn payload(&self) -> &str {
        &self.request.payload
    }
}

/// Rejects payloads longer than the level's character capacity.
pub fn check_capacity(payload: &str, level: ErrorCorrectionLevel) -> Result<(), QrError> {
    let length = payload.chars().count();
    let limit = level.capacity();
    if length > limit {
        return Err(QrError::CapacityExceeded { limit, length });
    }
    Ok(())
}

pub struct QrCodeService {
    encoder: Arc<dyn QrEncoder + Send + Sync>,
    bus: NotificationBus,
    current: Option<ActiveQr>,
    generation: u64,
}

impl QrCodeService {
    /// Creates a service using the default [`ModuleEncoder`].
    pub fn new(bus: NotificationBus) -> Self {
        Self::with_encoder(bus, Arc::new(ModuleEncoder::new()))
    }

    pub fn with_encoder(bus: NotificationBus, encoder: Arc<dyn QrEncoder + Send + Sync>) -> Self {
        Self {
            encoder,
            bus,
            current: None,
            generation: 0,
        }
    }

    /// Validates the payload and options, clears the active QR and starts a
    /// new generation.
    pub fn begin(&mut self, payload: &str, options: &RenderOptions) -> Result<RenderTicket, QrError> {
        let prepared = Self::prepare(payload, options);
        let request = match prepared {
            Ok(request) => request,
            Err(err) => {
                self.report_failure(&err, "generate");
                return Err(err);
            }
        };

        self.current = None;
        self.generation += 1;
        Ok(RenderTicket {
            generation: self.generation,
            options: options.clone(),
            request,
        })
    }

    fn prepare(payload: &str, options: &RenderOptions) -> Result<EncodeRequest, QrError> {
        if payload.is_empty() {
            return Err(QrError::EmptyPayload);
        }
        check_capacity(payload, options.error_correction_level)?;
        EncodeRequest::from_options(payload, options)
    }

    /// Runs the encoder for `ticket` on the calling thread.
    pub fn render(&self, ticket: &RenderTicket) -> Result<Surface, QrError> {
        draw_with(self.encoder.as_ref(), &ticket.request)
    }

    /// Finishes a render. Returns `Ok(None)` when the ticket was superseded
    /// by a later `begin` or `clear`; its outcome is dropped.
    pub fn complete(
        &mut self,
        ticket: RenderTicket,
        outcome: Result<Surface, QrError>,
    ) -> Result<Option<QrRecord>, QrError> {
        if ticket.generation != self.generation {
            log::debug!(
                "discarding stale render {} (current generation {})",
                ticket.generation,
                self.generation
            );
            return Ok(None);
        }

        let surface = match outcome {
            Ok(surface) => surface,
            Err(err) => {
                self.report_failure(&err, "render");
                return Err(err);
            }
        };

        let record = QrRecord::new(&ticket.request.payload, ticket.options);
        log::info!(
            "generated {} QR {} ({} chars, level {})",
            record.kind,
            record.id,
            record.content.chars().count(),
            record.options.error_correction_level
        );
        self.current = Some(ActiveQr {
            record: record.clone(),
            surface,
        });
        self.bus.publish(QrEvent::GenerationSucceeded {
            record: record.clone(),
        });
        Ok(Some(record))
    }

    /// Like `generate`, but runs the encoder on a blocking task and gives up
    /// after `timeout`. The outcome is checked once; there is no retry.
    pub async fn generate_bounded(
        &mut self,
        payload: &str,
        options: &RenderOptions,
        timeout: Duration,
    ) -> Result<QrRecord, QrError> {
        let ticket = self.begin(payload, options)?;
        let encoder = Arc::clone(&self.encoder);
        let request = ticket.request.clone();

        let task = tokio::task::spawn_blocking(move || draw_with(encoder.as_ref(), &request));
        let outcome = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(QrError::EncodeFailed(join_err.to_string())),
            Err(_) => Err(QrError::RenderTimeout(timeout.as_millis() as u64)),
        };

        self.complete(ticket, outcome)?.ok_or(QrError::Superseded)
    }

    fn report_failure(&self, err: &QrError, context: &str) {
        log::warn!("QR {} failed: {}", context, err);
        self.bus.publish(QrEvent::GenerationFailed {
            error: err.to_string(),
            context: context.to_string(),
        });
    }
}

fn draw_with(encoder: &(dyn QrEncoder + Send + Sync), request: &EncodeRequest) -> Result<Surface, QrError> {
    let mut surface = request.blank_surface();
    encoder.draw(request, &mut surface)?;
    Ok(surface)
}

impl QrCodeServiceTrait for QrCodeService {
    /// Renders `payload` and makes it the active QR code.
    fn generate(&mut self, payload: &str, options: &RenderOptions) -> Result<QrRecord, QrError> {
        let ticket = self.begin(payload, options)?;
        let outcome = self.render(&ticket);
        self.complete(ticket, outcome)?.ok_or(QrError::Superseded)
    }

    /// Re-encodes the active payload with new options.
    fn regenerate(&mut self, options: &RenderOptions) -> Result<QrRecord, QrError> {
        let payload = match &self.current {
            Some(active) => active.record.content.clone(),
            None => {
                self.report_failure(&QrError::NoActiveRecord, "regenerate");
                return Err(QrError::NoActiveRecord);
            }
        };
        self.generate(&payload, options)
    }

    /// Drops the active QR code and invalidates in-flight renders.
    fn clear(&mut self) {
        self.current = None;
        self.generation += 1;
    }

    fn current(&self) -> Option<&ActiveQr> {
        self.current.as_ref()
    }
}

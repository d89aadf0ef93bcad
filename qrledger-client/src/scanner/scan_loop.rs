use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{CameraError, CooldownFilter, Decoder, ScannerError};
use crate::time::TimeProvider;

/// Receiver of decoded payloads and scanner lifecycle events.
#[async_trait]
pub trait ScanHandler: Send + Sync {
    async fn handle_scan_result(&self, content: String);

    fn camera_failed(&self, error: &CameraError);

    fn scanner_stopped(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
}

/// Drives a [`Decoder`] and forwards accepted payloads to a [`ScanHandler`].
///
/// While a payload is being handled the decoder is paused; it resumes once
/// the cooldown has elapsed, provided the loop has not been cancelled.
pub struct ScanLoop<D> {
    decoder: D,
    handler: Arc<dyn ScanHandler>,
    clock: Arc<dyn TimeProvider>,
    filter: CooldownFilter,
    state: ScanState,
    handling: bool,
}

impl<D> std::fmt::Debug for ScanLoop<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanLoop")
            .field("state", &self.state)
            .field("handling", &self.handling)
            .field("cooldown", &self.filter.cooldown())
            .finish()
    }
}

impl<D: Decoder> ScanLoop<D> {
    pub fn new(
        decoder: D,
        handler: Arc<dyn ScanHandler>,
        clock: Arc<dyn TimeProvider>,
        cooldown: Duration,
    ) -> Self {
        Self {
            decoder,
            handler,
            clock,
            filter: CooldownFilter::new(cooldown),
            state: ScanState::Idle,
            handling: false,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Scan until cancelled or until the decoder runs dry.
    ///
    /// A camera failure is reported to the handler and ends the loop.
    pub async fn run(
        &mut self,
        cancel: CancellationToken,
    ) -> Result<(), ScannerError> {
        if let Err(error) = self.decoder.start().await {
            return Err(self.fail(error));
        }
        self.state = ScanState::Scanning;
        info!(cooldown = ?self.filter.cooldown(), "scanner started");

        let outcome = loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => break Ok(()),
                next = self.decoder.on_result() => next,
            };
            match next {
                Ok(Some(payload)) => {
                    if let Err(error) = self.accept(payload, &cancel).await {
                        break Err(error);
                    }
                }
                Ok(None) => {
                    debug!("decoder exhausted");
                    break Ok(());
                }
                Err(error) => break Err(error),
            }
        };

        self.decoder.stop().await;
        self.state = ScanState::Idle;
        match outcome {
            Ok(()) => {
                info!("scanner stopped");
                self.handler.scanner_stopped();
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    async fn accept(
        &mut self,
        payload: String,
        cancel: &CancellationToken,
    ) -> Result<(), ScannerError> {
        if self.handling || !self.filter.admit(&payload, self.clock.now()) {
            debug!(%payload, "ignoring repeated scan");
            return Ok(());
        }

        self.handling = true;
        self.decoder.stop().await;
        self.handler.handle_scan_result(payload).await;

        tokio::select! {
            _ = cancel.cancelled() => self.state = ScanState::Idle,
            _ = self.clock.sleep(self.filter.cooldown()) => {}
        }
        self.handling = false;

        if self.state == ScanState::Scanning {
            self.decoder.start().await?;
        }
        Ok(())
    }

    fn fail(&mut self, error: ScannerError) -> ScannerError {
        self.state = ScanState::Idle;
        match &error {
            ScannerError::Camera(camera) => {
                warn!(error = %camera, "camera failure");
                self.handler.camera_failed(camera);
            }
            other => warn!(error = %other, "scanner failed"),
        }
        error
    }
}

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::{CameraError, Decoder, DecoderHints, ScannerError};

/// Prefix an upstream decoder uses to report a camera failure by name,
/// e.g. `!camera-error NotAllowedError`.
pub const CAMERA_ERROR_PREFIX: &str = "!camera-error";

enum LineEvent {
    Payload { generation: u64, text: String },
    Camera(CameraError),
    Failed(std::io::Error),
}

/// Decoder fed by newline-separated payloads from an async reader, such as
/// stdin piped from an external camera decoder.
pub struct LineDecoder {
    reader: Option<Box<dyn AsyncBufRead + Send + Unpin>>,
    events: Option<mpsc::Receiver<LineEvent>>,
    task: Option<JoinHandle<()>>,
    active: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    min_interval: Duration,
    last_emit: Option<Instant>,
}

impl std::fmt::Debug for LineDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineDecoder")
            .field("active", &self.active.load(Ordering::SeqCst))
            .field("min_interval", &self.min_interval)
            .finish()
    }
}

impl LineDecoder {
    pub fn new(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        Self::with_hints(reader, &DecoderHints::default())
    }

    pub fn with_hints(
        reader: impl AsyncBufRead + Send + Unpin + 'static,
        hints: &DecoderHints,
    ) -> Self {
        let per_second = hints.max_scans_per_second.max(1);
        Self {
            reader: Some(Box::new(reader)),
            events: None,
            task: None,
            active: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            min_interval: Duration::from_secs(1) / per_second,
            last_emit: None,
        }
    }

    fn spawn_reader(&mut self) {
        let Some(reader) = self.reader.take() else {
            return;
        };
        let (tx, rx) = mpsc::channel(16);
        let active = Arc::clone(&self.active);
        let generation = Arc::clone(&self.generation);

        self.events = Some(rx);
        self.task = Some(tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                let event = match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if let Some(name) = line.strip_prefix(CAMERA_ERROR_PREFIX) {
                            LineEvent::Camera(CameraError::from_name(name))
                        } else {
                            // Generation is read before the active flag so a
                            // stop/start race tags the payload as stale.
                            let current = generation.load(Ordering::SeqCst);
                            if !active.load(Ordering::SeqCst) {
                                trace!("discarding payload read while paused");
                                continue;
                            }
                            LineEvent::Payload {
                                generation: current,
                                text: line.to_string(),
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(error) => LineEvent::Failed(error),
                };
                let failed = matches!(event, LineEvent::Failed(_));
                if tx.send(event).await.is_err() || failed {
                    break;
                }
            }
            debug!("line decoder input closed");
        }));
    }

    async fn throttle(&mut self) {
        if let Some(last) = self.last_emit {
            tokio::time::sleep_until(last + self.min_interval).await;
        }
        self.last_emit = Some(Instant::now());
    }
}

#[async_trait]
impl Decoder for LineDecoder {
    async fn start(&mut self) -> Result<(), ScannerError> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
        self.spawn_reader();
        Ok(())
    }

    async fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }

    async fn on_result(&mut self) -> Result<Option<String>, ScannerError> {
        loop {
            let Some(events) = self.events.as_mut() else {
                return Ok(None);
            };
            match events.recv().await {
                Some(LineEvent::Payload { generation, text }) => {
                    let stale = generation != self.generation.load(Ordering::SeqCst)
                        || !self.active.load(Ordering::SeqCst);
                    if stale {
                        trace!("discarding payload from a paused period");
                        continue;
                    }
                    self.throttle().await;
                    return Ok(Some(text));
                }
                Some(LineEvent::Camera(error)) => {
                    return Err(ScannerError::Camera(error));
                }
                Some(LineEvent::Failed(error)) => return Err(error.into()),
                None => return Ok(None),
            }
        }
    }
}

impl Drop for LineDecoder {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

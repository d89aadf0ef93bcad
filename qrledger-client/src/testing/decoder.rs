use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

use crate::scanner::{CameraError, Decoder, ScannerError};

#[derive(Debug, Default)]
struct DecoderState {
    active: bool,
    starts: usize,
    stops: usize,
    discarded: Vec<String>,
    start_error: Option<CameraError>,
    sender: Option<mpsc::UnboundedSender<Result<String, CameraError>>>,
}

/// Decoder driven by a [`DecoderHandle`]: payloads pushed while the decoder
/// is stopped are dropped, as a paused camera would.
#[derive(Debug)]
pub struct ScriptedDecoder {
    state: Arc<Mutex<DecoderState>>,
    results: mpsc::UnboundedReceiver<Result<String, CameraError>>,
}

#[derive(Debug, Clone)]
pub struct DecoderHandle {
    state: Arc<Mutex<DecoderState>>,
}

fn lock(state: &Mutex<DecoderState>) -> MutexGuard<'_, DecoderState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedDecoder {
    pub fn new() -> (Self, DecoderHandle) {
        let (sender, results) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(DecoderState {
            sender: Some(sender),
            ..DecoderState::default()
        }));
        (
            Self {
                state: Arc::clone(&state),
                results,
            },
            DecoderHandle { state },
        )
    }
}

impl DecoderHandle {
    /// Deliver a payload; returns whether the decoder accepted it.
    pub fn push(&self, payload: impl Into<String>) -> bool {
        let mut state = lock(&self.state);
        let payload = payload.into();
        if !state.active {
            state.discarded.push(payload);
            return false;
        }
        state
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(Ok(payload)).is_ok())
    }

    /// Report a camera failure from the running decoder.
    pub fn fail(&self, error: CameraError) {
        if let Some(sender) = lock(&self.state).sender.as_ref() {
            let _ = sender.send(Err(error));
        }
    }

    /// Make the next `start` fail.
    pub fn fail_start(&self, error: CameraError) {
        lock(&self.state).start_error = Some(error);
    }

    /// End the payload stream.
    pub fn close(&self) {
        lock(&self.state).sender = None;
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).active
    }

    pub fn starts(&self) -> usize {
        lock(&self.state).starts
    }

    pub fn stops(&self) -> usize {
        lock(&self.state).stops
    }

    pub fn discarded(&self) -> Vec<String> {
        lock(&self.state).discarded.clone()
    }
}

#[async_trait]
impl Decoder for ScriptedDecoder {
    async fn start(&mut self) -> Result<(), ScannerError> {
        let mut state = lock(&self.state);
        if let Some(error) = state.start_error.take() {
            return Err(ScannerError::Camera(error));
        }
        state.active = true;
        state.starts += 1;
        Ok(())
    }

    async fn stop(&mut self) {
        let mut state = lock(&self.state);
        state.active = false;
        state.stops += 1;
    }

    async fn on_result(&mut self) -> Result<Option<String>, ScannerError> {
        match self.results.recv().await {
            Some(Ok(payload)) => Ok(Some(payload)),
            Some(Err(error)) => Err(ScannerError::Camera(error)),
            None => Ok(None),
        }
    }
}

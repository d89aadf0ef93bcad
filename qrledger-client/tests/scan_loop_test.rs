use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use qrledger_client::QrManager;
use qrledger_client::scanner::{
    CameraError, ScanHandler, ScanLoop, ScanState, ScannerError,
};
use qrledger_client::testing::{
    DecoderHandle, InMemoryRegistry, RecordingNotifier, RecordingSurface,
    ScriptedDecoder, VirtualTimeProvider,
};
use qrledger_client::ui::{Region, View};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const COOLDOWN: Duration = Duration::from_secs(2);

#[derive(Default)]
struct RecordingHandler {
    payloads: Mutex<Vec<String>>,
    failures: Mutex<Vec<CameraError>>,
    stopped: Mutex<usize>,
}

impl RecordingHandler {
    fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScanHandler for RecordingHandler {
    async fn handle_scan_result(&self, content: String) {
        self.payloads.lock().unwrap().push(content);
    }

    fn camera_failed(&self, error: &CameraError) {
        self.failures.lock().unwrap().push(error.clone());
    }

    fn scanner_stopped(&self) {
        *self.stopped.lock().unwrap() += 1;
    }
}

type LoopResult = (Result<(), ScannerError>, ScanState);

struct Running {
    handle: DecoderHandle,
    clock: VirtualTimeProvider,
    cancel: CancellationToken,
    task: JoinHandle<LoopResult>,
}

fn spawn_loop(handler: Arc<dyn ScanHandler>) -> Running {
    let (decoder, handle) = ScriptedDecoder::new();
    let clock = VirtualTimeProvider::new();
    let cancel = CancellationToken::new();
    let mut scan_loop =
        ScanLoop::new(decoder, handler, Arc::new(clock.clone()), COOLDOWN);

    let token = cancel.clone();
    let task = tokio::spawn(async move {
        let result = scan_loop.run(token).await;
        (result, scan_loop.state())
    });
    Running {
        handle,
        clock,
        cancel,
        task,
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn decoder_pauses_while_a_result_is_handled() {
    let handler = Arc::new(RecordingHandler::default());
    let run = spawn_loop(handler.clone());
    wait_until(|| run.handle.is_active()).await;

    assert!(run.handle.push("1001"));
    wait_until(|| run.clock.pending_timers() == 1).await;

    assert_eq!(handler.payloads(), vec!["1001".to_string()]);
    assert!(!run.handle.is_active());

    // The paused decoder drops repeats of the same code.
    assert!(!run.handle.push("1001"));
    assert!(!run.handle.push("1002"));

    run.clock.advance(COOLDOWN);
    wait_until(|| run.handle.is_active()).await;
    assert_eq!(run.handle.starts(), 2);

    assert!(run.handle.push("1002"));
    wait_until(|| handler.payloads().len() == 2).await;
    assert_eq!(handler.payloads(), vec!["1001".to_string(), "1002".to_string()]);
    assert_eq!(run.handle.discarded(), vec!["1001".to_string(), "1002".to_string()]);

    run.cancel.cancel();
    let (result, state) = run.task.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(state, ScanState::Idle);
    assert_eq!(*handler.stopped.lock().unwrap(), 1);
}

#[tokio::test]
async fn cancelling_during_cooldown_does_not_resume() {
    let handler = Arc::new(RecordingHandler::default());
    let run = spawn_loop(handler.clone());
    wait_until(|| run.handle.is_active()).await;

    run.handle.push("1001");
    wait_until(|| run.clock.pending_timers() == 1).await;
    run.cancel.cancel();

    let (result, state) = run.task.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(state, ScanState::Idle);
    assert_eq!(run.handle.starts(), 1);
    assert!(!run.handle.is_active());
}

#[tokio::test]
async fn camera_failure_on_start_is_reported_and_stops() {
    let handler = Arc::new(RecordingHandler::default());
    let (decoder, handle) = ScriptedDecoder::new();
    handle.fail_start(CameraError::from_name("NotAllowedError"));
    let mut scan_loop = ScanLoop::new(
        decoder,
        handler.clone(),
        Arc::new(VirtualTimeProvider::new()),
        COOLDOWN,
    );

    let result = scan_loop.run(CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(ScannerError::Camera(CameraError::PermissionDenied))
    ));
    assert_eq!(scan_loop.state(), ScanState::Idle);
    assert_eq!(
        *handler.failures.lock().unwrap(),
        vec![CameraError::PermissionDenied]
    );
    assert_eq!(*handler.stopped.lock().unwrap(), 0);
}

#[tokio::test]
async fn camera_failure_while_scanning_renders_into_scanner_area() {
    let surface = Arc::new(RecordingSurface::default());
    let manager = Arc::new(QrManager::new(
        Arc::new(InMemoryRegistry::default()),
        surface.clone(),
        Arc::new(RecordingNotifier::default()),
        Arc::new(VirtualTimeProvider::new()),
        COOLDOWN,
    ));
    let run = spawn_loop(manager);
    wait_until(|| run.handle.is_active()).await;

    run.handle.fail(CameraError::from_name("NotReadableError"));

    let (result, state) = run.task.await.unwrap();
    assert!(result.is_err());
    assert_eq!(state, ScanState::Idle);
    assert_eq!(
        surface.last_view(Region::Scanner),
        Some(View::CameraFailure(CameraError::InUse))
    );
}

#[tokio::test]
async fn exhausted_decoder_ends_the_loop() {
    let surface = Arc::new(RecordingSurface::default());
    let manager = Arc::new(QrManager::new(
        Arc::new(InMemoryRegistry::default()),
        surface.clone(),
        Arc::new(RecordingNotifier::default()),
        Arc::new(VirtualTimeProvider::new()),
        COOLDOWN,
    ));
    let run = spawn_loop(manager);
    wait_until(|| run.handle.is_active()).await;

    run.handle.close();

    let (result, _) = run.task.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(surface.last_view(Region::Scanner), Some(View::ScannerIdle));
}

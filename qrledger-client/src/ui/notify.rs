use tracing::{error, info};

use super::view::{Toast, ToastKind};

/// Transient user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Emits toasts as log lines; the default for headless runs.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => error!(target: "qrledger::toast", "{}", toast.message),
            ToastKind::Success => info!(target: "qrledger::toast", "{}", toast.message),
        }
    }
}

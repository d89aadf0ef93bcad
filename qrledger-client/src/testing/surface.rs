use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ui::{Notifier, Region, Surface, Tab, Toast, View};

#[derive(Debug, Default)]
struct SurfaceLog {
    tabs: Vec<Tab>,
    views: Vec<(Region, View)>,
    loading: Vec<bool>,
    form_resets: usize,
    prompts: Vec<String>,
}

/// Surface that records everything rendered into it.
#[derive(Debug)]
pub struct RecordingSurface {
    log: Mutex<SurfaceLog>,
    confirm: AtomicBool,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            log: Mutex::new(SurfaceLog::default()),
            confirm: AtomicBool::new(true),
        }
    }
}

impl RecordingSurface {
    fn log(&self) -> MutexGuard<'_, SurfaceLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer given to every later confirmation prompt (default: yes).
    pub fn answer_confirmations(&self, answer: bool) {
        self.confirm.store(answer, Ordering::SeqCst);
    }

    pub fn views(&self, region: Region) -> Vec<View> {
        self.log()
            .views
            .iter()
            .filter(|(r, _)| *r == region)
            .map(|(_, view)| view.clone())
            .collect()
    }

    pub fn last_view(&self, region: Region) -> Option<View> {
        self.views(region).pop()
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.log().tabs.clone()
    }

    pub fn loading_toggles(&self) -> Vec<bool> {
        self.log().loading.clone()
    }

    pub fn form_resets(&self) -> usize {
        self.log().form_resets
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.log().prompts.clone()
    }
}

#[async_trait]
impl Surface for RecordingSurface {
    fn show_tab(&self, tab: Tab) {
        self.log().tabs.push(tab);
    }

    fn render(&self, region: Region, view: View) {
        self.log().views.push((region, view));
    }

    fn set_loading(&self, loading: bool) {
        self.log().loading.push(loading);
    }

    fn reset_add_form(&self) {
        self.log().form_resets += 1;
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.log().prompts.push(prompt.to_string());
        self.confirm.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast);
    }
}

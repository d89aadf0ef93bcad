//! Page controller: turns user actions into registry calls and views.

use async_trait::async_trait;
use qrledger_model::{NewQrRecord, QrRecord, QrRecordId, VerifyOutcome};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::RegistryService;
use crate::scanner::{CameraError, CooldownFilter, ScanHandler};
use crate::time::TimeProvider;
use crate::ui::view::{FOUND_TITLE, NOT_FOUND_TITLE};
use crate::ui::{Notifier, Region, Surface, Tab, Toast, View};

pub const NUMBER_REQUIRED_TEXT: &str = "Please enter the number";
pub const CONTENT_REQUIRED_TEXT: &str = "Please enter the QR code content";
pub const CREATED_TEXT: &str = "QR code created successfully";
pub const DELETED_TEXT: &str = "QR code deleted successfully";
pub const DELETE_FAILED_TEXT: &str = "Failed to delete the QR code";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this QR code?";

/// Raw values of the add form, before trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddForm {
    pub number: String,
    pub name: String,
    pub description: String,
}

impl AddForm {
    fn into_new_record(self) -> Option<NewQrRecord> {
        let number = self.number.trim();
        if number.is_empty() {
            return None;
        }
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        Some(NewQrRecord {
            number: number.to_string(),
            name: optional(&self.name),
            description: optional(&self.description),
        })
    }
}

/// Dependencies are injected so every collaborator can be swapped in tests.
pub struct QrManager {
    registry: Arc<dyn RegistryService>,
    surface: Arc<dyn Surface>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn TimeProvider>,
    dedup: Mutex<CooldownFilter>,
    current_tab: Mutex<Tab>,
    records: Mutex<Vec<QrRecord>>,
}

impl std::fmt::Debug for QrManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrManager")
            .field("current_tab", &*lock(&self.current_tab))
            .field("records", &lock(&self.records).len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl QrManager {
    pub fn new(
        registry: Arc<dyn RegistryService>,
        surface: Arc<dyn Surface>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn TimeProvider>,
        cooldown: Duration,
    ) -> Self {
        Self {
            registry,
            surface,
            notifier,
            clock,
            dedup: Mutex::new(CooldownFilter::new(cooldown)),
            current_tab: Mutex::new(Tab::Scan),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn current_tab(&self) -> Tab {
        *lock(&self.current_tab)
    }

    /// Records from the most recent successful load.
    pub fn records(&self) -> Vec<QrRecord> {
        lock(&self.records).clone()
    }

    pub async fn show_tab(&self, tab: Tab) {
        *lock(&self.current_tab) = tab;
        self.surface.show_tab(tab);
        if tab == Tab::List {
            self.load_records().await;
        }
    }

    /// Returns whether the form was accepted and should be cleared.
    pub async fn submit_add_form(&self, form: AddForm) -> bool {
        let Some(record) = form.into_new_record() else {
            self.notifier.notify(Toast::error(NUMBER_REQUIRED_TEXT));
            return false;
        };

        self.surface.set_loading(true);
        let result = self.registry.create(record).await;
        self.surface.set_loading(false);

        match result {
            Ok(created) => {
                info!(id = %created.id, number = %created.number, "QR code created");
                self.notifier.notify(Toast::success(CREATED_TEXT));
                self.surface.reset_add_form();
                self.load_records().await;
                true
            }
            Err(error) => {
                warn!(%error, "create failed");
                self.notifier.notify(Toast::error(error.user_message()));
                false
            }
        }
    }

    pub async fn submit_manual_verify(&self, input: &str) {
        let content = input.trim();
        if content.is_empty() {
            self.notifier.notify(Toast::error(CONTENT_REQUIRED_TEXT));
            return;
        }
        self.process_content(content).await;
    }

    /// Verify a payload unless the same one was processed within the cooldown.
    pub async fn process_content(&self, content: &str) {
        let admitted = lock(&self.dedup).admit(content, self.clock.now());
        if !admitted {
            debug!(%content, "duplicate payload suppressed");
            return;
        }

        self.surface.set_loading(true);
        let result = self.registry.verify(content).await;
        self.surface.set_loading(false);

        match result {
            Ok(outcome) => self.display_scan_result(content, outcome),
            Err(error) => {
                warn!(%error, "verify failed");
                self.notifier.notify(Toast::error(error.user_message()));
            }
        }
    }

    /// `content` is echoed when the server does not send it back.
    pub fn display_scan_result(&self, content: &str, outcome: VerifyOutcome) {
        match outcome.record() {
            Some(record) => {
                self.surface
                    .render(Region::ScanResult, View::ScanFound(record.clone()));
                self.notifier.notify(Toast::success(FOUND_TITLE));
            }
            None => {
                let content = outcome
                    .content
                    .clone()
                    .unwrap_or_else(|| content.to_string());
                self.surface
                    .render(Region::ScanResult, View::ScanNotFound { content });
                self.notifier.notify(Toast::error(NOT_FOUND_TITLE));
            }
        }
    }

    pub async fn load_records(&self) {
        self.surface.render(Region::RecordList, View::Loading);
        match self.registry.list().await {
            Ok(records) => {
                *lock(&self.records) = records;
                self.display_records();
            }
            Err(error) => {
                warn!(%error, "loading records failed");
                self.surface.render(Region::RecordList, View::RecordsError);
            }
        }
    }

    pub fn display_records(&self) {
        let records = self.records();
        self.surface.render(Region::RecordList, View::Records(records));
    }

    pub async fn delete_record(&self, id: QrRecordId) {
        if !self.surface.confirm(DELETE_PROMPT).await {
            debug!(%id, "delete declined");
            return;
        }

        self.surface.set_loading(true);
        let result = self.registry.delete(id).await;
        self.surface.set_loading(false);

        match result {
            Ok(()) => {
                info!(%id, "QR code deleted");
                self.notifier.notify(Toast::success(DELETED_TEXT));
                self.load_records().await;
            }
            Err(error) => {
                warn!(%id, %error, "delete failed");
                self.notifier.notify(Toast::error(DELETE_FAILED_TEXT));
            }
        }
    }

    pub async fn show_stats(&self) {
        self.surface.render(Region::Stats, View::Loading);
        match self.registry.stats().await {
            Ok(stats) => self.surface.render(Region::Stats, View::Stats(stats)),
            Err(error) => {
                warn!(%error, "loading stats failed");
                self.surface.render(Region::Stats, View::StatsError);
            }
        }
    }

    pub async fn handle_scan_result(&self, content: &str) {
        self.process_content(content).await;
    }
}

#[async_trait]
impl ScanHandler for QrManager {
    async fn handle_scan_result(&self, content: String) {
        QrManager::handle_scan_result(self, &content).await;
    }

    fn camera_failed(&self, error: &CameraError) {
        self.surface
            .render(Region::Scanner, View::CameraFailure(error.clone()));
        self.notifier.notify(Toast::error(error.message()));
    }

    fn scanner_stopped(&self) {
        self.surface.render(Region::Scanner, View::ScannerIdle);
    }
}

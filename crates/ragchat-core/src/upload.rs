//! Document upload workflow and its status slot

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::api::Transport;
use crate::document::UploadFile;
use crate::flight::SingleFlight;
use crate::state::{Message, UploadPhase, UploadStatus};
use crate::store::MessageStore;
use crate::templates::MessageTemplates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadIgnoreReason {
    NoFile,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Ignored(UploadIgnoreReason),
    Uploaded,
    Failed,
}

#[derive(Debug, Default)]
struct Slot {
    status: UploadStatus,
    // Bumped on every write so a delayed clear can tell it is stale.
    generation: u64,
}

/// Shared handle to the single upload status slot
#[derive(Debug, Clone, Default)]
pub struct StatusSlot {
    inner: Arc<Mutex<Slot>>,
}

impl StatusSlot {
    pub fn get(&self) -> UploadStatus {
        self.lock().status.clone()
    }

    fn set(&self, status: UploadStatus) -> u64 {
        let mut slot = self.lock();
        slot.status = status;
        slot.generation += 1;
        slot.generation
    }

    /// Clear after `interval` on the current runtime. Returns false when
    /// there is no runtime to run the timer on.
    fn clear_later(&self, interval: Duration, generation: u64) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, upload status will not auto-clear");
            return false;
        };
        let slot = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(interval).await;
            slot.clear_if_current(generation);
        });
        true
    }

    /// Back to idle, unless something was written after `generation`
    fn clear_if_current(&self, generation: u64) -> bool {
        let mut slot = self.lock();
        if slot.generation != generation {
            return false;
        }
        slot.status = UploadStatus::idle();
        slot.generation += 1;
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Uploads one document at a time and reports progress through the status
/// slot. Only a successful upload touches the transcript.
#[derive(Clone)]
pub struct UploadController {
    store: MessageStore,
    transport: Arc<dyn Transport>,
    templates: Arc<MessageTemplates>,
    status: StatusSlot,
    busy: SingleFlight,
    clear_after: Option<Duration>,
}

impl UploadController {
    pub fn new(
        store: MessageStore,
        transport: Arc<dyn Transport>,
        templates: Arc<MessageTemplates>,
    ) -> Self {
        Self {
            store,
            transport,
            templates,
            status: StatusSlot::default(),
            busy: SingleFlight::new(),
            clear_after: None,
        }
    }

    /// Revert a `done` status to idle once `interval` has passed
    pub fn with_clear_after(mut self, interval: Option<Duration>) -> Self {
        self.clear_after = interval;
        self
    }

    pub fn status(&self) -> UploadStatus {
        self.status.get()
    }

    pub fn status_slot(&self) -> StatusSlot {
        self.status.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub async fn submit_upload(&self, file: Option<UploadFile>) -> UploadOutcome {
        let Some(file) = file else {
            return UploadOutcome::Ignored(UploadIgnoreReason::NoFile);
        };

        let Some(_busy) = self.busy.try_acquire() else {
            return UploadOutcome::Ignored(UploadIgnoreReason::Busy);
        };

        let name = file.file_name.as_str();
        self.status.set(UploadStatus::new(
            UploadPhase::Uploading,
            self.templates.uploading(name),
        ));

        match self.transport.upload(&file).await {
            Ok(receipt) => {
                info!(file = name, document_id = ?receipt.document_id, "Document processed");
                let generation = self.status.set(UploadStatus::new(
                    UploadPhase::Done,
                    self.templates.upload_done(name),
                ));
                self.store
                    .append(Message::system(self.templates.upload_notice(name)));
                self.schedule_clear(generation);
                UploadOutcome::Uploaded
            }
            Err(e) => {
                error!(file = name, error = %e, "Upload failed");
                self.status.set(UploadStatus::new(
                    UploadPhase::Error,
                    self.templates.upload_error(name),
                ));
                UploadOutcome::Failed
            }
        }
    }

    fn schedule_clear(&self, generation: u64) {
        if let Some(interval) = self.clear_after {
            self.status.clear_later(interval, generation);
        }
    }
}

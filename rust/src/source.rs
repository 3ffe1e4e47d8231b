// Seam between the core and whatever document store the host shell talks to.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use flume::{Sender, WeakSender};

use crate::record::{parse_documents, RawRecord};
use crate::updates::{CoreMsg, InternalEvent};

#[derive(uniffi::Error, thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("record not found: {id}")]
    NotFound { id: String },
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for SourceError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        SourceError::Transport { message: e.reason }
    }
}

/// A remote collection implemented by the host (or `MemoryCollection` in-process).
///
/// `subscribe` must push the current snapshot and every later change to `listener` as full
/// replacements, in the order the store issues them, until `unsubscribe` is called with the
/// same id.
#[uniffi::export(callback_interface)]
pub trait CollectionSource: Send + Sync + 'static {
    fn subscribe(
        &self,
        collection: String,
        subscription_id: u64,
        listener: Arc<SnapshotListener>,
    ) -> Result<(), SourceError>;

    fn unsubscribe(&self, subscription_id: u64);

    fn delete_record(&self, collection: String, record_id: String) -> Result<(), SourceError>;
}

/// Handed to the source on subscribe; forwards pushes into the core actor.
///
/// Holds only a weak sender so a source that leaks listeners cannot keep the actor alive.
#[derive(uniffi::Object)]
pub struct SnapshotListener {
    token: u64,
    alive: Arc<AtomicBool>,
    core_tx: WeakSender<CoreMsg>,
}

impl SnapshotListener {
    pub(crate) fn new(
        token: u64,
        alive: Arc<AtomicBool>,
        core_tx: &Sender<CoreMsg>,
    ) -> Arc<Self> {
        Arc::new(Self {
            token,
            alive,
            core_tx: core_tx.downgrade(),
        })
    }

    fn deliver(&self, event: InternalEvent) {
        if !self.alive.load(Ordering::SeqCst) {
            tracing::debug!(token = self.token, "dropping push for released subscription");
            return;
        }
        let Some(tx) = self.core_tx.upgrade() else {
            return;
        };
        let _ = tx.send(CoreMsg::Internal(Box::new(event)));
    }
}

#[uniffi::export]
impl SnapshotListener {
    pub fn on_snapshot(&self, records: Vec<RawRecord>) {
        self.deliver(InternalEvent::SnapshotReceived {
            token: self.token,
            records,
        });
    }

    /// Same as `on_snapshot`, for hosts that forward raw documents as a JSON array.
    pub fn on_snapshot_json(&self, documents_json: String) {
        match parse_documents(&documents_json) {
            Ok(records) => self.on_snapshot(records),
            Err(e) => self.on_error(format!("invalid snapshot json: {e}")),
        }
    }

    pub fn on_error(&self, message: String) {
        self.deliver(InternalEvent::SubscriptionFailed {
            token: self.token,
            message,
        });
    }

    pub fn is_active(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

/// Owned handle for one open subscription. Dropping it releases the remote side exactly once.
pub(crate) struct Subscription {
    id: u64,
    alive: Arc<AtomicBool>,
    source: Arc<dyn CollectionSource>,
}

impl Subscription {
    pub(crate) fn open(
        source: Arc<dyn CollectionSource>,
        collection: &str,
        id: u64,
        core_tx: &Sender<CoreMsg>,
    ) -> Result<Self, SourceError> {
        let alive = Arc::new(AtomicBool::new(true));
        let listener = SnapshotListener::new(id, alive.clone(), core_tx);
        match source.subscribe(collection.to_string(), id, listener) {
            Ok(()) => Ok(Self { id, alive, source }),
            Err(e) => {
                // Nothing was registered remotely; just silence the listener.
                alive.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            tracing::info!(subscription_id = self.id, "releasing subscription");
            self.source.unsubscribe(self.id);
        }
    }
}

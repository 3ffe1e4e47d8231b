use crate::record::RawRecord;
use crate::source::SourceError;
use crate::state::AppState;
use crate::AppAction;

#[derive(uniffi::Enum, Clone, Debug)]
pub enum AppUpdate {
    /// Every change is published as a full state snapshot.
    FullState(AppState),
}

impl AppUpdate {
    pub fn rev(&self) -> u64 {
        match self {
            AppUpdate::FullState(s) => s.rev,
        }
    }
}

#[derive(Debug)]
pub enum CoreMsg {
    Action(AppAction),
    Internal(Box<InternalEvent>),
    Shutdown,
}

#[derive(Debug)]
pub enum InternalEvent {
    // Subscription push path. `token` is the subscription id the push belongs to.
    SnapshotReceived {
        token: u64,
        records: Vec<RawRecord>,
    },
    SubscriptionFailed {
        token: u64,
        message: String,
    },

    // Async results
    DeleteFinished {
        item_id: String,
        result: Result<(), SourceError>,
    },

    ToastAutoDismiss {
        token: u64,
    },
}

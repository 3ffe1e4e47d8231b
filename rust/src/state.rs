use crate::source::SourceError;

#[derive(uniffi::Record, Clone, Debug, PartialEq)]
pub struct AppState {
    pub rev: u64,
    pub collection: String,
    /// A subscription is currently held.
    pub is_open: bool,
    /// True from open until the first snapshot (or subscription failure).
    pub loading: bool,
    /// Newest first; undated items last.
    pub items: Vec<ListItem>,
    pub deleting_ids: Vec<String>,
    pub connection: ConnectionStatus,
    pub sync_error: Option<String>,
    pub last_delete_failure: Option<DeleteFailure>,
    pub toast: Option<String>,
}

impl AppState {
    pub fn empty() -> Self {
        Self {
            rev: 0,
            collection: String::new(),
            is_open: false,
            loading: false,
            items: vec![],
            deleting_ids: vec![],
            connection: ConnectionStatus::Online,
            sync_error: None,
            last_delete_failure: None,
            toast: None,
        }
    }

    pub fn item(&self, id: &str) -> Option<&ListItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

#[derive(uniffi::Record, Clone, Debug, PartialEq)]
pub struct ListItem {
    pub id: String,
    pub message: String,
    pub created_at_ms: Option<i64>,
    pub created_at_display: String,
    pub payload_json: String,
}

#[derive(uniffi::Enum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Online,
    Offline,
}

#[derive(uniffi::Enum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteFailureKind {
    NotFound,
    PermissionDenied,
    Transport,
}

#[derive(uniffi::Record, Clone, Debug, PartialEq)]
pub struct DeleteFailure {
    pub item_id: String,
    pub kind: DeleteFailureKind,
    pub message: String,
}

impl DeleteFailure {
    pub fn from_source_error(item_id: String, err: &SourceError) -> Self {
        let kind = match err {
            SourceError::NotFound { .. } => DeleteFailureKind::NotFound,
            SourceError::PermissionDenied { .. } => DeleteFailureKind::PermissionDenied,
            SourceError::Transport { .. } => DeleteFailureKind::Transport,
        };
        Self {
            item_id,
            kind,
            message: err.to_string(),
        }
    }
}

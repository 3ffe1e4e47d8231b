// Record shape consumed from storage and the pure snapshot -> list derivation.

use serde_json::Value;

use crate::state::ListItem;
use crate::timestamp::{format_display, normalize_to_instant, RawTimestamp};

/// One document from a collection snapshot.
#[derive(uniffi::Record, Clone, Debug, PartialEq)]
pub struct RawRecord {
    pub id: String,
    pub message: Option<String>,
    pub created_at: Option<RawTimestamp>,
    /// Full document as JSON so hosts can render fields this core doesn't model.
    pub payload_json: String,
}

impl RawRecord {
    pub fn new(
        id: impl Into<String>,
        message: Option<&str>,
        created_at: Option<RawTimestamp>,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.map(ToString::to_string),
            created_at,
            payload_json: "{}".to_string(),
        }
    }

    /// Build from a JSON document. Returns `None` when the document has no string `id`.
    pub fn from_document(doc: &Value) -> Option<Self> {
        let obj = doc.as_object()?;
        let id = obj.get("id")?.as_str()?.to_string();
        let message = obj.get("message").and_then(message_text);
        let created_at = obj.get("createdAt").and_then(RawTimestamp::from_json);
        Some(Self {
            id,
            message,
            created_at,
            payload_json: doc.to_string(),
        })
    }
}

/// Scalar messages are rendered as text; falsy values and containers count as absent.
fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Parse a JSON array of documents. Documents without an id are skipped.
pub fn parse_documents(json: &str) -> Result<Vec<RawRecord>, serde_json::Error> {
    let docs: Vec<Value> = serde_json::from_str(json)?;
    let mut out = Vec::with_capacity(docs.len());
    for doc in &docs {
        match RawRecord::from_document(doc) {
            Some(r) => out.push(r),
            None => tracing::warn!("skipping document without string id"),
        }
    }
    Ok(out)
}

/// Rendering knobs applied while deriving list items.
#[derive(Clone, Debug)]
pub struct DisplayOptions {
    pub utc_offset_minutes: i32,
    pub empty_message_placeholder: String,
    pub missing_timestamp_label: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            utc_offset_minutes: -180,
            empty_message_placeholder: "Sem mensagem".to_string(),
            missing_timestamp_label: "Data não disponível".to_string(),
        }
    }
}

/// Re-derive the whole rendered list from one snapshot, newest first.
///
/// Items without a usable timestamp sort after every dated item; ties keep snapshot order.
pub fn derive_list(records: &[RawRecord], opts: &DisplayOptions) -> Vec<ListItem> {
    let mut items: Vec<ListItem> = records
        .iter()
        .map(|r| {
            let instant = r.created_at.as_ref().and_then(normalize_to_instant);
            let message = r
                .message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(opts.empty_message_placeholder.as_str())
                .to_string();
            ListItem {
                id: r.id.clone(),
                message,
                created_at_ms: instant.map(|dt| dt.timestamp_millis()),
                created_at_display: instant
                    .map(|dt| format_display(&dt, opts.utc_offset_minutes))
                    .unwrap_or_else(|| opts.missing_timestamp_label.clone()),
                payload_json: r.payload_json.clone(),
            }
        })
        .collect();
    sort_newest_first(&mut items);
    items
}

pub(crate) fn sort_newest_first(items: &mut [ListItem]) {
    // `None < Some(_)`, so reversing the comparison puts undated items last.
    items.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
}

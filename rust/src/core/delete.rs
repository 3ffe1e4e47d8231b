// Confirmed record deletion with optimistic local removal.

use super::*;
use crate::source::SourceError;
use crate::state::DeleteFailure;

impl AppCore {
    pub(super) fn request_delete(&mut self, item_id: String, confirmed: bool) {
        if !confirmed {
            tracing::info!(item_id = %item_id, "delete not confirmed");
            return;
        }
        if self.state.deleting_ids.contains(&item_id) {
            tracing::warn!(item_id = %item_id, "delete already in flight");
            return;
        }

        self.state.deleting_ids.push(item_id.clone());
        self.state.last_delete_failure = None;
        self.emit_state();

        let source = self.source.clone();
        let collection = self.collection.clone();
        let tx = self.core_sender.clone();
        // No retries: one request per confirmed action.
        self.runtime.spawn_blocking(move || {
            let result = source.delete_record(collection, item_id.clone());
            let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::DeleteFinished {
                item_id,
                result,
            })));
        });
    }

    pub(super) fn handle_delete_finished(
        &mut self,
        item_id: String,
        result: Result<(), SourceError>,
    ) {
        self.state.deleting_ids.retain(|id| id != &item_id);
        match result {
            Ok(()) => {
                tracing::info!(item_id = %item_id, "delete acknowledged");
                if self.config.optimistic_removal() {
                    // The next snapshot is authoritative and replaces this.
                    self.state.items.retain(|i| i.id != item_id);
                }
                self.toast("Item excluído com sucesso");
            }
            Err(e) => {
                tracing::warn!(item_id = %item_id, %e, "delete failed");
                let msg = format!("Erro ao excluir: {e}");
                self.state.last_delete_failure =
                    Some(DeleteFailure::from_source_error(item_id, &e));
                self.toast(msg);
            }
        }
    }
}

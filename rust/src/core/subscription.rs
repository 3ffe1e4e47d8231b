// Subscription lifecycle and snapshot handling.

use super::*;
use crate::record::{derive_list, RawRecord};

impl AppCore {
    pub(super) fn open_list(&mut self) {
        // A re-open is a fresh screen: drop the old subscription first.
        self.release_subscription();

        self.next_subscription_id = self.next_subscription_id.wrapping_add(1);
        let id = self.next_subscription_id;

        self.state.is_open = true;
        self.state.loading = true;
        self.state.items.clear();
        self.state.sync_error = None;
        self.state.last_delete_failure = None;

        match Subscription::open(self.source.clone(), &self.collection, id, &self.core_sender) {
            Ok(sub) => {
                tracing::info!(collection = %self.collection, subscription_id = id, "subscribed");
                self.subscription = Some(sub);
            }
            Err(e) => {
                tracing::error!(collection = %self.collection, %e, "subscribe failed");
                self.state.is_open = false;
                self.state.loading = false;
                self.state.sync_error = Some(e.to_string());
            }
        }
        self.emit_state();
    }

    pub(super) fn close_list(&mut self) {
        self.release_subscription();
        self.state.is_open = false;
        self.state.loading = false;
        self.state.items.clear();
        self.state.sync_error = None;
        self.emit_state();
    }

    pub(super) fn release_subscription(&mut self) {
        // Dropping the guard unsubscribes; late pushes carry a stale token and are ignored.
        if let Some(sub) = self.subscription.take() {
            tracing::debug!(subscription_id = sub.id(), "closing subscription");
        }
    }

    fn is_current(&self, token: u64) -> bool {
        self.subscription.as_ref().map(|s| s.id()) == Some(token)
    }

    pub(super) fn handle_snapshot(&mut self, token: u64, records: Vec<RawRecord>) {
        if !self.is_current(token) {
            tracing::debug!(token, "ignoring snapshot from released subscription");
            return;
        }
        // Full replace: also overwrites any optimistic removals.
        self.state.items = derive_list(&records, &self.display);
        self.state.loading = false;
        self.state.sync_error = None;
        tracing::debug!(count = self.state.items.len(), "snapshot applied");
        self.emit_state();
    }

    pub(super) fn handle_subscription_failed(&mut self, token: u64, message: String) {
        if !self.is_current(token) {
            tracing::debug!(token, "ignoring error from released subscription");
            return;
        }
        // Keep the last-known list on screen.
        tracing::error!(collection = %self.collection, error = %message, "subscription error");
        self.state.loading = false;
        self.state.sync_error = Some(message);
        self.emit_state();
    }
}

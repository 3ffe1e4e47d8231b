mod delete;
mod subscription;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use flume::Sender;

use crate::actions::AppAction;
use crate::config::{self, AppConfig};
use crate::record::DisplayOptions;
use crate::source::{CollectionSource, Subscription};
use crate::state::{AppState, ConnectionStatus};
use crate::updates::{AppUpdate, CoreMsg, InternalEvent};

/// Single-threaded app actor. Every state change happens in `handle_message`.
pub struct AppCore {
    pub state: AppState,
    rev: u64,

    update_sender: Sender<AppUpdate>,
    core_sender: Sender<CoreMsg>,
    shared_state: Arc<RwLock<AppState>>,

    config: AppConfig,
    display: DisplayOptions,
    collection: String,
    // Blocking store calls and timers; results come back through `core_sender`.
    runtime: tokio::runtime::Runtime,

    source: Arc<dyn CollectionSource>,
    subscription: Option<Subscription>,
    next_subscription_id: u64,

    toast_dismiss_token: u64,
}

impl AppCore {
    pub fn new(
        update_sender: Sender<AppUpdate>,
        core_sender: Sender<CoreMsg>,
        data_dir: String,
        shared_state: Arc<RwLock<AppState>>,
        source: Arc<dyn CollectionSource>,
    ) -> Self {
        let config = config::load_app_config(&data_dir);
        let collection = config.collection();
        let display = config.display_options();
        tracing::info!(
            collection = %collection,
            optimistic_removal = config.optimistic_removal(),
            "app core config"
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .expect("tokio runtime");

        let mut state = AppState::empty();
        state.collection = collection.clone();

        let this = Self {
            state,
            rev: 0,
            update_sender,
            core_sender,
            shared_state,
            config,
            display,
            collection,
            runtime,
            source,
            subscription: None,
            next_subscription_id: 0,
            toast_dismiss_token: 0,
        };

        // Ensure FfiApp.state() has an immediately-available snapshot.
        let snapshot = this.state.clone();
        this.commit_state_snapshot(&snapshot);
        this
    }

    fn next_rev(&mut self) -> u64 {
        self.rev += 1;
        self.state.rev = self.rev;
        self.rev
    }

    fn commit_state_snapshot(&self, snapshot: &AppState) {
        match self.shared_state.write() {
            Ok(mut g) => *g = snapshot.clone(),
            Err(poison) => *poison.into_inner() = snapshot.clone(),
        }
    }

    fn emit_state(&mut self) {
        self.next_rev();
        let snapshot = self.state.clone();
        self.commit_state_snapshot(&snapshot);
        let _ = self.update_sender.send(AppUpdate::FullState(snapshot));
    }

    fn toast(&mut self, msg: impl Into<String>) {
        self.state.toast = Some(msg.into());
        self.toast_dismiss_token = self.toast_dismiss_token.saturating_add(1);
        self.schedule_toast_auto_dismiss(self.toast_dismiss_token);
        self.emit_state();
    }

    fn schedule_toast_auto_dismiss(&self, token: u64) {
        let tx = self.core_sender.clone();
        let secs = self.config.toast_dismiss_secs();
        self.runtime.spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            let _ = tx.send(CoreMsg::Internal(Box::new(
                InternalEvent::ToastAutoDismiss { token },
            )));
        });
    }

    fn handle_toast_auto_dismiss(&mut self, token: u64) {
        // A newer toast replaced this one; its own timer will clear it.
        if token != self.toast_dismiss_token || self.state.toast.is_none() {
            return;
        }
        self.state.toast = None;
        self.emit_state();
    }

    /// Returns `false` once the actor should stop.
    pub fn handle_message(&mut self, msg: CoreMsg) -> bool {
        match msg {
            CoreMsg::Action(action) => {
                tracing::info!(action = action.tag(), "dispatch");
                self.handle_action(action);
            }
            CoreMsg::Internal(internal) => self.handle_internal(*internal),
            CoreMsg::Shutdown => return false,
        }
        true
    }

    fn handle_internal(&mut self, internal: InternalEvent) {
        match internal {
            InternalEvent::SnapshotReceived { token, records } => {
                self.handle_snapshot(token, records)
            }
            InternalEvent::SubscriptionFailed { token, message } => {
                self.handle_subscription_failed(token, message)
            }
            InternalEvent::DeleteFinished { item_id, result } => {
                self.handle_delete_finished(item_id, result)
            }
            InternalEvent::ToastAutoDismiss { token } => self.handle_toast_auto_dismiss(token),
        }
    }

    fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::OpenList => self.open_list(),
            AppAction::CloseList => self.close_list(),
            AppAction::DeleteItem { item_id, confirmed } => {
                self.request_delete(item_id, confirmed)
            }
            AppAction::ConnectivityChanged { online } => {
                let status = if online {
                    ConnectionStatus::Online
                } else {
                    ConnectionStatus::Offline
                };
                if self.state.connection != status {
                    tracing::info!(?status, "connectivity changed");
                    self.state.connection = status;
                    self.emit_state();
                }
            }
            AppAction::ClearToast => {
                if self.state.toast.take().is_some() {
                    self.emit_state();
                }
            }
        }
    }

    /// Release the subscription and stop background work without waiting on in-flight calls.
    pub fn shutdown(mut self) {
        self.release_subscription();
        self.runtime.shutdown_background();
    }
}

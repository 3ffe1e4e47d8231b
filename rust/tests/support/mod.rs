#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use talento_core::{
    AppAction, AppReconciler, AppState, AppUpdate, CollectionSource, FfiApp, MemoryCollection,
    RawRecord, RawTimestamp, CONFIG_FILE_NAME,
};
use tempfile::TempDir;

pub const COLLECTION: &str = "notifications";

pub fn write_config(data_dir: &std::path::Path, extra: serde_json::Value) {
    let mut v = serde_json::json!({ "collection": COLLECTION });
    if let (Some(base), Some(extra)) = (v.as_object_mut(), extra.as_object()) {
        for (k, val) in extra {
            base.insert(k.clone(), val.clone());
        }
    }
    std::fs::write(
        data_dir.join(CONFIG_FILE_NAME),
        serde_json::to_vec(&v).unwrap(),
    )
    .unwrap();
}

pub fn wait_until(what: &str, timeout: Duration, mut f: impl FnMut() -> bool) {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if f() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("{what}: condition not met within {timeout:?}");
}

#[derive(Clone, Default)]
pub struct Collector {
    pub updates: Arc<Mutex<Vec<AppUpdate>>>,
}

impl AppReconciler for Collector {
    fn reconcile(&self, update: AppUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}

impl Collector {
    pub fn states(&self) -> Vec<AppState> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .map(|u| match u {
                AppUpdate::FullState(s) => s.clone(),
            })
            .collect()
    }

    pub fn revs(&self) -> Vec<u64> {
        self.updates.lock().unwrap().iter().map(AppUpdate::rev).collect()
    }
}

/// One app instance over an in-memory collection, with its own data dir.
pub struct Harness {
    pub dir: TempDir,
    pub store: MemoryCollection,
    pub app: Arc<FfiApp>,
    pub collector: Collector,
}

impl Harness {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self::with_config(records, serde_json::json!({}))
    }

    pub fn with_config(records: Vec<RawRecord>, config: serde_json::Value) -> Self {
        let store = MemoryCollection::with_records(COLLECTION, records);
        Self::with_store(store, config)
    }

    pub fn with_store(store: MemoryCollection, config: serde_json::Value) -> Self {
        let source = Box::new(store.clone());
        Self::with_source(store, source, config)
    }

    /// `store` is kept for driving pushes; `source` is what the app talks to.
    pub fn with_source(
        store: MemoryCollection,
        source: Box<dyn CollectionSource>,
        config: serde_json::Value,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), config);
        let app = FfiApp::new(dir.path().to_string_lossy().to_string(), source);
        let collector = Collector::default();
        app.listen_for_updates(Box::new(collector.clone()));
        Self {
            dir,
            store,
            app,
            collector,
        }
    }

    pub fn state(&self) -> AppState {
        self.app.state()
    }

    /// Open the list and wait for the first snapshot.
    pub fn open(&self) {
        self.app.dispatch(AppAction::OpenList);
        self.wait("list loaded", |s| s.is_open && !s.loading);
    }

    pub fn wait(&self, what: &str, mut f: impl FnMut(&AppState) -> bool) {
        wait_until(what, Duration::from_secs(10), || f(&self.app.state()));
    }

    /// Actions are handled in order, so once this lands every earlier action has been handled.
    pub fn barrier(&self) {
        let online = self.state().connection == talento_core::ConnectionStatus::Online;
        self.app
            .dispatch(AppAction::ConnectivityChanged { online: !online });
        self.wait("barrier", |s| {
            (s.connection == talento_core::ConnectionStatus::Online) != online
        });
        self.app
            .dispatch(AppAction::ConnectivityChanged { online });
        self.wait("barrier restore", |s| {
            (s.connection == talento_core::ConnectionStatus::Online) == online
        });
    }
}

pub fn ids(state: &AppState) -> Vec<String> {
    state.items.iter().map(|i| i.id.clone()).collect()
}

pub fn at_secs(id: &str, seconds: f64) -> RawRecord {
    RawRecord::new(id, Some(id), Some(RawTimestamp::EpochSeconds { seconds }))
}

pub fn at_text(id: &str, value: &str) -> RawRecord {
    RawRecord::new(
        id,
        Some(id),
        Some(RawTimestamp::Text {
            value: value.to_string(),
        }),
    )
}

pub fn structured(id: &str, seconds: i64) -> RawRecord {
    RawRecord::new(
        id,
        Some(id),
        Some(RawTimestamp::Structured {
            seconds,
            nanoseconds: 0,
        }),
    )
}

pub fn undated(id: &str) -> RawRecord {
    RawRecord::new(id, Some(id), None)
}

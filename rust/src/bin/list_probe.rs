use std::time::{Duration, Instant};

use talento_core::{
    parse_documents, AppAction, AppState, FfiApp, MemoryCollection, CONFIG_FILE_NAME,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let fixture = args.next().ok_or_else(|| {
        anyhow::anyhow!("usage: list_probe <documents.json> [--data-dir DIR] [--delete ID]...")
    })?;

    let mut data_dir: Option<String> = None;
    let mut deletes: Vec<String> = Vec::new();
    while let Some(a) = args.next() {
        if a == "--data-dir" {
            data_dir = Some(
                args.next()
                    .ok_or_else(|| anyhow::anyhow!("--data-dir requires a path"))?,
            );
            continue;
        }
        if a == "--delete" {
            deletes.push(
                args.next()
                    .ok_or_else(|| anyhow::anyhow!("--delete requires an id"))?,
            );
            continue;
        }
        return Err(anyhow::anyhow!("unknown arg: {a}"));
    }

    let data_dir = match data_dir {
        Some(d) => d,
        None => std::env::temp_dir()
            .join("talento_list_probe")
            .to_string_lossy()
            .to_string(),
    };
    std::fs::create_dir_all(&data_dir)?;

    let raw = std::fs::read_to_string(&fixture)
        .map_err(|e| anyhow::anyhow!("read {fixture}: {e}"))?;
    let records = parse_documents(&raw)?;
    let collection = talento_core::load_app_config(&data_dir).collection();
    eprintln!(
        "loaded {} documents into '{collection}' (config: {}/{CONFIG_FILE_NAME})",
        records.len(),
        data_dir
    );

    let store = MemoryCollection::with_records(&collection, records);
    let app = FfiApp::new(data_dir, Box::new(store.clone()));
    app.dispatch(AppAction::OpenList);
    wait_for("first snapshot", &app, |s| s.is_open && !s.loading)?;

    for id in deletes {
        let before = app.state().rev;
        app.dispatch(AppAction::DeleteItem {
            item_id: id.clone(),
            confirmed: true,
        });
        wait_for("delete result", &app, |s| {
            s.rev > before && !s.deleting_ids.contains(&id) && s.toast.is_some()
        })?;
        let state = app.state();
        match state.last_delete_failure {
            Some(f) => eprintln!("delete {id}: failed ({:?}): {}", f.kind, f.message),
            None => eprintln!("delete {id}: ok"),
        }
    }

    let state = app.state();
    if let Some(err) = &state.sync_error {
        eprintln!("sync error: {err}");
    }
    for item in &state.items {
        println!("{}\t{}\t{}", item.created_at_display, item.id, item.message);
    }
    app.dispatch(AppAction::CloseList);
    Ok(())
}

fn wait_for(
    what: &str,
    app: &FfiApp,
    mut f: impl FnMut(&AppState) -> bool,
) -> anyhow::Result<()> {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if f(&app.state()) {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    Err(anyhow::anyhow!("{what}: timed out"))
}

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "talento.log";

static INIT: Once = Once::new();

/// Install the process-wide subscriber: stderr plus `<data_dir>/talento.log`.
///
/// Only the first call does anything; a subscriber installed by the embedding process wins.
pub fn init_logging(data_dir: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(Path::new(data_dir).join(LOG_FILE_NAME))
            .ok();
        let file_layer = file.map(|f| {
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(f))
        });

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(file_layer)
            .try_init();
    });
}

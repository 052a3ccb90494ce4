use std::{fs, fs::OpenOptions, io, path::Path, sync::Arc};

use anyhow::{Context, anyhow};
use tracing_subscriber::{
    EnvFilter, Registry, fmt::writer::MakeWriterExt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_FILTER: &str = "info,teloxide=warn";

/// Initialize the global tracing subscriber.
///
/// Level comes from `RUST_LOG` (default `info,teloxide=warn`). Output goes to stderr and,
/// when `log_file` is set, is appended to that file as well.
pub fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr.and(Arc::new(file)))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true);

            Registry::default().with(env_filter).with(fmt_layer).try_init()
        }
        None => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true);

            Registry::default().with(env_filter).with(fmt_layer).try_init()
        }
    };

    result.map_err(|e| anyhow!("Failed to set global subscriber: {e}"))
}

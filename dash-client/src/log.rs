use std::{
    fs::File,
    path::Path,
    sync::{Mutex, OnceLock},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static TRACER: OnceLock<()> = OnceLock::new();
static LOG_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

pub const LOG_FILE_NAME: &str = "dash.log";

/// Install a non-blocking file subscriber writing `<log_dir>/dash.log`.
///
/// `RUST_LOG` takes precedence over `level`. Only the first call installs
/// anything; the OTLP endpoint is ignored without the `telemetry` feature.
pub fn setup_logger(
    log_dir: &Path,
    level: &str,
    _endpoint: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    if TRACER.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(log_dir)?;
    let file = File::create(log_dir.join(LOG_FILE_NAME))?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let file_layer = fmt::layer()
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(non_blocking_writer)
        .with_filter(filter);

    if let Ok(mut slot) = LOG_GUARD.lock() {
        *slot = Some(guard);
    }
    TRACER.get_or_init(|| {
        tracing_subscriber::registry().with(file_layer).try_init().ok();
    });

    Ok(())
}

/// Drop the appender guard so queued records reach the file. Statics are
/// never dropped, so call this before the process exits.
pub fn shutdown() {
    if let Ok(mut slot) = LOG_GUARD.lock() {
        slot.take();
    }
}

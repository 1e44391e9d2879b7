use opentelemetry_semantic_conventions::{
    resource::{SERVICE_NAME, SERVICE_VERSION},
    SCHEMA_URL,
};
use std::{
    fs::File,
    path::Path,
    sync::{mpsc, Mutex, OnceLock},
};
use tracing_subscriber::EnvFilter;

use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{Sampler, SdkTracerProvider},
    Resource,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

const SERVICE: &str = "dash";
const DEFAULT_ENDPOINT: &str = "http://localhost:4317";

static SUBSCRIBER_SET: OnceLock<()> = OnceLock::new();
static LOG_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

fn resource() -> Resource {
    Resource::builder()
        .with_schema_url(
            [
                KeyValue::new(SERVICE_NAME, SERVICE),
                KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
            ],
            SCHEMA_URL,
        )
        .with_service_name(SERVICE)
        .build()
}

fn init_tracer_provider(
    endpoint: &str,
) -> Result<SdkTracerProvider, opentelemetry_otlp::ExporterBuildError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
            1.0,
        ))))
        .with_resource(resource())
        .with_batch_exporter(exporter)
        .build())
}

/// File logging plus OTLP span export, same signature as the plain logger.
pub fn setup_logger(
    log_dir: &Path,
    level: &str,
    endpoint: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    if SUBSCRIBER_SET.get().is_some() {
        return Ok(());
    }

    // The tonic exporter needs a runtime of its own; the worker thread keeps
    // it alive for the life of the process.
    let (tx, rx) = mpsc::sync_channel(1);
    let endpoint_owned = endpoint.unwrap_or(DEFAULT_ENDPOINT).to_owned();
    std::thread::Builder::new()
        .name("otel-worker".into())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .worker_threads(2)
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tx.send(Err(e.to_string())).ok();
                    return;
                }
            };

            rt.block_on(async move {
                let provider = init_tracer_provider(&endpoint_owned).map_err(|e| e.to_string());
                tx.send(provider).ok();
                std::future::pending::<()>().await;
            });
        })?;

    let provider = rx.recv()??;
    TRACER_PROVIDER.set(provider.clone()).ok();

    std::fs::create_dir_all(log_dir)?;
    let file = File::create(log_dir.join("dash.log"))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let file_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter);
    if let Ok(mut slot) = LOG_GUARD.lock() {
        *slot = Some(guard);
    }

    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE));

    SUBSCRIBER_SET.get_or_init(|| {
        tracing_subscriber::registry()
            .with(file_layer)
            .with(otel_layer)
            .try_init()
            .ok();
    });

    Ok(())
}

/// Flush pending spans and file records; call before process exit.
pub fn shutdown() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("otel shutdown error: {e}");
        }
    }
    if let Ok(mut slot) = LOG_GUARD.lock() {
        slot.take();
    }
}

use anyhow::Context;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Where and how log events are written.
#[derive(Debug, Clone, Default)]
pub struct TracingOptions<'a> {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub log_level: &'a str,
    /// Optional file that receives a JSON copy of every event.
    pub log_file: Option<&'a str>,
    /// Optional OTLP gRPC collector endpoint.
    pub otlp_endpoint: Option<&'a str>,
}

/// Keeps the non-blocking file writer alive. Drop it only on shutdown,
/// buffered events are flushed when it goes away.
#[must_use = "dropping the guard stops the file log writer"]
pub struct TracingGuard {
    _file_guard: Option<WorkerGuard>,
}

pub fn init_tracing(service_name: &str, options: TracingOptions<'_>) -> anyhow::Result<TracingGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(options.log_level));

    let telemetry = match options.otlp_endpoint {
        Some(endpoint) => {
            let tracer = build_otlp_tracer(service_name, endpoint)?;
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let (file_layer, file_guard) = match options.log_file {
        Some(path) => {
            let (writer, guard) = file_writer(Path::new(path))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .json()
                .flatten_event(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(telemetry)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        )
        .with(file_layer)
        .try_init()
        .context("global tracing subscriber already installed")?;

    Ok(TracingGuard {
        _file_guard: file_guard,
    })
}

fn build_otlp_tracer(service_name: &str, endpoint: &str) -> anyhow::Result<sdktrace::Tracer> {
    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", service_name.to_string()),
        ])))
        .install_batch(runtime::Tokio)
        .with_context(|| {
            format!(
                "failed to initialize OTLP tracer for '{}' at '{}'",
                service_name, endpoint
            )
        })
}

fn file_writer(
    path: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path '{}' has no file name", path.display()))?;
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("failed to open log file '{}'", path.display()))?;
    Ok(tracing_appender::non_blocking(appender))
}

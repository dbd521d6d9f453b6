//! Logging and trace export for the rover process.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `ROVERBIT_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL.  When set, spans are also exported over OTLP/HTTP. |
//!
//! ```rust,no_run
//! // Keep the guard alive until the process exits.
//! let _guard = roverbit_runtime::telemetry::init_tracing("roverbit");
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log format.
pub const LOG_FORMAT_VAR: &str = "ROVERBIT_LOG_FORMAT";

/// Output format of the console log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// Read [`LOG_FORMAT_VAR`]; anything other than `json` is compact.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_VAR).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Layers, in order: the `RUST_LOG` filter, the OTLP layer when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set, then one console formatter.  If a
/// global subscriber already exists it is left in place.
///
/// Hold the returned [`TracerProviderGuard`] for the life of the process.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let provider = build_provider(service_name);

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("roverbit")));
    let (json_layer, compact_layer) = match LogFormat::from_env() {
        LogFormat::Json => (Some(fmt::layer().with_target(true).json()), None),
        LogFormat::Compact => (None, Some(fmt::layer().with_target(true).compact())),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(json_layer)
        .with(compact_layer)
        .try_init()
    {
        eprintln!("[roverbit] tracing subscriber already installed: {e}");
    }

    TracerProviderGuard(provider)
}

/// Shuts down the OTel [`SdkTracerProvider`] on drop, flushing pending spans.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[roverbit] OpenTelemetry provider shutdown error: {e}");
        }
    }
}

/// Build a provider when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
///
/// Exporter failures are printed to stderr and yield `None`.
fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[roverbit] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    // The simple exporter needs no async runtime; the rover loop runs on a
    // plain thread.
    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            .with_simple_exporter(exporter)
            .build(),
    )
}

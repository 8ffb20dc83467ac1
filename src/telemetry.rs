use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::Layer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Set to export spans over OTLP/HTTP
const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

fn get_resource() -> Resource {
    static RESOURCE: OnceLock<Resource> = OnceLock::new();
    RESOURCE
        .get_or_init(|| Resource::builder().with_service_name("wikiatlas").build())
        .clone()
}

fn init_traces() -> anyhow::Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder().with_http().build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(get_resource())
        .build())
}

fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

// The exporter's own HTTP client must not feed spans back into itself.
fn otel_filter() -> anyhow::Result<EnvFilter> {
    Ok(console_filter()
        .add_directive("hyper=off".parse()?)
        .add_directive("opentelemetry=off".parse()?)
        .add_directive("h2=off".parse()?)
        .add_directive("reqwest=off".parse()?))
}

/// Install the global subscriber: fmt to stderr, plus OTLP traces when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set. Keep the guard alive until exit.
pub fn init_tracing_subscriber() -> anyhow::Result<OtelGuard> {
    let tracer_provider = match std::env::var_os(OTLP_ENDPOINT_VAR) {
        Some(_) => Some(init_traces()?),
        None => None,
    };

    let otel_layer = match &tracer_provider {
        Some(provider) => {
            Some(OpenTelemetryLayer::new(provider.tracer("wikiatlas")).with_filter(otel_filter()?))
        }
        None => None,
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter());

    tracing_subscriber::registry()
        .with(console_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(OtelGuard { tracer_provider })
}

pub struct OtelGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("{err:?}");
            }
        }
    }
}

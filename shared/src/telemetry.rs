use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// RAII guard that flushes and shuts down the OTLP tracer provider on drop.
/// Hold it for the lifetime of the binary.
pub struct TelemetryGuard {
    provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Failed to shutdown tracer provider: {e}");
        }
    }
}

/// Initializes the tracing subscriber for a service binary.
///
/// Driven by environment variables:
/// - `RUST_LOG` — filter directives (defaults to `info`)
/// - `LOG_FORMAT=json` — switch the fmt layer to flattened JSON
/// - `OTEL_EXPORTER_OTLP_ENDPOINT` — when set, export spans over OTLP/HTTP
pub fn init_telemetry(service_name: &str) -> TelemetryGuard {
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let otel_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

    let registry = Registry::default().with(env_filter);

    // The four arms exist because each fmt/otel combination is a distinct
    // subscriber type; the layers cannot be chosen dynamically without
    // boxing the whole stack.
    let provider = match (json_logs, otel_endpoint) {
        (true, Some(endpoint)) => {
            let fmt_layer = tracing_subscriber::fmt::layer().json().flatten_event(true);
            let (otel_layer, provider) = otel_layer(service_name, &endpoint);
            registry.with(fmt_layer).with(otel_layer).init();
            Some(provider)
        }
        (true, None) => {
            let fmt_layer = tracing_subscriber::fmt::layer().json().flatten_event(true);
            registry.with(fmt_layer).init();
            None
        }
        (false, Some(endpoint)) => {
            let fmt_layer = tracing_subscriber::fmt::layer();
            let (otel_layer, provider) = otel_layer(service_name, &endpoint);
            registry.with(fmt_layer).with(otel_layer).init();
            Some(provider)
        }
        (false, None) => {
            let fmt_layer = tracing_subscriber::fmt::layer();
            registry.with(fmt_layer).init();
            None
        }
    };

    TelemetryGuard { provider }
}

fn otel_layer<S>(
    service_name: &str,
    endpoint: &str,
) -> (
    tracing_opentelemetry::OpenTelemetryLayer<S, opentelemetry_sdk::trace::Tracer>,
    opentelemetry_sdk::trace::SdkTracerProvider,
)
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .expect("Failed to build OTLP span exporter");

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            opentelemetry_sdk::Resource::builder()
                .with_service_name(service_name.to_owned())
                .build(),
        )
        .build();

    let tracer = provider.tracer(service_name.to_owned());
    opentelemetry::global::set_tracer_provider(provider.clone());

    let layer = tracing_opentelemetry::layer().with_tracer(tracer);
    (layer, provider)
}

//! Observability wiring for the key server.
//!
//! # Purpose
//! Initializes structured logging, OTLP span export, W3C trace-context
//! extraction for incoming requests, and the Prometheus recorder served on
//! the metrics listener.
//!
//! # Notes
//! Metric names are declared here and shared by the handlers and the zone
//! store. Initialization is guarded by `OnceLock`, so tests may call it
//! repeatedly. Spans are exported only when an OTLP exporter can be built.
use anyhow::Context;
use axum::Router;
use axum::http::HeaderMap;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Counter labelled by `endpoint` (`token_key`/`token_keys`) and `outcome`.
pub const TOKEN_KEY_REQUESTS: &str = "keyserver_token_key_requests_total";
/// Counter labelled by `op` (`created`/`updated`/`deleted`).
pub const ZONE_CHANGES: &str = "keyserver_zone_changes_total";
/// Gauge of zones held by the store.
pub const ZONES: &str = "keyserver_zones_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static TRACING_INIT: OnceLock<()> = OnceLock::new();
static PROPAGATOR_INIT: OnceLock<()> = OnceLock::new();

pub fn init_observability(
    service_name: &str,
    default_zone_id: &str,
) -> anyhow::Result<PrometheusHandle> {
    TRACING_INIT.get_or_init(|| {
        install_propagator();
        let instance_id = std::env::var("KEYSERVER_SERVICE_INSTANCE_ID")
            .or_else(|_| std::env::var("HOSTNAME"))
            .ok();
        let resource = Resource::builder_empty()
            .with_attributes(resource_attributes(service_name, default_zone_id, instance_id))
            .build();

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer());
        match build_tracer_provider(resource) {
            Some(provider) => {
                let tracer = provider.tracer(service_name.to_string());
                let _ = registry
                    .with(tracing_opentelemetry::layer().with_tracer(tracer))
                    .try_init();
            }
            None => {
                let _ = registry.try_init();
            }
        }
    });

    install_metrics_recorder()
}

fn install_propagator() {
    PROPAGATOR_INIT.get_or_init(|| {
        global::set_text_map_propagator(TraceContextPropagator::new());
    });
}

fn build_tracer_provider(resource: Resource) -> Option<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .ok()?;
    Some(
        SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build(),
    )
}

fn resource_attributes(
    service_name: &str,
    default_zone_id: &str,
    instance_id: Option<String>,
) -> Vec<KeyValue> {
    let mut attrs = vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("keyserver.default_zone", default_zone_id.to_string()),
    ];
    if let Some(instance_id) = instance_id {
        attrs.push(KeyValue::new("service.instance.id", instance_id));
    }
    attrs
}

/// Parent context carried by `traceparent`/`tracestate`, if any.
pub fn trace_context_from_headers(headers: &HeaderMap) -> opentelemetry::Context {
    install_propagator();
    global::get_text_map_propagator(|prop| prop.extract(&HeaderMapExtractor(headers)))
}

struct HeaderMapExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderMapExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    )
}

pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "metrics listening");
    axum::serve(listener, metrics_router(handle).into_make_service()).await
}

fn install_metrics_recorder() -> anyhow::Result<PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("install metrics recorder")?;
    metrics::describe_counter!(TOKEN_KEY_REQUESTS, "Token key requests by endpoint and outcome");
    metrics::describe_counter!(ZONE_CHANGES, "Zone provisioning writes by operation");
    metrics::describe_gauge!(ZONES, "Zones held by the store");
    let _ = METRICS_HANDLE.set(handle.clone());
    Ok(handle)
}

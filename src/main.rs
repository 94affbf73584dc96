//! Harness entry point: load settings, build the pipelines, run the loop.

use otel_http_sim::{
    RequestEmitter, Settings, SimError, TelemetryGuard, parse_resource_attributes,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), SimError> {
    init_diagnostics()?;

    let base_dir = std::env::current_dir()?;
    let settings = Settings::load(&base_dir)?;
    let attributes = parse_resource_attributes(settings.resource_attributes.as_deref());

    let guard = TelemetryGuard::from_settings(&settings, attributes)?;
    tracing::info!(
        endpoint = %settings.otlp_exporter.endpoint,
        protocol = ?settings.otlp_exporter.protocol,
        metrics = settings.metrics_exporter.is_enabled(),
        logs = settings.logs_exporter.is_enabled(),
        "telemetry pipelines configured"
    );

    let emitter = RequestEmitter::new(&guard);
    otel_http_sim::run(&emitter).await;

    // Shutdown blocks on flush; avoid starving the runtime workers.
    tokio::task::block_in_place(|| guard.shutdown())
}

fn init_diagnostics() -> Result<(), SimError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

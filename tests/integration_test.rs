//! Integration tests: settings loading from disk and end-to-end pipeline
//! construction. No collector is listening on the configured endpoints;
//! pipeline construction must succeed regardless, with export failures
//! surfacing asynchronously.

use otel_http_sim::{
    ExporterSelection, Protocol, RequestEmitter, SETTINGS_FILE, Settings, SimError, TelemetryGuard,
    parse_resource_attributes,
};
use std::fs;
use std::path::Path;
use std::time::Duration;

fn write_settings(dir: &Path, contents: &str) {
    fs::write(dir.join(SETTINGS_FILE), contents).expect("write settings file");
}

#[test]
fn loads_settings_from_base_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_settings(
        dir.path(),
        r#"
        resource_attributes = "service.name=integration, team = infra ,bad"
        metrics_exporter = "otlp"

        [otlp_exporter]
        endpoint = "http://collector:4317"
        headers = "api-key=secret"
        protocol = "grpc"
        timeout = "2s"
        "#,
    );

    let settings = Settings::load(dir.path()).expect("load settings");

    assert_eq!(settings.otlp_exporter.endpoint, "http://collector:4317");
    assert_eq!(settings.otlp_exporter.protocol, Protocol::Grpc);
    assert_eq!(settings.otlp_exporter.timeout, Duration::from_secs(2));
    assert_eq!(settings.metrics_exporter, ExporterSelection::Otlp);
    assert_eq!(settings.logs_exporter, ExporterSelection::Disabled);

    let attributes = parse_resource_attributes(settings.resource_attributes.as_deref());
    assert_eq!(attributes.len(), 2);
    assert_eq!(
        attributes.get("service.name").map(String::as_str),
        Some("integration")
    );
    assert_eq!(attributes.get("team").map(String::as_str), Some("infra"));
}

#[test]
fn missing_settings_file_fails_startup() {
    let dir = tempfile::tempdir().expect("tempdir");

    let result = Settings::load(dir.path());

    assert!(matches!(result, Err(SimError::Config(_))));
}

#[test]
fn invalid_protocol_literal_fails_startup() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_settings(
        dir.path(),
        r#"
        [otlp_exporter]
        endpoint = "http://collector:4318"
        protocol = "foo"
        "#,
    );

    let result = Settings::load(dir.path());

    assert!(matches!(result, Err(SimError::Config(_))));
}

#[test]
fn non_http_endpoint_fails_startup() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_settings(
        dir.path(),
        r#"
        [otlp_exporter]
        endpoint = "collector:4318"
        protocol = "grpc"
        "#,
    );

    let result = Settings::load(dir.path());

    assert!(
        matches!(result, Err(SimError::InvalidEndpoint { ref url }) if url == "collector:4318")
    );
}

#[test]
fn differently_cased_selection_stays_disabled() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_settings(
        dir.path(),
        r#"
        metrics_exporter = "OTLP"
        logs_exporter = "Otlp"

        [otlp_exporter]
        endpoint = "http://collector:4318"
        protocol = "http/protobuf"
        "#,
    );

    let settings = Settings::load(dir.path()).expect("load settings");

    assert_eq!(settings.metrics_exporter, ExporterSelection::Disabled);
    assert_eq!(settings.logs_exporter, ExporterSelection::Disabled);
}

#[tokio::test(flavor = "multi_thread")]
async fn builds_all_pipelines_over_http() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_settings(
        dir.path(),
        r#"
        resource_attributes = "service.name=integration"
        metrics_exporter = "otlp"
        logs_exporter = "otlp"

        [otlp_exporter]
        endpoint = "http://127.0.0.1:4318"
        protocol = "http/protobuf"
        timeout = "1s"
        "#,
    );

    let settings = Settings::load(dir.path()).expect("load settings");
    let attributes = parse_resource_attributes(settings.resource_attributes.as_deref());

    let guard = TelemetryGuard::from_settings(&settings, attributes)
        .expect("pipelines build without a reachable collector");
    assert!(guard.logger_provider().is_some());

    let emitter = RequestEmitter::new(&guard);
    emitter.emit();
    emitter.emit();

    // No collector is listening; shutdown reports the export failure
    // instead of panicking or hanging.
    let _ = tokio::task::block_in_place(|| guard.shutdown());
}

#[tokio::test(flavor = "multi_thread")]
async fn builds_trace_only_pipeline_over_grpc() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_settings(
        dir.path(),
        r#"
        [otlp_exporter]
        endpoint = "http://127.0.0.1:4317"
        headers = "authorization=Bearer token"
        protocol = "grpc"
        timeout = "1s"
        "#,
    );

    let settings = Settings::load(dir.path()).expect("load settings");
    let attributes = parse_resource_attributes(settings.resource_attributes.as_deref());

    let guard = TelemetryGuard::from_settings(&settings, attributes)
        .expect("pipelines build without a reachable collector");
    assert!(guard.logger_provider().is_none());

    let emitter = RequestEmitter::new(&guard);
    emitter.emit();

    let _ = tokio::task::block_in_place(|| guard.shutdown());
}

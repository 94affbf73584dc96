//! Telemetry pipeline construction and lifecycle management.
//!
//! [`TelemetryGuard`] turns loaded settings into live export pipelines: the
//! trace pipeline is always built, metric and log pipelines only when their
//! selection is `otlp`. All pipelines share one transport configuration and
//! one resource. When the guard is dropped, pending telemetry is flushed and
//! providers are shut down.

use crate::attrs::ResourceAttributes;
use crate::config::{Protocol, Settings};
use crate::error::SimError;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig, WithTonicConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::collections::HashMap;
use tonic::metadata::{MetadataKey, MetadataMap, MetadataValue};

/// Guard owning the telemetry providers for the process lifetime.
///
/// Construction performs no network I/O towards the collector; transport
/// connections are established lazily and export failures surface
/// asynchronously at emission time. On drop, the guard flushes pending
/// telemetry and shuts down every provider exactly once. Use
/// [`shutdown()`](Self::shutdown) for explicit error handling.
pub struct TelemetryGuard {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    logger_provider: Option<SdkLoggerProvider>,
    shut_down: bool,
}

impl TelemetryGuard {
    /// Builds the export pipelines described by the settings.
    ///
    /// The meter provider is always constructed so that counter instruments
    /// exist; when the metric selection is disabled it carries no reader and
    /// silently discards every measurement.
    ///
    /// # Errors
    ///
    /// Returns a per-signal exporter build error if the OTLP exporter for
    /// that signal cannot be constructed.
    pub fn from_settings(
        settings: &Settings,
        attributes: ResourceAttributes,
    ) -> Result<Self, SimError> {
        let resource = build_resource(&attributes);

        let tracer_provider = build_tracer_provider(settings, resource.clone())?;
        let meter_provider = build_meter_provider(settings, resource.clone())?;
        let logger_provider = if settings.logs_exporter.is_enabled() {
            Some(build_logger_provider(settings, resource)?)
        } else {
            None
        };

        Ok(Self {
            tracer_provider,
            meter_provider,
            logger_provider,
            shut_down: false,
        })
    }

    /// Returns the tracer provider. The trace pipeline is always configured.
    pub fn tracer_provider(&self) -> &SdkTracerProvider {
        &self.tracer_provider
    }

    /// Returns the meter provider. Reader-less when metrics are disabled.
    pub fn meter_provider(&self) -> &SdkMeterProvider {
        &self.meter_provider
    }

    /// Returns the logger provider if the log pipeline is configured.
    pub fn logger_provider(&self) -> Option<&SdkLoggerProvider> {
        self.logger_provider.as_ref()
    }

    /// Flushes all configured providers. Errors are logged but not returned.
    pub fn flush(&self) {
        if let Err(e) = self.tracer_provider.force_flush() {
            tracing::error!(target: "otel_lifecycle", error = %e, "Failed to flush tracer provider");
        }

        if let Err(e) = self.meter_provider.force_flush() {
            tracing::error!(target: "otel_lifecycle", error = %e, "Failed to flush meter provider");
        }

        if let Some(provider) = &self.logger_provider
            && let Err(e) = provider.force_flush()
        {
            tracing::error!(target: "otel_lifecycle", error = %e, "Failed to flush logger provider");
        }
    }

    /// Flushes and shuts down every provider, returning the first error.
    ///
    /// Every provider is shut down even when an earlier one fails; only the
    /// first error is reported.
    pub fn shutdown(mut self) -> Result<(), SimError> {
        self.shut_down = true;
        let mut first_error: Option<SimError> = None;

        if let Err(e) = self.tracer_provider.force_flush() {
            first_error.get_or_insert(SimError::Flush(e));
        }
        if let Err(e) = self.tracer_provider.shutdown() {
            first_error.get_or_insert(SimError::Shutdown(e));
        }

        if let Some(provider) = self.logger_provider.take() {
            if let Err(e) = provider.force_flush() {
                first_error.get_or_insert(SimError::Flush(e));
            }
            if let Err(e) = provider.shutdown() {
                first_error.get_or_insert(SimError::Shutdown(e));
            }
        }

        if let Err(e) = self.meter_provider.force_flush() {
            first_error.get_or_insert(SimError::Flush(e));
        }
        if let Err(e) = self.meter_provider.shutdown() {
            first_error.get_or_insert(SimError::Shutdown(e));
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }

        let _ = self.tracer_provider.force_flush();
        if let Err(e) = self.tracer_provider.shutdown() {
            tracing::error!(target: "otel_lifecycle", error = %e, "Failed to shut down tracer provider");
        }

        if let Some(provider) = self.logger_provider.take() {
            let _ = provider.force_flush();
            if let Err(e) = provider.shutdown() {
                tracing::error!(target: "otel_lifecycle", error = %e, "Failed to shut down logger provider");
            }
        }

        let _ = self.meter_provider.force_flush();
        if let Err(e) = self.meter_provider.shutdown() {
            tracing::error!(target: "otel_lifecycle", error = %e, "Failed to shut down meter provider");
        }
    }
}

fn build_resource(attributes: &ResourceAttributes) -> Resource {
    Resource::builder()
        .with_attributes(
            attributes
                .iter()
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone())),
        )
        .build()
}

/// Splits a raw header string into pairs.
///
/// Same lenient policy as the transport's own header option: split on `,`,
/// then on the first `=` so values may contain `=` (base64 tokens), trim
/// both sides, drop anything unparsable. No validation.
fn parse_header_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|candidate| {
            let (key, value) = candidate.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn build_tonic_metadata(raw: &str) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    for (key, value) in parse_header_pairs(raw) {
        if let (Ok(k), Ok(v)) = (
            key.parse::<MetadataKey<_>>(),
            value.parse::<MetadataValue<_>>(),
        ) {
            metadata.insert(k, v);
        }
    }
    metadata
}

fn build_http_headers(raw: &str) -> HashMap<String, String> {
    parse_header_pairs(raw).into_iter().collect()
}

macro_rules! build_exporter {
    ($settings:expr, $exporter_type:ident, $signal_path:expr, $error_variant:ident) => {{
        let exporter = &$settings.otlp_exporter;
        match exporter.protocol {
            Protocol::Grpc => {
                let mut builder = opentelemetry_otlp::$exporter_type::builder()
                    .with_tonic()
                    .with_endpoint(exporter.endpoint.clone())
                    .with_timeout(exporter.timeout);

                if let Some(raw) = exporter.headers.as_deref() {
                    builder = builder.with_metadata(build_tonic_metadata(raw));
                }

                builder.build().map_err(SimError::$error_variant)?
            }
            Protocol::HttpProtobuf => {
                let mut builder = opentelemetry_otlp::$exporter_type::builder()
                    .with_http()
                    .with_endpoint(exporter.signal_endpoint($signal_path))
                    .with_timeout(exporter.timeout)
                    .with_protocol(opentelemetry_otlp::Protocol::HttpBinary);

                if let Some(raw) = exporter.headers.as_deref() {
                    builder = builder.with_headers(build_http_headers(raw));
                }

                builder.build().map_err(SimError::$error_variant)?
            }
        }
    }};
}

fn build_tracer_provider(
    settings: &Settings,
    resource: Resource,
) -> Result<SdkTracerProvider, SimError> {
    let exporter = build_exporter!(settings, SpanExporter, "/v1/traces", TraceExporter);

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

fn build_meter_provider(
    settings: &Settings,
    resource: Resource,
) -> Result<SdkMeterProvider, SimError> {
    let mut builder = SdkMeterProvider::builder().with_resource(resource);

    if settings.metrics_exporter.is_enabled() {
        let exporter = build_exporter!(settings, MetricExporter, "/v1/metrics", MetricExporter);
        builder = builder.with_reader(PeriodicReader::builder(exporter).build());
    }

    Ok(builder.build())
}

fn build_logger_provider(
    settings: &Settings,
    resource: Resource,
) -> Result<SdkLoggerProvider, SimError> {
    let exporter = build_exporter!(settings, LogExporter, "/v1/logs", LogExporter);

    Ok(SdkLoggerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

//! Simulated HTTP request emission.
//!
//! One tick produces one trace span, at most one log record, exactly one
//! counter increment, and one progress line on stdout. The loop has no
//! termination condition of its own; it runs until the process is told to
//! stop.

use crate::pipeline::TelemetryGuard;
use opentelemetry::KeyValue;
use opentelemetry::logs::{AnyValue, LogRecord, Logger, LoggerProvider, Severity};
use opentelemetry::metrics::{Counter, MeterProvider as _};
use opentelemetry::trace::{TraceContextExt, Tracer, TracerProvider as _};
use opentelemetry_sdk::logs::{SdkLogger, SdkLoggerProvider};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use std::time::Duration;

/// Name attached to the instrumentation scope of every emitted signal.
pub const INSTRUMENTATION_SCOPE: &str = "otel-http-sim";

/// Fixed delay between emission ticks.
pub const EMIT_INTERVAL: Duration = Duration::from_secs(5);

const SPAN_NAME: &str = "HttpRequest";
const COUNTER_NAME: &str = "http_requests_total";
const ATTR_HTTP_METHOD: &str = "http.method";
const ATTR_HTTP_URL: &str = "http.url";
const HTTP_METHOD: &str = "GET";
const HTTP_URL: &str = "http://localhost:8080";

/// Emits one simulated HTTP request per tick.
///
/// Holds the per-signal handles, constructed once at startup and reused for
/// every tick. Nothing in the tick body is fallible; export failures stay
/// inside the SDK's asynchronous export path and cannot stop the loop.
pub struct RequestEmitter {
    tracer: SdkTracer,
    logger: Option<SdkLogger>,
    requests_total: Counter<u64>,
}

impl RequestEmitter {
    /// Creates an emitter bound to the guard's providers.
    pub fn new(guard: &TelemetryGuard) -> Self {
        Self::from_providers(
            guard.tracer_provider(),
            guard.meter_provider(),
            guard.logger_provider(),
        )
    }

    /// Creates an emitter from individual providers.
    ///
    /// Passing `None` for the logger provider disables log emission; the
    /// span and the counter increment are produced regardless.
    pub fn from_providers(
        tracer_provider: &SdkTracerProvider,
        meter_provider: &SdkMeterProvider,
        logger_provider: Option<&SdkLoggerProvider>,
    ) -> Self {
        let requests_total = meter_provider
            .meter(INSTRUMENTATION_SCOPE)
            .u64_counter(COUNTER_NAME)
            .with_description("Simulated HTTP requests")
            .build();

        Self {
            tracer: tracer_provider.tracer(INSTRUMENTATION_SCOPE),
            logger: logger_provider.map(|p| p.logger(INSTRUMENTATION_SCOPE)),
            requests_total,
        }
    }

    /// Performs one emission tick.
    ///
    /// The span covers the whole tick body and is guaranteed to end on every
    /// exit path, including unwinding. The log record is emitted inside the
    /// span scope and carries the span's trace context.
    pub fn emit(&self) {
        self.tracer.in_span(SPAN_NAME, |cx| {
            let span = cx.span();
            span.set_attribute(KeyValue::new(ATTR_HTTP_METHOD, HTTP_METHOD));
            span.set_attribute(KeyValue::new(ATTR_HTTP_URL, HTTP_URL));

            if let Some(logger) = &self.logger {
                let mut record = logger.create_log_record();
                record.set_target(INSTRUMENTATION_SCOPE);
                record.set_severity_number(Severity::Info);
                record.set_severity_text("INFO");
                record.set_body(AnyValue::from("HTTP request simulated"));

                let span_context = span.span_context();
                record.set_trace_context(
                    span_context.trace_id(),
                    span_context.span_id(),
                    Some(span_context.trace_flags()),
                );
                logger.emit(record);
            }

            self.requests_total
                .add(1, &[KeyValue::new(ATTR_HTTP_METHOD, HTTP_METHOD)]);
        });

        println!("HTTP request simulated and traced.");
    }
}

/// Runs the emission loop until the process receives Ctrl-C.
///
/// The first tick fires immediately, then one every [`EMIT_INTERVAL`].
pub async fn run(emitter: &RequestEmitter) {
    let mut ticker = tokio::time::interval(EMIT_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => emitter.emit(),
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received, stopping emission loop");
                break;
            }
        }
    }
}

//! Configuration-driven OpenTelemetry emission harness.
//!
//! Simulates one HTTP request on a fixed interval and ships the matching
//! trace span, counter increment, and log record to an OTLP collector. All
//! exporter wiring (endpoint, protocol, headers, resource attributes,
//! per-signal enablement) comes from a TOML settings file read once at
//! startup; the trace pipeline is always built, metrics and logs only when
//! their exporter is set to `otlp`.
//!
//! # Example
//!
//! ```no_run
//! use otel_http_sim::{
//!     RequestEmitter, Settings, SimError, TelemetryGuard, parse_resource_attributes,
//! };
//!
//! fn main() -> Result<(), SimError> {
//!     let settings = Settings::load(".")?;
//!     let attributes = parse_resource_attributes(settings.resource_attributes.as_deref());
//!     let guard = TelemetryGuard::from_settings(&settings, attributes)?;
//!
//!     let emitter = RequestEmitter::new(&guard);
//!     emitter.emit();
//!
//!     // Guard flushes and shuts down providers on drop; shutdown() reports errors.
//!     guard.shutdown()?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attrs;
mod config;
mod error;
mod pipeline;
mod sim;

pub use attrs::{ResourceAttributes, parse_resource_attributes};
pub use config::{ExporterSelection, OtlpExporterSettings, Protocol, SETTINGS_FILE, Settings};
pub use error::SimError;
pub use pipeline::TelemetryGuard;
pub use sim::{EMIT_INTERVAL, INSTRUMENTATION_SCOPE, RequestEmitter, run};

/// Re-exported for version compatibility with this crate's dependencies.
pub use opentelemetry;
/// Re-exported for version compatibility with this crate's dependencies.
pub use opentelemetry_sdk;

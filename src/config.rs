//! Settings types and loader.
//!
//! The harness reads a single statically named TOML resource from a base
//! directory at startup. Settings are immutable once loaded; there is no
//! hot-reload. A missing or malformed file is an unrecoverable deployment
//! defect and fails the process before any pipeline is built.

use crate::error::SimError;
use figment::Figment;
use figment::providers::{Format, Toml};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Name of the settings resource, resolved against the base directory.
pub const SETTINGS_FILE: &str = "otel-sim.toml";

/// OTLP export protocol.
///
/// Exactly two literals are accepted; any other value fails deserialisation,
/// which aborts startup before any pipeline exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Protocol {
    /// gRPC protocol (default collector port 4317).
    #[serde(rename = "grpc")]
    Grpc,
    /// HTTP with Protocol Buffers encoding (default collector port 4318).
    #[serde(rename = "http/protobuf")]
    HttpProtobuf,
}

/// Per-signal exporter selection, decided once at load time.
///
/// A signal is enabled iff the configured value equals the literal `"otlp"`.
/// The comparison is case-sensitive; absent, empty, or differently-cased
/// values leave the signal disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ExporterSelection {
    /// No exporter; the signal's pipeline is not built.
    #[default]
    Disabled,
    /// Export over OTLP using the shared transport settings.
    Otlp,
}

impl ExporterSelection {
    /// Returns true if the signal's pipeline should be built.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        matches!(self, ExporterSelection::Otlp)
    }
}

impl From<String> for ExporterSelection {
    fn from(value: String) -> Self {
        if value == "otlp" {
            ExporterSelection::Otlp
        } else {
            ExporterSelection::Disabled
        }
    }
}

impl From<&str> for ExporterSelection {
    fn from(value: &str) -> Self {
        ExporterSelection::from(value.to_string())
    }
}

/// Transport settings shared by all export pipelines.
#[derive(Debug, Clone, Deserialize)]
pub struct OtlpExporterSettings {
    /// OTLP collector endpoint URL.
    pub endpoint: String,

    /// Raw header string for authentication or routing, in the
    /// comma-separated `key=value` syntax of the transport. Carried verbatim;
    /// split only at the transport boundary, without validation.
    #[serde(default)]
    pub headers: Option<String>,

    /// Export protocol.
    pub protocol: Protocol,

    /// Request timeout for a single export call.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl OtlpExporterSettings {
    /// Returns the endpoint URL for a specific signal type.
    ///
    /// gRPC multiplexes all signals over the base endpoint; the HTTP
    /// transport expects the signal path (`/v1/traces` etc.) appended.
    #[must_use]
    pub fn signal_endpoint(&self, signal_path: &str) -> String {
        match self.protocol {
            Protocol::Grpc => self.endpoint.clone(),
            Protocol::HttpProtobuf => {
                format!("{}{signal_path}", self.endpoint.trim_end_matches('/'))
            }
        }
    }
}

/// Complete harness settings, deserialised from [`SETTINGS_FILE`].
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Comma-separated `key=value` resource attribute string.
    #[serde(default)]
    pub resource_attributes: Option<String>,

    /// Shared OTLP transport settings.
    pub otlp_exporter: OtlpExporterSettings,

    /// Metric pipeline selection.
    #[serde(default)]
    pub metrics_exporter: ExporterSelection,

    /// Log pipeline selection.
    #[serde(default)]
    pub logs_exporter: ExporterSelection,
}

impl Settings {
    /// Loads settings from `<base_dir>/otel-sim.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the file is missing or malformed, if a
    /// required key is absent, or if the protocol literal is not one of
    /// `grpc` / `http/protobuf`. Returns [`SimError::InvalidEndpoint`] if the
    /// endpoint does not use an http(s) scheme.
    pub fn load(base_dir: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = base_dir.as_ref().join(SETTINGS_FILE);
        let settings: Settings = Figment::from(Toml::file_exact(path))
            .extract()
            .map_err(|e| SimError::Config(Box::new(e)))?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SimError> {
        let url = &self.otlp_exporter.endpoint;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SimError::InvalidEndpoint { url: url.clone() });
        }
        Ok(())
    }
}

use anyhow::Context;
use std::env;

/// Connection string for the relational store. Either a `postgres://`/`postgresql://` URL
/// or a `sqlite://` URL. When unset the service falls back to [DEFAULT_DB_URL].
pub const DB_URL: &str = "DATABASE_URL";
/// Port the HTTP server listens on
pub const PORT: &str = "PORT";
/// Log level configuration for the application. For formatting info, see [tracing_subscriber's documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

/// File-backed store used when [DB_URL] is not provided
pub const DEFAULT_DB_URL: &str = "sqlite:///tmp/test.db?mode=rwc";
pub const DEFAULT_PORT: u16 = 3000;

/// Runtime configuration pulled from the process environment
#[derive(Debug, PartialEq, Eq)]
pub struct Settings {
    pub db_url: String,
    pub port: u16,
    pub otel_endpoints: Option<OtelEndpoints>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct OtelEndpoints {
    pub spans: String,
    pub metrics: String,
}

impl Settings {
    /// Reads settings from the environment of the running process
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup so configuration can be resolved without
    /// touching the real environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let db_url = lookup(DB_URL)
            .map(|url| normalize_db_url(&url))
            .unwrap_or_else(|| DEFAULT_DB_URL.to_owned());

        let port = match lookup(PORT) {
            Some(raw_port) => raw_port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{PORT} must be a valid port number, got \"{raw_port}\""))?,
            None => DEFAULT_PORT,
        };

        let otel_endpoints = match (lookup(OTEL_SPAN_EXPORT_URL), lookup(OTEL_METRIC_EXPORT_URL)) {
            (Some(spans), Some(metrics)) => Some(OtelEndpoints { spans, metrics }),
            _ => None,
        };

        Ok(Settings {
            db_url,
            port,
            otel_endpoints,
        })
    }
}

/// Hosting providers hand out `postgres://` URLs, rewrite them to the canonical scheme
pub fn normalize_db_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_with_empty_environment() {
        let settings = Settings::from_lookup(lookup_from(&[]));
        assert_that!(settings).is_ok().is_equal_to(Settings {
            db_url: DEFAULT_DB_URL.to_owned(),
            port: 3000,
            otel_endpoints: None,
        });
    }

    #[test]
    fn postgres_scheme_gets_rewritten() {
        assert_eq!(
            "postgresql://user:pw@localhost:5432/todos",
            normalize_db_url("postgres://user:pw@localhost:5432/todos")
        );
        assert_eq!(
            "postgresql://localhost/todos",
            normalize_db_url("postgresql://localhost/todos")
        );
        assert_eq!("sqlite://todo.db", normalize_db_url("sqlite://todo.db"));
    }

    #[test]
    fn reads_port_and_database() {
        let settings = Settings::from_lookup(lookup_from(&[
            (DB_URL, "postgres://localhost/todos"),
            (PORT, "8080"),
        ]))
        .expect("settings should parse");

        assert_eq!("postgresql://localhost/todos", settings.db_url);
        assert_eq!(8080, settings.port);
    }

    #[test]
    fn bad_port_is_an_error() {
        let settings = Settings::from_lookup(lookup_from(&[(PORT, "not-a-port")]));
        assert_that!(settings).is_err();
    }

    #[test]
    fn otel_needs_both_endpoints() {
        let only_spans =
            Settings::from_lookup(lookup_from(&[(OTEL_SPAN_EXPORT_URL, "http://localhost:4317")]))
                .expect("settings should parse");
        assert!(only_spans.otel_endpoints.is_none());

        let both = Settings::from_lookup(lookup_from(&[
            (OTEL_SPAN_EXPORT_URL, "http://localhost:4317"),
            (OTEL_METRIC_EXPORT_URL, "http://localhost:4318"),
        ]))
        .expect("settings should parse");
        assert_that!(both.otel_endpoints).is_some().is_equal_to(OtelEndpoints {
            spans: "http://localhost:4317".to_owned(),
            metrics: "http://localhost:4318".to_owned(),
        });
    }
}

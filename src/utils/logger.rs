use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Reasons logging could not be set up.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLevel(String),

    #[error("Failed to install logger: {0}")]
    Install(#[from] TryInitError),
}

/// Collects event fields as JSON values.
#[derive(Default)]
struct FieldCollector(Map<String, Value>);

impl Visit for FieldCollector {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), Value::from(format!("{:?}", value)));
    }
}

/// One JSON object per line, shaped after the OpenTelemetry log data model.
#[derive(Clone)]
struct JsonLineFormatter {
    resource: Map<String, Value>,
}

impl JsonLineFormatter {
    fn new(config: &LoggingConfig) -> Self {
        let mut resource = Map::new();
        resource.insert("service.name".into(), Value::from(config.service_name.as_str()));
        resource.insert(
            "service.version".into(),
            Value::from(config.service_version.as_str()),
        );
        JsonLineFormatter { resource }
    }

    fn severity_number(level: &Level) -> u64 {
        match *level {
            Level::TRACE => 1,
            Level::DEBUG => 5,
            Level::INFO => 9,
            Level::WARN => 13,
            Level::ERROR => 17,
        }
    }

    fn to_record(&self, event: &Event<'_>) -> Value {
        let metadata = event.metadata();
        let mut fields = FieldCollector::default();
        event.record(&mut fields);
        let mut attributes = fields.0;

        // event_name / event_domain are written with dots in the output
        for (from, to) in [("event_name", "event.name"), ("event_domain", "event.domain")] {
            if let Some(v) = attributes.remove(from) {
                attributes.insert(to.to_string(), v);
            }
        }
        attributes.insert("code.target".into(), Value::from(metadata.target()));
        if let Some(file) = metadata.file() {
            attributes.insert("code.filepath".into(), Value::from(file));
        }
        if let Some(line) = metadata.line() {
            attributes.insert("code.lineno".into(), Value::from(line));
        }

        let body = match attributes.remove("message") {
            Some(Value::String(s)) => s,
            _ => metadata.name().to_string(),
        };

        serde_json::json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "severity_text": metadata.level().as_str(),
            "severity_number": Self::severity_number(metadata.level()),
            "body": body,
            "resource": Value::Object(self.resource.clone()),
            "attributes": Value::Object(attributes),
        })
    }
}

impl<S, N> FormatEvent<S, N> for JsonLineFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let line = serde_json::to_string(&self.to_record(event)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Parses `logging.level` into a filter.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(LoggingError::InvalidLevel(level.to_string())),
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` directives are added
/// on top of the configured level.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), LoggingError> {
    let level_filter = parse_level(&logging_config.level)?;
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter_layer);
    match logging_config.format.trim().to_lowercase().as_str() {
        "json" => registry
            .with(fmt::layer().event_format(JsonLineFormatter::new(logging_config)))
            .try_init()?,
        // console, and anything unrecognised
        _ => registry.with(fmt::layer().pretty()).try_init()?,
    }
    Ok(())
}

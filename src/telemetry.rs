//! Tracing subscriber set-up

use std::io::IsTerminal;

use tracing::{Subscriber, debug};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::MakeWriter,
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::TempMapError;
use crate::config::LoggingConfig;

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Filter directive for the configured level; `verbose` forces debug.
#[must_use]
pub fn log_filter(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose { "debug" } else { config.level.as_str() };
    format!("warn,tempmap={level}")
}

/// Event formatter for `format`: one JSON object per line for "json",
/// the multi-line pretty formatter otherwise.
pub fn fmt_layer<S, W>(format: &str, writer: W, ansi: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed()
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level. Logs go to stderr so table output stays clean.
pub fn init_tracing(config: &LoggingConfig, verbose: bool) -> Result<(), TempMapError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(config, verbose)));
    let ansi = std::io::stderr().is_terminal();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer(&config.format, std::io::stderr, ansi))
        .try_init()
        .map_err(|e| TempMapError::general(format!("Failed to initialize logging: {e}")))?;

    debug!("Logging initialized ({} format)", config.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(format: &str) -> String {
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber =
            tracing_subscriber::registry().with(fmt_layer(format, move || writer.clone(), false));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(city = "CityB", "Error fetching CityB");
        });

        String::from_utf8_lossy(&logs.0.lock()).into_owned()
    }

    #[test]
    fn test_log_filter_uses_configured_level() {
        let config = LoggingConfig {
            level: "trace".to_string(),
            format: "pretty".to_string(),
        };
        assert_eq!(log_filter(&config, false), "warn,tempmap=trace");
    }

    #[test]
    fn test_verbose_forces_debug() {
        let config = LoggingConfig::default();
        assert_eq!(log_filter(&config, true), "warn,tempmap=debug");
    }

    #[test]
    fn test_pretty_format_spans_lines_with_location() {
        let output = capture("pretty");
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("Error fetching CityB"), "{output}");
        assert!(output.contains("at src/telemetry.rs"), "{output}");
        assert!(output.lines().count() > 1, "{output}");
    }

    #[test]
    fn test_json_format_is_one_object_per_event() {
        let output = capture("json");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1, "{output}");

        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["level"], "WARN");
        assert_eq!(event["fields"]["message"], "Error fetching CityB");
        assert_eq!(event["fields"]["city"], "CityB");
    }
}

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{MakeWriter, MakeWriterExt};

use super::config::{CONFIG_SOURCE, LoggingConfig};
use crate::error::{ModelGenError, Result};

/// Filter directive for a configured level name; `None` turns logging off.
pub fn level_directive(level: &str) -> Option<String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "none" | "off" => None,
        "warning" => Some("warn".to_string()),
        "critical" | "fatal" => Some("error".to_string()),
        "" => Some("info".to_string()),
        other => Some(other.to_string()),
    }
}

/// Installs the global subscriber described by `config`. `RUST_LOG` takes
/// precedence over the configured level. Returns whether a subscriber was
/// installed; a second call leaves the first one in place.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let Some(directive) = level_directive(&config.level) else {
        return Ok(false);
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&directive).map_err(|e| {
            ModelGenError::configuration(
                CONFIG_SOURCE,
                format!("invalid logging level '{}': {e}", config.level),
            )
        })?,
    };

    let installed = match (&config.file, config.use_console) {
        (Some(path), use_console) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            if use_console {
                install(filter, std::io::stdout.and(Mutex::new(file)), false)
            } else {
                install(filter, Mutex::new(file), false)
            }
        }
        (None, true) => install(filter, std::io::stdout, true),
        (None, false) => false,
    };
    Ok(installed)
}

fn install<W>(filter: EnvFilter, writer: W, ansi: bool) -> bool
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("none"), None);
        assert_eq!(level_directive("WARNING").as_deref(), Some("warn"));
        assert_eq!(level_directive("debug").as_deref(), Some("debug"));
        assert_eq!(level_directive("").as_deref(), Some("info"));
    }

    #[test]
    fn test_disabled_logging_installs_nothing() {
        let config = LoggingConfig {
            level: "none".into(),
            file: None,
            use_console: true,
        };
        assert!(!init_logging(&config).unwrap());

        let silent = LoggingConfig {
            use_console: false,
            ..LoggingConfig::default()
        };
        assert!(!init_logging(&silent).unwrap());
    }
}

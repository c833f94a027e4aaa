use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Crates whose events follow the configured level; everything else logs at `warn`.
const ORACLE_TARGETS: [&str; 2] = ["credit_oracle", "credit_oracle_api"];

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{directives}'")]
    EnvFilter {
        directives: String,
        #[source]
        source: ParseError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(config)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(config.ansi)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn configured_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    let directives = filter_directives(&config.log_level);
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter { directives, source })
}

/// A bare level such as `debug` is scoped to the oracle crates so HTTP and TLS internals stay
/// quiet. Anything that already looks like a directive list is used verbatim.
pub(crate) fn filter_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    let mut directives = vec!["warn".to_string()];
    directives.extend(ORACLE_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: log_level.to_string(),
            ansi: false,
        }
    }

    #[test]
    fn bare_level_is_scoped_to_oracle_crates() {
        assert_eq!(
            filter_directives(" debug "),
            "warn,credit_oracle=debug,credit_oracle_api=debug"
        );
    }

    #[test]
    fn explicit_directives_pass_through() {
        assert_eq!(
            filter_directives("info,reqwest=debug"),
            "info,reqwest=debug"
        );
        assert!(configured_filter(&config("credit_oracle=trace")).is_ok());
    }

    #[test]
    fn rejects_unparseable_level() {
        match configured_filter(&config("loud")) {
            Err(TelemetryError::EnvFilter { directives, .. }) => {
                assert!(directives.contains("credit_oracle=loud"))
            }
            other => panic!("expected env filter error, got {other:?}"),
        }
    }
}

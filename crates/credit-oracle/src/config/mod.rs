use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

const DEFAULT_NARRATIVE_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_NARRATIVE_TIMEOUT_MS: u64 = 4_000;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the scoring service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub narrative: NarrativeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            narrative: NarrativeConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Colored output, on for local development only.
    pub ansi: bool,
}

/// External narrative-enhancement endpoint. Enhancement is disabled without an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl NarrativeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint = non_empty_var("ORACLE_NARRATIVE_URL");
        let api_key = non_empty_var("ORACLE_NARRATIVE_API_KEY");
        let model = non_empty_var("ORACLE_NARRATIVE_MODEL")
            .unwrap_or_else(|| DEFAULT_NARRATIVE_MODEL.to_string());
        let timeout_ms = match non_empty_var("ORACLE_NARRATIVE_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNarrativeTimeout)?,
            None => DEFAULT_NARRATIVE_TIMEOUT_MS,
        };

        Ok(Self {
            endpoint,
            api_key,
            model,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn enabled(&self) -> bool {
        self.endpoint.is_some()
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: DEFAULT_NARRATIVE_MODEL.to_string(),
            timeout: Duration::from_millis(DEFAULT_NARRATIVE_TIMEOUT_MS),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNarrativeTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNarrativeTimeout => {
                write!(f, "ORACLE_NARRATIVE_TIMEOUT_MS must be a whole number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNarrativeTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

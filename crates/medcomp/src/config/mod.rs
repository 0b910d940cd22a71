use crate::workflows::compensation::domain::PracticeCategory;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_TOP_LOCATIONS: usize = 3;
const DEFAULT_REPORT_SCOPES: usize = 256;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub aggregation: AggregationConfig,
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

        let categories = match env::var("APP_CATEGORIES") {
            Ok(raw) => parse_categories(&raw)?,
            Err(_) => PracticeCategory::ordered().to_vec(),
        };

        let top_locations = match env::var("APP_TOP_LOCATIONS") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => value,
                _ => return Err(ConfigError::InvalidTopLocations(raw)),
            },
            Err(_) => DEFAULT_TOP_LOCATIONS,
        };

        let report_scopes = match env::var("APP_REPORT_SCOPES") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => value,
                _ => return Err(ConfigError::InvalidReportScopes(raw)),
            },
            Err(_) => DEFAULT_REPORT_SCOPES,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            aggregation: AggregationConfig {
                categories,
                top_locations,
                report_scopes,
            },
        })
    }
}

fn parse_categories(raw: &str) -> Result<Vec<PracticeCategory>, ConfigError> {
    let mut categories = Vec::new();
    for key in raw.split(',').map(str::trim).filter(|key| !key.is_empty()) {
        let category = PracticeCategory::from_key(key)
            .ok_or_else(|| ConfigError::UnknownCategory(key.to_string()))?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    if categories.is_empty() {
        return Err(ConfigError::UnknownCategory(raw.to_string()));
    }

    Ok(categories)
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
}

/// Recognized practice categories and ranking depth used by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationConfig {
    pub categories: Vec<PracticeCategory>,
    pub top_locations: usize,
    /// Most report scopes whose last result is kept for refresh gating.
    pub report_scopes: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            categories: PracticeCategory::ordered().to_vec(),
            top_locations: DEFAULT_TOP_LOCATIONS,
            report_scopes: DEFAULT_REPORT_SCOPES,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownCategory(String),
    InvalidTopLocations(String),
    InvalidReportScopes(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownCategory(value) => write!(
                f,
                "APP_CATEGORIES contains unknown category '{}' (expected academia, hospital, private_practice, research)",
                value
            ),
            ConfigError::InvalidTopLocations(value) => write!(
                f,
                "APP_TOP_LOCATIONS must be a positive integer, found '{}'",
                value
            ),
            ConfigError::InvalidReportScopes(value) => write!(
                f,
                "APP_REPORT_SCOPES must be a positive integer, found '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::UnknownCategory(_)
            | ConfigError::InvalidTopLocations(_)
            | ConfigError::InvalidReportScopes(_) => None,
        }
    }
}

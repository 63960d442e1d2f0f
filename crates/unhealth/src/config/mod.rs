use crate::pipeline::scoring::DegeneratePolicy;
use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_DATA_DIR: &str = "data/processed";
pub const DEFAULT_ECONOMIC_YEAR: i32 = 2022;

/// Deployment stage; only changes how logs are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Settings shared by the `score` batch job and the snapshot service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the `APP_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: env::var("APP_ENV")
                .map(|raw| AppEnvironment::parse(&raw))
                .unwrap_or_default(),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig {
                log_level: var_or("APP_LOG_LEVEL", DEFAULT_LOG_LEVEL),
            },
            pipeline: PipelineConfig::from_env()?,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("APP_PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort)?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self {
            host: var_or("APP_HOST", DEFAULT_HOST),
            port,
        })
    }

    /// Bind address; `localhost` is accepted as loopback.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost { source })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Inputs and knobs for a scoring run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the snapshot tables.
    pub data_dir: PathBuf,
    /// Economic `time_period` joined into the county summary.
    pub economic_year: i32,
    pub degenerate_policy: DegeneratePolicy,
}

impl PipelineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let economic_year = match env::var("APP_ECON_YEAR") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidYear(raw))?,
            Err(_) => DEFAULT_ECONOMIC_YEAR,
        };
        let degenerate_policy = match env::var("APP_DEGENERATE_POLICY") {
            Ok(raw) => DegeneratePolicy::parse(&raw)
                .ok_or(ConfigError::InvalidDegeneratePolicy(raw))?,
            Err(_) => DegeneratePolicy::default(),
        };

        Ok(Self {
            data_dir: PathBuf::from(var_or("APP_DATA_DIR", DEFAULT_DATA_DIR)),
            economic_year,
            degenerate_policy,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidYear(String),
    InvalidDegeneratePolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort => f.write_str("APP_PORT must be a port number (0-65535)"),
            Self::InvalidHost { .. } => {
                f.write_str("APP_HOST must be `localhost` or an IPv4/IPv6 address")
            }
            Self::InvalidYear(value) => {
                write!(f, "APP_ECON_YEAR must be a year, got '{value}'")
            }
            Self::InvalidDegeneratePolicy(value) => write!(
                f,
                "APP_DEGENERATE_POLICY must be 'fail' or 'midpoint', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

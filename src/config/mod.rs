use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the agent.
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

/// Top-level configuration for the intake agent.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub interview: InterviewConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("INTAKE_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let question_bank = env::var("INTAKE_QUESTION_BANK")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_QUESTION_BANK));
        let ledger = env::var("INTAKE_LEDGER")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LEDGER));

        let max_attempts = match env::var("INTAKE_MAX_ATTEMPTS") {
            Ok(raw) => Some(parse_max_attempts(&raw)?),
            Err(_) => None,
        };

        let log_level = env::var("INTAKE_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            environment,
            storage: StorageConfig {
                question_bank,
                ledger,
            },
            interview: InterviewConfig { max_attempts },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

pub const DEFAULT_QUESTION_BANK: &str = "veri_seti.csv";
pub const DEFAULT_LEDGER: &str = "isbasvurulari.csv";

/// Locations of the question bank and the application ledger.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub question_bank: PathBuf,
    pub ledger: PathBuf,
}

/// Interview pacing controls.
#[derive(Debug, Clone, Default)]
pub struct InterviewConfig {
    /// The interview aborts on this many invalid answers to a single prompt;
    /// `None` keeps re-prompting forever.
    pub max_attempts: Option<u32>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub fn parse_max_attempts(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidMaxAttempts {
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidMaxAttempts { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMaxAttempts { value } => write!(
                f,
                "INTAKE_MAX_ATTEMPTS must be a positive integer, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

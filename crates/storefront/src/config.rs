//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `STOREFRONT_NAME` - Store name shown by the support assistant (default: Harbor Market)
//! - `SUPPORT_EMAIL` - Address customers are pointed to for help
//! - `FREE_SHIPPING_THRESHOLD` - Subtotal that must be exceeded for free shipping (default: 100)
//! - `FLAT_SHIPPING_FEE` - Shipping fee below the threshold (default: 15)
//! - `PAYMENT_BANK_SORT_CODE`, `PAYMENT_BANK_ACCOUNT_NUMBER`, `PAYMENT_BANK_ACCOUNT_NAME` -
//!   Bank transfer details (all three or none)
//! - `PAYMENT_BITCOIN_ADDRESS` - Wallet address for bitcoin payments
//! - `ANTHROPIC_API_KEY` - Enables the support assistant
//! - `CLAUDE_MODEL` - Model used by the support assistant
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use harbor_core::ShippingPolicy;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_STORE_NAME: &str = "Harbor Market";
const DEFAULT_SUPPORT_EMAIL: &str = "support@harbor-market.example";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Store identity used in customer-facing text
    pub store: StoreConfig,
    /// Shipping fee rules
    pub shipping: ShippingPolicy,
    /// Off-band payment details shown after checkout
    pub payment: PaymentConfig,
    /// Support assistant configuration; `None` disables the assistant
    pub claude: Option<ClaudeConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. `production`)
    pub sentry_environment: Option<String>,
}

/// Store identity.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub name: String,
    pub support_email: String,
}

/// Where customers send money. Each method is optional; instructions for an
/// unconfigured method say that details follow by email.
#[derive(Debug, Clone, Default)]
pub struct PaymentConfig {
    pub bank: Option<BankDetails>,
    pub bitcoin_address: Option<String>,
}

/// UK-style bank transfer details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankDetails {
    pub sort_code: String,
    pub account_number: String,
    pub account_name: String,
}

/// Anthropic API configuration for the support assistant.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClaudeConfig {
    pub api_key: SecretString,
    pub model: String,
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let store = StoreConfig {
            name: get_env_or_default("STOREFRONT_NAME", DEFAULT_STORE_NAME),
            support_email: get_env_or_default("SUPPORT_EMAIL", DEFAULT_SUPPORT_EMAIL),
        };
        let shipping = shipping_from_env()?;
        let payment = PaymentConfig::from_env()?;
        let claude = get_optional_env("ANTHROPIC_API_KEY").map(|key| ClaudeConfig {
            api_key: SecretString::from(key),
            model: get_env_or_default("CLAUDE_MODEL", DEFAULT_CLAUDE_MODEL),
        });

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            store,
            shipping,
            payment,
            claude,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Absolute URL for a storefront page path.
    #[must_use]
    pub fn page_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

impl PaymentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let sort_code = get_optional_env("PAYMENT_BANK_SORT_CODE");
        let account_number = get_optional_env("PAYMENT_BANK_ACCOUNT_NUMBER");
        let account_name = get_optional_env("PAYMENT_BANK_ACCOUNT_NAME");

        let bank = match (sort_code, account_number, account_name) {
            (Some(sort_code), Some(account_number), Some(account_name)) => Some(BankDetails {
                sort_code,
                account_number,
                account_name,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::InvalidEnvVar(
                    "PAYMENT_BANK_*".to_string(),
                    "sort code, account number and account name must be set together".to_string(),
                ));
            }
        };

        Ok(Self {
            bank,
            bitcoin_address: get_optional_env("PAYMENT_BITCOIN_ADDRESS"),
        })
    }
}

fn shipping_from_env() -> Result<ShippingPolicy, ConfigError> {
    let defaults = ShippingPolicy::default();
    let threshold = parse_optional_decimal("FREE_SHIPPING_THRESHOLD")?;
    let fee = parse_optional_decimal("FLAT_SHIPPING_FEE")?;
    Ok(ShippingPolicy::new(
        threshold.unwrap_or(defaults.free_threshold),
        fee.unwrap_or(defaults.flat_fee),
    ))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

/// Parse a non-negative decimal amount if the variable is set.
fn parse_optional_decimal(key: &str) -> Result<Option<Decimal>, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(None);
    };
    let value: Decimal = parse_value(key, &raw)?;
    if value.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(Some(value))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

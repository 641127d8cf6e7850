//! CLI subcommands.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Missing configuration for a command.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVar(pub &'static str);

/// Storefront database URL: `STOREFRONT_DATABASE_URL`, then `DATABASE_URL`.
///
/// Loads `.env` first if present.
fn database_url() -> Result<SecretString, MissingEnvVar> {
    dotenvy::dotenv().ok();

    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

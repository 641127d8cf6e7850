//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::claude::{ClaudeClient, ClaudeError};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    claude: Option<ClaudeClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The support assistant client is built only when an API key is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the assistant client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, ClaudeError> {
        let claude = config.claude.as_ref().map(ClaudeClient::new).transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                claude,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The support assistant client, if configured.
    #[must_use]
    pub fn claude(&self) -> Option<&ClaudeClient> {
        self.inner.claude.as_ref()
    }
}

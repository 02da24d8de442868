//! Shop installation repository.
//!
//! Stores the offline access token each shop grants during the OAuth install
//! handshake. A shop without a row here has not installed the app (or its
//! install failed), so its admin sessions are not honored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use order_sync_core::ShopDomain;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use super::{InstallationStore, RepositoryError};

// =============================================================================
// Types
// =============================================================================

/// A completed app installation.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopInstallation {
    /// Shop that installed the app.
    pub shop: ShopDomain,
    /// OAuth access token (redacted in debug output).
    pub access_token: SecretString,
    /// Granted scopes.
    pub scopes: Vec<String>,
    /// When the token was obtained.
    pub obtained_at: DateTime<Utc>,
}

impl std::fmt::Debug for ShopInstallation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopInstallation")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

impl ShopInstallation {
    /// Whether every scope in `required` was granted.
    #[must_use]
    pub fn grants_all(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }
}

/// Internal row type for `PostgreSQL` queries.
#[derive(Debug, sqlx::FromRow)]
struct InstallationRow {
    shop: ShopDomain,
    access_token: String,
    scope: String,
    obtained_at: DateTime<Utc>,
}

impl From<InstallationRow> for ShopInstallation {
    fn from(row: InstallationRow) -> Self {
        let scopes = row
            .scope
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            shop: row.shop,
            access_token: SecretString::from(row.access_token),
            scopes,
            obtained_at: row.obtained_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Installation store backed by the `app.shop_installation` table.
#[derive(Debug, Clone)]
pub struct PgInstallationStore {
    pool: PgPool,
}

impl PgInstallationStore {
    /// Create a new installation store over a pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstallationStore for PgInstallationStore {
    async fn save(&self, installation: &ShopInstallation) -> Result<(), RepositoryError> {
        let scope = installation.scopes.join(",");

        sqlx::query(
            r"
            INSERT INTO app.shop_installation (shop, access_token, scope, obtained_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (shop) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                scope = EXCLUDED.scope,
                obtained_at = EXCLUDED.obtained_at,
                updated_at = now()
            ",
        )
        .bind(&installation.shop)
        .bind(installation.access_token.expose_secret())
        .bind(scope)
        .bind(installation.obtained_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, shop: &ShopDomain) -> Result<Option<ShopInstallation>, RepositoryError> {
        let row = sqlx::query_as::<_, InstallationRow>(
            r"
            SELECT shop, access_token, scope, obtained_at
            FROM app.shop_installation
            WHERE shop = $1
            ",
        )
        .bind(shop)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShopInstallation::from))
    }
}

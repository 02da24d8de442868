//! Shop authentication extractors.
//!
//! A merchant is signed in when the session names a shop and that shop has a
//! stored installation. Every shop-scoped page takes the shop from here, never
//! from the request.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use order_sync_core::ShopDomain;
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_shop};
use crate::models::session_keys;
use crate::state::AppState;

/// Extractor that requires an installed, signed-in shop.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireShopSession(shop): RequireShopSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {shop}!")
/// }
/// ```
pub struct RequireShopSession(pub ShopDomain);

/// Error returned when a shop session is required but missing.
#[derive(Debug)]
pub enum ShopAuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The session layer is missing or the installation lookup failed.
    Unavailable,
}

impl IntoResponse for ShopAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireShopSession {
    type Rejection = ShopAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(ShopAuthRejection::Unavailable)?;

        let shop: ShopDomain = session
            .get(session_keys::CURRENT_SHOP)
            .await
            .ok()
            .flatten()
            .ok_or(ShopAuthRejection::RedirectToLogin)?;

        // The app may have been uninstalled since the session was created.
        match state.installations().find(&shop).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::info!(shop = %shop, "Session shop has no installation");
                return Err(ShopAuthRejection::RedirectToLogin);
            }
            Err(e) => {
                tracing::error!(shop = %shop, error = %e, "Installation lookup failed");
                return Err(ShopAuthRejection::Unavailable);
            }
        }

        set_sentry_shop(shop.as_str());
        Ok(Self(shop))
    }
}

/// Mark the session as signed in to `shop`.
///
/// The session id is cycled first so a pre-login id cannot be fixated.
///
/// # Errors
///
/// Returns `AppError::Internal` if the session store fails.
pub async fn sign_in(session: &Session, shop: &ShopDomain) -> Result<(), AppError> {
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {e}")))?;
    session
        .insert(session_keys::CURRENT_SHOP, shop)
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {e}")))
}

/// Clear every key in the session.
///
/// # Errors
///
/// Returns `AppError::Internal` if the session store fails.
pub async fn sign_out(session: &Session) -> Result<(), AppError> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {e}")))
}

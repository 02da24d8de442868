//! Merchant sign-in through the Shopify OAuth install flow.
//!
//! ```text
//! GET  /auth/login     - Shop domain form
//! GET  /auth?shop=...  - Start OAuth, redirect to Shopify
//! GET  /auth/callback  - Verify, exchange code, sign in
//! POST /auth/logout    - Clear the session
//! ```

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use order_sync_core::ShopDomain;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::middleware::{sign_in, sign_out};
use crate::models::session_keys;
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub shop: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQueryParams {
    pub shop: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InstallQueryParams {
    pub shop: Option<String>,
}

fn login_error(code: &str) -> Response {
    Redirect::to(&format!("/auth/login?error={code}")).into_response()
}

/// GET /auth/login - Shop domain form.
pub async fn login_page(Query(params): Query<LoginQueryParams>) -> Response {
    let error_message = params.error.as_deref().map(|e| match e {
        "invalid_shop" => "Enter a shop domain like your-store.myshopify.com.".to_string(),
        "oauth_denied" => "The app was not approved in Shopify.".to_string(),
        "oauth_invalid_hmac" => "Invalid security signature. Please try again.".to_string(),
        "oauth_invalid_state" => "Your sign-in link expired. Please try again.".to_string(),
        "oauth_exchange_failed" => "Shopify did not issue an access token.".to_string(),
        "oauth_failed" | "oauth_save_failed" => "Sign-in failed. Please try again.".to_string(),
        _ => format!("Error: {e}"),
    });

    let template = LoginTemplate {
        shop: params.shop.unwrap_or_default(),
        error_message,
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response()
}

/// GET /auth?shop= - Start the OAuth install for a shop.
#[instrument(skip_all)]
pub async fn begin(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<InstallQueryParams>,
) -> Response {
    let Some(shop) = params.shop.as_deref().and_then(|s| ShopDomain::parse(s).ok()) else {
        tracing::info!(shop = ?params.shop, "Rejected shop domain");
        return login_error("invalid_shop");
    };

    // Random state parameter for CSRF protection
    let oauth_state = uuid::Uuid::new_v4().to_string();

    if let Err(e) = session.insert(session_keys::OAUTH_STATE, &oauth_state).await {
        tracing::error!("Failed to store OAuth state: {}", e);
        return login_error("oauth_failed");
    }
    if let Err(e) = session.insert(session_keys::OAUTH_SHOP, &shop).await {
        tracing::error!("Failed to store OAuth shop: {}", e);
        return login_error("oauth_failed");
    }

    let redirect_uri = state.config().oauth_callback_url();
    let auth_url = state
        .shopify()
        .authorization_url(&shop, &redirect_uri, &oauth_state);

    tracing::info!(shop = %shop, "Redirecting to Shopify OAuth");
    Redirect::to(&auth_url).into_response()
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

/// Drop the single-use OAuth nonce and shop from the session.
async fn clear_oauth_keys(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<String>(session_keys::OAUTH_STATE).await?;
    session.remove::<ShopDomain>(session_keys::OAUTH_SHOP).await?;
    Ok(())
}

/// GET /auth/callback - Finish the OAuth install and sign the shop in.
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    if let Some(error) = param(&params, "error") {
        let description = param(&params, "error_description").unwrap_or_default();
        tracing::warn!("Shopify OAuth error: {} - {}", error, description);
        return login_error("oauth_denied");
    }

    if let Err(e) = state.shopify().verify_redirect(&params) {
        tracing::error!(error = %e, "Invalid HMAC signature in OAuth callback");
        return login_error("oauth_invalid_hmac");
    }

    let (Some(code), Some(callback_state), Some(raw_shop)) = (
        param(&params, "code"),
        param(&params, "state"),
        param(&params, "shop"),
    ) else {
        tracing::error!("OAuth callback is missing code, state or shop");
        return login_error("oauth_failed");
    };

    let Ok(shop) = ShopDomain::parse(raw_shop) else {
        tracing::error!(shop = raw_shop, "OAuth callback has an invalid shop");
        return login_error("invalid_shop");
    };

    // The state and shop must match what this session started
    let stored_state: Option<String> = session.get(session_keys::OAUTH_STATE).await.ok().flatten();
    let stored_shop: Option<ShopDomain> = session.get(session_keys::OAUTH_SHOP).await.ok().flatten();
    if stored_state.as_deref() != Some(callback_state) || stored_shop.as_ref() != Some(&shop) {
        tracing::error!(shop = %shop, "OAuth state mismatch");
        return login_error("oauth_invalid_state");
    }

    if let Err(e) = clear_oauth_keys(&session).await {
        tracing::error!(shop = %shop, error = %e, "Failed to clear OAuth state");
        return login_error("oauth_failed");
    }

    let installation = match state.shopify().exchange_code(&shop, code).await {
        Ok(installation) => installation,
        Err(e) => {
            tracing::error!(shop = %shop, error = %e, "Failed to exchange OAuth code");
            return login_error("oauth_exchange_failed");
        }
    };

    if !installation.grants_all(state.shopify().scopes()) {
        tracing::warn!(
            shop = %shop,
            granted = ?installation.scopes,
            "Shop granted fewer scopes than requested"
        );
    }

    if let Err(e) = state.installations().save(&installation).await {
        tracing::error!(shop = %shop, error = %e, "Failed to save installation");
        return login_error("oauth_save_failed");
    }

    if let Err(e) = sign_in(&session, &shop).await {
        tracing::error!(shop = %shop, error = %e, "Failed to start session");
        return login_error("oauth_failed");
    }

    tracing::info!(shop = %shop, "Shop signed in");
    Redirect::to("/app").into_response()
}

/// POST /auth/logout - Clear the session.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = sign_out(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    Redirect::to("/auth/login").into_response()
}

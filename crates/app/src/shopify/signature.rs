//! HMAC signatures Shopify attaches to requests.
//!
//! - Webhooks: `X-Shopify-Hmac-Sha256` is the base64 HMAC-SHA256 of the raw body.
//! - OAuth redirects: the `hmac` query parameter is the hex HMAC-SHA256 of the
//!   remaining parameters, sorted by key and joined as `k=v&k=v`.
//!
//! Both are keyed with the app's client secret and compared in constant time.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::ShopifyAuthError;

type HmacSha256 = Hmac<Sha256>;

fn mac(secret: &[u8]) -> Result<HmacSha256, ShopifyAuthError> {
    HmacSha256::new_from_slice(secret).map_err(|e| ShopifyAuthError::InvalidSignature(e.to_string()))
}

/// Compute the `X-Shopify-Hmac-Sha256` value for a body.
///
/// # Errors
///
/// Returns `ShopifyAuthError::InvalidSignature` if the key is unusable.
pub fn sign_webhook_body(secret: &[u8], body: &[u8]) -> Result<String, ShopifyAuthError> {
    let mut mac = mac(secret)?;
    mac.update(body);
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Verify a webhook body against its `X-Shopify-Hmac-Sha256` header.
///
/// # Errors
///
/// Returns `ShopifyAuthError::InvalidSignature` if the header is not base64
/// or does not match the body.
pub fn verify_webhook_body(
    secret: &[u8],
    body: &[u8],
    header_value: &str,
) -> Result<(), ShopifyAuthError> {
    let provided = BASE64
        .decode(header_value.trim())
        .map_err(|_| ShopifyAuthError::InvalidSignature("HMAC header is not base64".to_string()))?;

    let mut mac = mac(secret)?;
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| ShopifyAuthError::InvalidSignature("Signature mismatch".to_string()))
}

/// Build the message Shopify signs for an OAuth redirect.
fn query_message(params: &[(String, String)]) -> String {
    let mut pairs: Vec<&(String, String)> = params
        .iter()
        .filter(|(k, _)| k != "hmac" && k != "signature")
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compute the `hmac` query parameter for a set of redirect parameters.
///
/// # Errors
///
/// Returns `ShopifyAuthError::InvalidSignature` if the key is unusable.
pub fn sign_query(secret: &[u8], params: &[(String, String)]) -> Result<String, ShopifyAuthError> {
    let mut mac = mac(secret)?;
    mac.update(query_message(params).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify the `hmac` parameter of an OAuth redirect.
///
/// # Errors
///
/// Returns `ShopifyAuthError::InvalidSignature` if `hmac` is missing,
/// not hex, or does not match.
pub fn verify_query(secret: &[u8], params: &[(String, String)]) -> Result<(), ShopifyAuthError> {
    let provided = params
        .iter()
        .find(|(k, _)| k == "hmac")
        .map(|(_, v)| v.as_str())
        .ok_or_else(|| ShopifyAuthError::InvalidSignature("Missing hmac parameter".to_string()))?;

    let provided = hex::decode(provided)
        .map_err(|_| ShopifyAuthError::InvalidSignature("hmac is not hex".to_string()))?;

    let mut mac = mac(secret)?;
    mac.update(query_message(params).as_bytes());
    mac.verify_slice(&provided)
        .map_err(|_| ShopifyAuthError::InvalidSignature("Signature mismatch".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"hush";

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_webhook_signature_valid() {
        let body = br#"{"id":123}"#;
        let signature = sign_webhook_body(SECRET, body).unwrap();
        assert!(verify_webhook_body(SECRET, body, &signature).is_ok());
    }

    #[test]
    fn test_webhook_signature_tampered_body() {
        let signature = sign_webhook_body(SECRET, br#"{"id":123}"#).unwrap();
        let result = verify_webhook_body(SECRET, br#"{"id":124}"#, &signature);
        assert!(matches!(result, Err(ShopifyAuthError::InvalidSignature(_))));
    }

    #[test]
    fn test_webhook_signature_wrong_secret() {
        let body = br#"{"id":123}"#;
        let signature = sign_webhook_body(b"other", body).unwrap();
        assert!(verify_webhook_body(SECRET, body, &signature).is_err());
    }

    #[test]
    fn test_webhook_signature_not_base64() {
        let result = verify_webhook_body(SECRET, b"{}", "%%%not-base64%%%");
        assert!(matches!(result, Err(ShopifyAuthError::InvalidSignature(_))));
    }

    #[test]
    fn test_query_message_sorts_and_skips_hmac() {
        let params = pairs(&[
            ("timestamp", "1337178173"),
            ("hmac", "ignored"),
            ("shop", "demo.myshopify.com"),
            ("code", "0907a61c0c8d55e99db179b68161bc00"),
        ]);

        assert_eq!(
            query_message(&params),
            "code=0907a61c0c8d55e99db179b68161bc00&shop=demo.myshopify.com&timestamp=1337178173"
        );
    }

    #[test]
    fn test_query_signature_roundtrip_and_tamper() {
        let mut params = pairs(&[("code", "abc"), ("shop", "demo.myshopify.com"), ("state", "s1")]);
        let signature = sign_query(SECRET, &params).unwrap();
        params.push(("hmac".to_string(), signature));

        assert!(verify_query(SECRET, &params).is_ok());

        if let Some(state) = params.iter_mut().find(|(k, _)| k == "state") {
            state.1 = "s2".to_string();
        }
        assert!(verify_query(SECRET, &params).is_err());
    }

    #[test]
    fn test_query_signature_missing_hmac() {
        let params = pairs(&[("shop", "demo.myshopify.com")]);
        assert!(matches!(
            verify_query(SECRET, &params),
            Err(ShopifyAuthError::InvalidSignature(_))
        ));
    }
}

//! Webhook signature verification.
//!
//! Stripe signs every webhook delivery and sends the result in the `Stripe-Signature` header:
//!
//! ```text
//! Stripe-Signature: t=1726000000,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd
//! ```
//!
//! `v1` is the hex encoded HMAC-SHA256 of `"<t>.<raw body>"`, keyed with the endpoint's signing secret. There may be
//! several `v1` entries while a secret is being rolled; any one of them matching is enough.
use chrono::Utc;
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;

use crate::WebhookError;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

/// Checks `header` against `payload` using the current time.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str, tolerance_secs: i64) -> Result<(), WebhookError> {
    verify_signature_at(payload, header, secret, tolerance_secs, Utc::now().timestamp())
}

pub fn verify_signature_at(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", t)) => timestamp = t.parse::<i64>().ok(),
            Some(("v1", sig)) => signatures.push(sig),
            _ => {},
        }
    }
    let timestamp = timestamp.ok_or(WebhookError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(WebhookError::MissingSignature);
    }
    if (now - timestamp).abs() > tolerance_secs {
        debug!("🔐️ Webhook timestamp {timestamp} is more than {tolerance_secs}s away from {now}");
        return Err(WebhookError::TimestampOutOfTolerance);
    }
    let mac = signing_mac(payload, secret, timestamp)?;
    let matched =
        signatures.iter().filter_map(|s| hex::decode(s).ok()).any(|sig| mac.clone().verify_slice(&sig).is_ok());
    if matched {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Produces a complete `Stripe-Signature` header value for `payload`. Useful for tests and local tooling.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, WebhookError> {
    let mac = signing_mac(payload, secret, timestamp)?;
    Ok(format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes())))
}

fn signing_mac(payload: &[u8], secret: &str, timestamp: i64) -> Result<HmacSha256, WebhookError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| WebhookError::InvalidSecret(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

//! Stripe webhook signature verification.
//!
//! HMAC-SHA256 over `"{t}.{raw body}"` keyed with the endpoint secret,
//! compared in constant time against every `v1` entry of the header.

use std::time::Duration;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::Timestamp;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Default replay window.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// All decodable v1 signatures. More than one appears during secret rotation.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>...][,v0=<legacy>]`
    ///
    /// Unknown keys and undecodable signatures are skipped.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::SignatureInvalid` when the timestamp or every v1
    /// signature is missing.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| WebhookError::SignatureInvalid)?,
                    );
                }
                "v1" => {
                    if let Ok(signature) = hex::decode(value.trim()) {
                        v1_signatures.push(signature);
                    }
                }
                _ => {
                    // Ignore v0 and unknown fields for forward compatibility
                }
            }
        }

        let timestamp = timestamp.ok_or(WebhookError::SignatureInvalid)?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::SignatureInvalid);
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifier for Stripe webhook signatures.
pub struct StripeWebhookVerifier {
    secret: SecretString,
    tolerance: Duration,
}

impl StripeWebhookVerifier {
    /// Creates a verifier with the default 300 second tolerance.
    pub fn new(secret: SecretString) -> Self {
        Self::with_tolerance(secret, DEFAULT_TOLERANCE)
    }

    pub fn with_tolerance(secret: SecretString, tolerance: Duration) -> Self {
        Self { secret, tolerance }
    }

    /// Verifies the signature against the current clock and parses the event.
    pub fn verify(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        self.verify_at(payload, signature_header, Timestamp::now().as_unix_secs())
    }

    /// Verifies against an explicit `now` (Unix seconds).
    ///
    /// The signature is checked before freshness, so a tampered payload is
    /// reported as `SignatureInvalid` even when it is also stale.
    ///
    /// # Errors
    ///
    /// - `SignatureInvalid` - header unusable or no v1 signature matched
    /// - `SignaturePayloadStale` - `|now - t|` exceeds the tolerance
    /// - `MalformedPayload` - body is not an event envelope
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        let expected = self.compute_signature(header.timestamp, payload);
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if !matched {
            return Err(WebhookError::SignatureInvalid);
        }

        self.validate_timestamp(header.timestamp, now)?;

        serde_json::from_slice(payload).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
    }

    fn validate_timestamp(&self, timestamp: i64, now: i64) -> Result<(), WebhookError> {
        let tolerance = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);
        let skew = now.saturating_sub(timestamp).saturating_abs();

        if skew > tolerance {
            return Err(WebhookError::SignaturePayloadStale);
        }
        Ok(())
    }

    /// HMAC-SHA256 over the timestamp, a dot, and the unmodified body bytes.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        sign(self.secret.expose_secret().as_bytes(), timestamp, payload)
    }
}

fn sign(secret: &[u8], timestamp: i64, payload: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return Vec::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.is_empty() || a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a `Stripe-Signature` header value for test fixtures.
#[cfg(test)]
pub fn compute_test_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(sign(secret.as_bytes(), timestamp, payload))
    )
}

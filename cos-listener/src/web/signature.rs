//! COS webhook signature verification.
//!
//! COS signs notification bodies with HMAC-SHA256 using the shared secret
//! configured on the notification, and sends the base64 digest in the
//! `X-Cos-Signature` header. Verification is opt-in: without a secret there
//! is nothing to verify against and requests are accepted as-is.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "X-Cos-Signature";

/// Outcome of checking a request signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyResult {
    /// Signature matches the body
    Valid,
    /// Signature missing or wrong; the caller must reject the request
    Invalid,
    /// Verification disabled or no secret configured
    Skipped,
}

impl VerifyResult {
    /// Whether the request may proceed.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, VerifyResult::Invalid)
    }
}

/// Compute the base64 HMAC-SHA256 of `body` keyed by `secret`.
///
/// Returns `None` only if the key is rejected.
pub fn sign(body: &[u8], secret: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verify a COS webhook signature.
///
/// # Arguments
///
/// * `raw_body` - The request body exactly as received
/// * `provided_signature` - The `X-Cos-Signature` header value, if any
/// * `secret` - The configured shared secret, if any
/// * `disabled` - Bypass verification entirely (local testing)
///
/// An empty body is signed like any other; only a missing secret or the
/// `disabled` flag skips verification.
pub fn verify_cos_signature(
    raw_body: &[u8],
    provided_signature: Option<&str>,
    secret: Option<&str>,
    disabled: bool,
) -> VerifyResult {
    if disabled {
        return VerifyResult::Skipped;
    }

    let secret = match secret {
        Some(s) if !s.is_empty() => s,
        _ => return VerifyResult::Skipped,
    };

    let provided = match provided_signature {
        Some(sig) => sig,
        None => {
            warn!(body_length = raw_body.len(), "cos_signature_missing");
            return VerifyResult::Invalid;
        }
    };

    let expected = match sign(raw_body, secret) {
        Some(sig) => sig,
        None => {
            warn!("cos_signature_invalid_key");
            return VerifyResult::Invalid;
        }
    };

    // Constant-time comparison to prevent timing attacks
    if bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
        VerifyResult::Valid
    } else {
        warn!(
            expected_length = expected.len(),
            actual_length = provided.len(),
            "cos_signature_mismatch"
        );
        VerifyResult::Invalid
    }
}

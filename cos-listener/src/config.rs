//! Configuration module for environment variable parsing.
//!
//! Reads all listener settings from environment variables. Anything missing
//! or unparseable falls back to a default so the service always starts.

use std::env;
use tracing::warn;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared secret for `X-Cos-Signature` HMAC verification
    pub cos_secret_key: Option<String>,

    /// Skip signature verification entirely (local testing only)
    pub disable_signature_verification: bool,

    /// COS endpoint, echoed by the status endpoints
    pub cos_endpoint: Option<String>,

    /// COS bucket name, echoed by the status endpoints
    pub cos_bucket_name: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: parse_port("PORT", 5000),

            cos_secret_key: env::var("COS_SECRET_KEY").ok(),

            disable_signature_verification: parse_bool("DISABLE_SIGNATURE_VERIFICATION"),

            cos_endpoint: env::var("COS_ENDPOINT").ok(),

            cos_bucket_name: env::var("COS_BUCKET_NAME").ok(),
        }
    }

    /// Whether a non-empty shared secret is configured.
    pub fn has_secret(&self) -> bool {
        self.cos_secret_key
            .as_ref()
            .map(|k| !k.is_empty())
            .unwrap_or(false)
    }

    /// Whether inbound requests will actually be checked.
    pub fn signature_verification_enabled(&self) -> bool {
        self.has_secret() && !self.disable_signature_verification
    }

    /// Whether both the COS endpoint and bucket are set.
    pub fn cos_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_ref().map(|s| !s.is_empty()).unwrap_or(false);
        set(&self.cos_endpoint) && set(&self.cos_bucket_name)
    }
}

fn parse_port(name: &str, default: u16) -> u16 {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(port) => port,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid port, using default");
            default
        }
    }
}

/// Only a case-insensitive "true" enables the flag.
fn parse_bool(name: &str) -> bool {
    env::var(name)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

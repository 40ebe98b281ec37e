use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};

/// The JWT payload fields the client cares about. The signature is the
/// backend's business; we only read.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    /// Issued-at, seconds since epoch.
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiry, seconds since epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// A token without `exp` never expires from the client's point of view.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| now.timestamp() >= exp)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Read the claims out of a `header.payload.signature` token.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        bail!("token is not a JWT (expected three dot-separated parts)");
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .context("token payload is not base64url")?;
    serde_json::from_slice(&bytes).context("token payload is not JSON")
}

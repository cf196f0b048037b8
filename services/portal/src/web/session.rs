//! services/portal/src/web/session.rs
//!
//! Stateless session tokens. A token is `base64url(claims).base64url(mac)`
//! where the MAC is HMAC-SHA256 over the encoded claims. The token lives in an
//! `HttpOnly` cookie named `session`.

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use manager_portal_core::domain::SessionUser;
use manager_portal_core::guard::SessionStatus;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session token is malformed")]
    Malformed,
    #[error("session token signature does not match")]
    BadSignature,
    #[error("session token has expired")]
    Expired,
    #[error("session key rejected: {0}")]
    Key(String),
}

/// The claims carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Claims {
    id: String,
    email: String,
    name: String,
    role: String,
    /// Expiry as a unix timestamp in seconds.
    exp: i64,
}

#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
    ttl: Duration,
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| SessionError::Key(e.to_string()))
    }

    pub fn issue(&self, user: &SessionUser) -> Result<String, SessionError> {
        let claims = Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|_| SessionError::Malformed)?;
        let encoded = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{encoded}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<SessionUser, SessionError> {
        let (encoded, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| SessionError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| SessionError::Malformed)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(SessionError::Expired);
        }

        Ok(SessionUser {
            id: claims.id,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        })
    }

    /// Resolves the session carried by a request. Any unusable token counts as no session.
    pub fn status(&self, headers: &HeaderMap) -> SessionStatus {
        let Some(token) = session_token(headers) else {
            return SessionStatus::Unauthenticated;
        };
        match self.verify(token) {
            Ok(user) => SessionStatus::Authenticated(user),
            Err(e) => {
                debug!("ignoring session cookie: {e}");
                SessionStatus::Unauthenticated
            }
        }
    }

    pub fn cookie(&self, token: &str) -> String {
        format!(
            "{SESSION_COOKIE}={token}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
            self.ttl.num_seconds()
        )
    }
}

pub fn cleared_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0")
}

/// The raw `session` cookie value, if the request carries one.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| match c.trim().split_once('=') {
            Some((name, value)) if name == SESSION_COOKIE => Some(value),
            _ => None,
        })
        .filter(|token| !token.is_empty())
}

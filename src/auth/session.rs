//! Credential verification and the session cookie.
//!
//! There is no server-side session table. The cookie value is the
//! authenticated email, and every gated request re-checks that value
//! against the admin directory, so a removed admin loses access without
//! any revocation step.

use axum::http::{HeaderMap, HeaderValue, header::InvalidHeaderValue};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::auth::{AdminDirectory, LoginRateLimiter};
use crate::config::AdminAccount;

pub const SESSION_COOKIE: &str = "admin_email";

/// One week, set at issuance.
const SESSION_TTL_SECONDS: u64 = 60 * 60 * 24 * 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Too many login attempts. Please try again later.")]
    RateLimited,

    /// One message for both unknown email and wrong password, so the
    /// endpoint never confirms which addresses exist.
    #[error("Invalid email or password")]
    InvalidCredentials,
}

pub struct SessionIssuer {
    directory: Arc<AdminDirectory>,
    limiter: Arc<LoginRateLimiter>,
}

impl SessionIssuer {
    #[must_use]
    pub fn new(directory: Arc<AdminDirectory>, limiter: Arc<LoginRateLimiter>) -> Self {
        Self { directory, limiter }
    }

    /// Verify credentials for one login attempt.
    ///
    /// The rate check runs first and every attempt counts toward the
    /// window, successful ones included; logging in repeatedly does not
    /// reset the counter.
    pub fn login(
        &self,
        email: &str,
        password: &str,
        now: Instant,
    ) -> Result<AdminAccount, AuthError> {
        if !self.limiter.check_and_record(email, now) {
            return Err(AuthError::RateLimited);
        }

        let admin = self
            .directory
            .find(email)
            .ok_or(AuthError::InvalidCredentials)?;

        if admin.password != password {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(admin.clone())
    }
}

/// Build the `Set-Cookie` value for a fresh session.
pub fn session_cookie(email: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={email}; Path=/; HttpOnly; SameSite=Strict; Max-Age={SESSION_TTL_SECONDS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build the `Set-Cookie` value that discards the session.
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the session email out of the `Cookie` header, if present.
#[must_use]
pub fn extract_session_email(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE {
            return Some(val.to_string());
        }
    }
    None
}

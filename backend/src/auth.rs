//! In-process session tokens for the admin console. Tokens are opaque
//! random strings delivered as a cookie on login and accepted back as
//! either the cookie or a bearer header.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap};
use dashmap::DashMap;

pub const AUTH_COOKIE: &str = "auth_token";

struct Session {
    username: String,
    expires_at: Instant,
}

/// Shared token table. Cheap to clone; expired entries are pruned on the
/// next issue.
#[derive(Clone)]
pub struct SessionTable {
    sessions: Arc<DashMap<String, Session>>,
    ttl: Duration,
}

impl SessionTable {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Mint a fresh token for `username`.
    pub fn issue(&self, username: &str) -> String {
        self.sessions
            .retain(|_, session| session.expires_at > Instant::now());
        let token = hex::encode(rand::random::<[u8; 32]>());
        self.sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// The username behind a live token; expired tokens are dropped here.
    pub fn verify(&self, token: &str) -> Option<String> {
        let (username, expired) = {
            let session = self.sessions.get(token)?;
            (
                session.username.clone(),
                session.expires_at <= Instant::now(),
            )
        };
        if expired {
            self.sessions.remove(token);
            return None;
        }
        Some(username)
    }

    pub fn revoke(&self, token: &str) {
        self.sessions.remove(token);
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// The token a request carries, from `Authorization: Bearer` or the auth
/// cookie, in that order.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Some(token) = value.to_str().ok().and_then(|v| v.strip_prefix("Bearer ")) {
            return Some(token.to_string());
        }
    }
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == AUTH_COOKIE).then(|| value.to_string())
    })
}

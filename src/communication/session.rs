//! Process-wide session tokens.
//!
//! The session starts unauthenticated. Only successful login and renew
//! responses write to it, and every write is a single replace under the
//! lock, so concurrent readers never observe a half-updated pair. When two
//! writes race (a login and a renew in flight together) the later one wins.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Access and renew tokens of the logged-in user.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived token sent with every authenticated request.
    pub access_token: String,
    /// Token traded for a fresh pair on `auth/renew`.
    pub renew_token: String,
    /// Expiry of the access token, when the server reports one.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenPair {
    /// Whether the access token is past its reported expiry.
    ///
    /// Pairs without an expiry never count as expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= Utc::now())
    }
}

// Tokens stay out of logs
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("renew_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Body of a successful `auth/connect` or `auth/renew` response.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// New access token.
    pub access_token: String,
    /// New renew token. Renew responses may omit it.
    #[serde(default)]
    pub renew_token: Option<String>,
    /// Expiry as epoch seconds.
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("renew_token_present", &self.renew_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Holder of the current [`TokenPair`].
#[derive(Debug, Default)]
pub struct Session {
    tokens: RwLock<Option<TokenPair>>,
}

impl Session {
    /// Creates an unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide session shared by the global client.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<Session>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Current access token, or an empty string without a session.
    pub fn current_access_token(&self) -> String {
        self.read(|pair| pair.access_token.clone())
    }

    /// Current renew token, or an empty string without a session.
    pub fn current_renew_token(&self) -> String {
        self.read(|pair| pair.renew_token.clone())
    }

    /// Snapshot of the whole pair.
    pub fn tokens(&self) -> Option<TokenPair> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a non-expired pair is held.
    pub fn is_authenticated(&self) -> bool {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|pair| !pair.is_expired())
    }

    /// Replaces the pair, returning the previous one.
    pub fn replace(&self, pair: TokenPair) -> Option<TokenPair> {
        let mut guard = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        guard.replace(pair)
    }

    /// Stores a login or renew response and returns the resulting pair.
    ///
    /// A response without a renew token keeps the one already held. The
    /// merge happens under a single write lock.
    pub fn store(&self, response: TokenResponse) -> TokenPair {
        let mut guard = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        let renew_token = response.renew_token.unwrap_or_else(|| {
            guard
                .as_ref()
                .map(|pair| pair.renew_token.clone())
                .unwrap_or_default()
        });
        let pair = TokenPair {
            access_token: response.access_token,
            renew_token,
            expires_at: response.expires_at,
        };
        *guard = Some(pair.clone());
        log::info!("Session tokens updated (expires_at={:?})", pair.expires_at);
        pair
    }

    /// Drops the current pair.
    pub fn clear(&self) {
        let mut guard = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            log::info!("Session cleared");
        }
    }

    fn read(&self, field: impl FnOnce(&TokenPair) -> String) -> String {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(field)
            .unwrap_or_default()
    }
}

//! Auth state cache.
//!
//! Two independent TTL caches front the expensive verification path: one
//! keyed by a digest of the bearer token (short TTL), one keyed by user
//! id for the hydrated session shape (longer TTL). The split exists
//! because a user may hold several live tokens at once: invalidating one
//! token must not touch the user's other sessions, while a role change
//! still lands once any hydrate happens.
//!
//! Verification failures are never cached: a garbage token re-runs real
//! verification on every call, so bad tokens cannot pin a negative entry
//! or suppress logging.

use uuid::Uuid;

use crate::cache::{CacheConfig, TokenKey, TtlCache};
use crate::domain::principal::AuthPrincipal;

pub struct AuthCache {
    tokens: TtlCache<TokenKey, AuthPrincipal>,
    sessions: TtlCache<Uuid, AuthPrincipal>,
}

impl AuthCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            tokens: TtlCache::new(
                "auth_tokens",
                config.token_capacity_non_zero(),
                config.token_ttl(),
            ),
            sessions: TtlCache::new(
                "auth_sessions",
                config.session_capacity_non_zero(),
                config.session_ttl(),
            ),
        }
    }

    pub fn cached_verification(&self, token: &str) -> Option<AuthPrincipal> {
        self.tokens.get(&TokenKey::derive(token))
    }

    pub fn store_verification(&self, token: &str, principal: AuthPrincipal) {
        self.tokens.insert(TokenKey::derive(token), principal);
    }

    pub fn session(&self, user_id: Uuid) -> Option<AuthPrincipal> {
        self.sessions.get(&user_id)
    }

    pub fn store_session(&self, user_id: Uuid, principal: AuthPrincipal) {
        self.sessions.insert(user_id, principal);
    }

    pub fn invalidate_token(&self, token: &str) {
        self.tokens.remove(&TokenKey::derive(token));
    }

    pub fn invalidate_session(&self, user_id: Uuid) {
        self.sessions.remove(&user_id);
    }

    pub fn clear(&self) {
        self.tokens.clear();
        self.sessions.clear();
    }
}

//! Cached authentication entry points used by the HTTP layer.

use std::sync::Arc;

use metrics::counter;
use tracing::debug;

use crate::domain::principal::AuthPrincipal;

use super::cache::AuthCache;
use super::token::{IssuedSession, SessionTokenService};

#[derive(Clone)]
pub struct AuthService {
    tokens: SessionTokenService,
    cache: Arc<AuthCache>,
}

impl AuthService {
    pub fn new(tokens: SessionTokenService, cache: Arc<AuthCache>) -> Self {
        Self { tokens, cache }
    }

    /// Verify a bearer token, serving from cache inside the TTL window.
    ///
    /// On a token-cache miss the store-backed verification runs; the
    /// session cache can still short-circuit principal hydration when the
    /// same user authenticated recently with a different token. Only
    /// successful outcomes are cached.
    pub async fn verify_cached(&self, token: &str) -> Result<AuthPrincipal, super::AuthError> {
        if let Some(principal) = self.cache.cached_verification(token) {
            return Ok(principal);
        }

        let user_id = self.tokens.verify_token(token).await?;

        let principal = match self.cache.session(user_id) {
            Some(principal) => principal,
            None => {
                let principal = self.tokens.hydrate(user_id).await?;
                self.cache.store_session(user_id, principal.clone());
                principal
            }
        };

        self.cache.store_verification(token, principal.clone());
        Ok(principal)
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<IssuedSession, super::AuthError> {
        let issued = self.tokens.login(username, password).await?;
        self.cache
            .store_session(issued.principal.user_id, issued.principal.clone());
        counter!("plaza_auth_login_total").increment(1);
        Ok(issued)
    }

    /// Revoke a session and drop it from both caches.
    ///
    /// Clearing only one of the two would leave the other usable from
    /// cache for up to its TTL; logout is only correct when both go.
    pub async fn logout(
        &self,
        token: &str,
        principal: &AuthPrincipal,
    ) -> Result<(), super::AuthError> {
        self.tokens.revoke(token).await?;
        self.cache.invalidate_token(token);
        self.cache.invalidate_session(principal.user_id);
        debug!(
            target = "plaza::auth",
            user_id = %principal.user_id,
            "session revoked and caches invalidated"
        );
        Ok(())
    }
}

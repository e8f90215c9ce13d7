//! Opaque bearer-token issuance and store-backed verification.
//!
//! Tokens look like `plz_<prefix>_<secret>`. The store keeps only the
//! prefix and a SHA-256 digest of the secret; verification loads the
//! session row by prefix, constant-time-compares the digest, checks
//! expiry, and hydrates the principal from the user row. This is the
//! expensive path that the auth cache exists to avoid repeating.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::application::repos::{NewSessionParams, SessionsRepo, UsersRepo};
use crate::domain::principal::AuthPrincipal;

use super::AuthError;

const TOKEN_PREFIX: &str = "plz";
const MIN_SECRET_LEN: usize = 32;
const SESSION_LIFETIME_DAYS: i64 = 7;

#[derive(Clone)]
pub struct SessionTokenService {
    sessions: Arc<dyn SessionsRepo>,
    users: Arc<dyn UsersRepo>,
}

pub struct IssuedSession {
    pub token: String,
    pub principal: AuthPrincipal,
}

impl SessionTokenService {
    pub fn new(sessions: Arc<dyn SessionsRepo>, users: Arc<dyn UsersRepo>) -> Self {
        Self { sessions, users }
    }

    /// Verify credentials and issue a fresh session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedSession, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::BadCredentials)?;

        let hashed_input = hash_secret(password);
        if user.hashed_password.ct_eq(&hashed_input).unwrap_u8() == 0 {
            return Err(AuthError::BadCredentials);
        }

        let prefix = generate_prefix();
        let secret = generate_secret();
        let token = format!("{TOKEN_PREFIX}_{prefix}_{secret}");
        let expires_at = OffsetDateTime::now_utc() + Duration::days(SESSION_LIFETIME_DAYS);

        self.sessions
            .create_session(NewSessionParams {
                prefix,
                hashed_secret: hash_secret(&secret),
                user_id: user.id,
                expires_at,
            })
            .await?;

        Ok(IssuedSession {
            token,
            principal: AuthPrincipal {
                user_id: user.id,
                username: user.username,
                role: user.role,
            },
        })
    }

    /// Full store-backed verification of a bearer token.
    ///
    /// Returns the session's user id so the caller can consult the
    /// session cache before paying for principal hydration.
    pub async fn verify_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let parsed = parse_token(token).ok_or(AuthError::Invalid)?;
        let row = self
            .sessions
            .find_by_prefix(&parsed.prefix)
            .await?
            .ok_or(AuthError::Invalid)?;

        if row.expires_at <= OffsetDateTime::now_utc() {
            return Err(AuthError::Expired);
        }

        let hashed_input = hash_secret(&parsed.secret);
        if row.hashed_secret.ct_eq(&hashed_input).unwrap_u8() == 0 {
            return Err(AuthError::Invalid);
        }

        Ok(row.user_id)
    }

    /// Load the principal shape for a verified user id.
    pub async fn hydrate(&self, user_id: Uuid) -> Result<AuthPrincipal, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Invalid)?;
        Ok(AuthPrincipal {
            user_id: user.id,
            username: user.username,
            role: user.role,
        })
    }

    /// Delete the session row backing a token. Unparseable tokens are a
    /// no-op: there is nothing in the store to revoke.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        if let Some(parsed) = parse_token(token) {
            self.sessions.delete_by_prefix(&parsed.prefix).await?;
        }
        Ok(())
    }
}

fn hash_secret(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

fn generate_prefix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

struct ParsedToken {
    prefix: String,
    secret: String,
}

fn parse_token(token: &str) -> Option<ParsedToken> {
    let mut parts = token.splitn(3, '_');
    let prefix_tag = parts.next()?;
    if prefix_tag != TOKEN_PREFIX {
        return None;
    }
    let prefix = parts.next()?;
    let secret = parts.next()?;
    if secret.len() < MIN_SECRET_LEN || prefix.is_empty() {
        return None;
    }
    Some(ParsedToken {
        prefix: prefix.to_string(),
        secret: secret.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_generated_tokens() {
        let token = format!("{TOKEN_PREFIX}_{}_{}", generate_prefix(), generate_secret());
        let parsed = parse_token(&token).expect("parse generated token");
        assert_eq!(parsed.prefix.len(), 12);
        assert!(parsed.secret.len() >= MIN_SECRET_LEN);
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        assert!(parse_token("").is_none());
        assert!(parse_token("plz_onlyprefix").is_none());
        assert!(parse_token("sk_abcdef123456_0123456789abcdef0123456789abcdef").is_none());
        assert!(parse_token("plz_abcdef123456_tooshort").is_none());
    }

    #[test]
    fn secret_hashing_is_deterministic() {
        assert_eq!(hash_secret("abc"), hash_secret("abc"));
        assert_ne!(hash_secret("abc"), hash_secret("abd"));
    }
}

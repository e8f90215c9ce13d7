//! Authentication: opaque session tokens and the auth state cache.

mod cache;
mod service;
mod token;

pub use cache::AuthCache;
pub use service::AuthService;
pub use token::{IssuedSession, SessionTokenService};

use thiserror::Error;

use crate::application::repos::RepoError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid bearer token")]
    Invalid,
    #[error("expired bearer token")]
    Expired,
    #[error("invalid credentials")]
    BadCredentials,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

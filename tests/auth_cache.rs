//! Auth cache behavior: verification caching, never-cached failures,
//! and the two-sided logout invalidation contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use plaza::application::repos::{
    NewSessionParams, RepoError, SessionRow, SessionsRepo, UserRow, UsersRepo,
};
use plaza::auth::{AuthCache, AuthService, SessionTokenService};
use plaza::cache::CacheConfig;
use plaza::domain::principal::Role;

#[derive(Default)]
struct FakeAuthStore {
    sessions: Mutex<HashMap<String, SessionRow>>,
    users: Mutex<HashMap<Uuid, UserRow>>,
    session_lookups: AtomicUsize,
    user_lookups: AtomicUsize,
}

impl FakeAuthStore {
    fn add_user(&self, username: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().expect("users lock").insert(
            id,
            UserRow {
                id,
                username: username.to_string(),
                hashed_password: Sha256::digest(password.as_bytes()).to_vec(),
                role: Role::User,
            },
        );
        id
    }

    fn add_session(&self, prefix: &str, secret: &str, user_id: Uuid, expires_at: OffsetDateTime) {
        self.sessions.lock().expect("sessions lock").insert(
            prefix.to_string(),
            SessionRow {
                prefix: prefix.to_string(),
                hashed_secret: Sha256::digest(secret.as_bytes()).to_vec(),
                user_id,
                expires_at,
            },
        );
    }

    fn session_lookups(&self) -> usize {
        self.session_lookups.load(Ordering::SeqCst)
    }

    fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionsRepo for FakeAuthStore {
    async fn create_session(&self, params: NewSessionParams) -> Result<(), RepoError> {
        self.sessions.lock().expect("sessions lock").insert(
            params.prefix.clone(),
            SessionRow {
                prefix: params.prefix,
                hashed_secret: params.hashed_secret,
                user_id: params.user_id,
                expires_at: params.expires_at,
            },
        );
        Ok(())
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<SessionRow>, RepoError> {
        self.session_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .sessions
            .lock()
            .expect("sessions lock")
            .get(prefix)
            .cloned())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), RepoError> {
        self.sessions.lock().expect("sessions lock").remove(prefix);
        Ok(())
    }
}

#[async_trait]
impl UsersRepo for FakeAuthStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, RepoError> {
        Ok(self
            .users
            .lock()
            .expect("users lock")
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRow>, RepoError> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.lock().expect("users lock").get(&id).cloned())
    }
}

fn auth_service(store: &Arc<FakeAuthStore>) -> (AuthService, Arc<AuthCache>) {
    let cache = Arc::new(AuthCache::new(&CacheConfig::default()));
    let service = AuthService::new(
        SessionTokenService::new(
            Arc::clone(store) as Arc<dyn SessionsRepo>,
            Arc::clone(store) as Arc<dyn UsersRepo>,
        ),
        Arc::clone(&cache),
    );
    (service, cache)
}

const SECRET: &str = "0123456789abcdef0123456789abcdef";

#[tokio::test]
async fn verification_outcome_is_cached_within_ttl() {
    let store = Arc::new(FakeAuthStore::default());
    let (auth, _cache) = auth_service(&store);
    store.add_user("ada", "correct horse 1");

    let issued = auth.login("ada", "correct horse 1").await.expect("login");

    auth.verify_cached(&issued.token).await.expect("first verify");
    assert_eq!(store.session_lookups(), 1);

    auth.verify_cached(&issued.token).await.expect("cached verify");
    assert_eq!(store.session_lookups(), 1, "second verify served from cache");
}

#[tokio::test]
async fn invalid_tokens_are_never_cached() {
    let store = Arc::new(FakeAuthStore::default());
    let (auth, _cache) = auth_service(&store);

    let garbage = format!("plz_nosuchprefix_{SECRET}");
    assert!(auth.verify_cached(&garbage).await.is_err());
    assert!(auth.verify_cached(&garbage).await.is_err());

    assert_eq!(
        store.session_lookups(),
        2,
        "every attempt re-runs real verification"
    );
}

#[tokio::test]
async fn malformed_tokens_fail_without_touching_the_store() {
    let store = Arc::new(FakeAuthStore::default());
    let (auth, _cache) = auth_service(&store);

    assert!(auth.verify_cached("not-a-token").await.is_err());
    assert!(auth.verify_cached("plz_prefix_short").await.is_err());
    assert_eq!(store.session_lookups(), 0);
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_not_cached() {
    let store = Arc::new(FakeAuthStore::default());
    let (auth, _cache) = auth_service(&store);
    let user_id = store.add_user("ada", "correct horse 1");

    let expired_at = OffsetDateTime::now_utc() - Duration::hours(1);
    store.add_session("expiredprefix", SECRET, user_id, expired_at);

    let token = format!("plz_expiredprefix_{SECRET}");
    assert!(auth.verify_cached(&token).await.is_err());
    assert!(auth.verify_cached(&token).await.is_err());
    assert_eq!(store.session_lookups(), 2);
}

#[tokio::test]
async fn wrong_secret_is_rejected_in_spite_of_valid_prefix() {
    let store = Arc::new(FakeAuthStore::default());
    let (auth, _cache) = auth_service(&store);
    let user_id = store.add_user("ada", "correct horse 1");

    let expires_at = OffsetDateTime::now_utc() + Duration::days(1);
    store.add_session("liveprefix99", SECRET, user_id, expires_at);

    let token = format!("plz_liveprefix99_{}", "f".repeat(32));
    assert!(auth.verify_cached(&token).await.is_err());
}

#[tokio::test]
async fn logout_invalidates_token_and_session_caches() {
    let store = Arc::new(FakeAuthStore::default());
    let (auth, _cache) = auth_service(&store);
    store.add_user("ada", "correct horse 1");

    let issued = auth.login("ada", "correct horse 1").await.expect("login");
    let principal = auth
        .verify_cached(&issued.token)
        .await
        .expect("verify before logout");

    auth.logout(&issued.token, &principal).await.expect("logout");

    // the cached principal is gone; re-verification runs for real and
    // fails because the session row was deleted
    let lookups_before = store.session_lookups();
    assert!(auth.verify_cached(&issued.token).await.is_err());
    assert!(store.session_lookups() > lookups_before);
}

#[tokio::test]
async fn session_cache_skips_principal_hydration_for_same_user() {
    let store = Arc::new(FakeAuthStore::default());
    let (auth, cache) = auth_service(&store);
    let user_id = store.add_user("ada", "correct horse 1");

    let expires_at = OffsetDateTime::now_utc() + Duration::days(1);
    store.add_session("phoneprefix1", SECRET, user_id, expires_at);
    store.add_session("laptopprefix", SECRET, user_id, expires_at);

    let phone = format!("plz_phoneprefix1_{SECRET}");
    let laptop = format!("plz_laptopprefix_{SECRET}");

    auth.verify_cached(&phone).await.expect("first device");
    assert_eq!(store.user_lookups(), 1, "first verification hydrates");

    auth.verify_cached(&laptop).await.expect("second device");
    assert_eq!(
        store.user_lookups(),
        1,
        "second device reuses the hydrated session"
    );

    // invalidating one device's token leaves the other usable from cache
    cache.invalidate_token(&phone);
    auth.verify_cached(&laptop).await.expect("still cached");
    assert_eq!(store.user_lookups(), 1);
}

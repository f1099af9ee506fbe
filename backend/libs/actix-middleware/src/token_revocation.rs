//! Token revocation seam and check middleware
//!
//! Revocation rejects a bearer credential that is still cryptographically
//! valid. The middleware consults the store on every request carrying a
//! bearer token; requests without one pass through untouched so
//! unauthenticated routes keep working. Store failures fail closed: a
//! request whose token cannot be checked is refused with 503.

use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::{ready, Ready};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error as ThisError;
use tokio::sync::RwLock;

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("revocation store failure: {0}")]
    Backend(String),
}

/// One revoked credential. `expires_at` mirrors the token's own natural
/// expiry; once it passes, the entry is dead weight awaiting the sweep.
#[derive(Debug, Clone)]
pub struct RevokedEntry {
    pub subject_id: i64,
    pub revoked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Durable set of revoked tokens, keyed by the exact token string.
///
/// The store is the single shared mutable resource in the security
/// pipeline; implementations must tolerate concurrent readers, writers
/// and the periodic sweep.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// True iff an entry for `token` exists with `expires_at` in the
    /// future. An expired, un-swept entry tests as not revoked.
    async fn is_revoked(&self, token: &str) -> Result<bool, StoreError>;

    /// Record a revocation. Revoking the same token twice is not an
    /// error; uniqueness is enforced at the store boundary.
    async fn revoke(
        &self,
        token: &str,
        subject_id: i64,
        expires_at: DateTime<Utc>,
        reason: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Best-effort "logout everywhere". No subject-to-token index exists,
    /// so this records an audit trail entry without invalidating any
    /// currently outstanding token.
    async fn revoke_all_for_subject(&self, subject_id: i64) -> Result<(), StoreError>;

    /// Delete entries whose expiry has passed; returns how many were
    /// removed. Purely a liveness optimization; `is_revoked` is correct
    /// with or without it.
    async fn sweep(&self) -> Result<u64, StoreError>;
}

/// In-memory store used by tests and single-node deployments.
#[derive(Default)]
pub struct InMemoryRevocationStore {
    entries: RwLock<HashMap<String, RevokedEntry>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn is_revoked(&self, token: &str) -> Result<bool, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(token)
            .map(|entry| entry.expires_at > Utc::now())
            .unwrap_or(false))
    }

    async fn revoke(
        &self,
        token: &str,
        subject_id: i64,
        expires_at: DateTime<Utc>,
        reason: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        // First revocation wins; a duplicate is a no-op
        entries.entry(token.to_owned()).or_insert_with(|| RevokedEntry {
            subject_id,
            revoked_at: Utc::now(),
            expires_at,
            reason: reason.map(str::to_owned),
        });
        Ok(())
    }

    async fn revoke_all_for_subject(&self, subject_id: i64) -> Result<(), StoreError> {
        tracing::warn!(subject_id, "all tokens invalidated for subject (audit only)");
        Ok(())
    }

    async fn sweep(&self) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Utc::now();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}

/// A store whose every operation fails. Exercises the fail-closed path.
pub struct UnavailableStore;

#[async_trait]
impl RevocationStore for UnavailableStore {
    async fn is_revoked(&self, _token: &str) -> Result<bool, StoreError> {
        Err(StoreError::Backend("store unreachable".into()))
    }

    async fn revoke(
        &self,
        _token: &str,
        _subject_id: i64,
        _expires_at: DateTime<Utc>,
        _reason: Option<&str>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Backend("store unreachable".into()))
    }

    async fn revoke_all_for_subject(&self, _subject_id: i64) -> Result<(), StoreError> {
        Err(StoreError::Backend("store unreachable".into()))
    }

    async fn sweep(&self) -> Result<u64, StoreError> {
        Err(StoreError::Backend("store unreachable".into()))
    }
}

pub struct TokenRevocationMiddleware {
    store: Arc<dyn RevocationStore>,
}

impl TokenRevocationMiddleware {
    pub fn new(store: Arc<dyn RevocationStore>) -> Self {
        Self { store }
    }
}

impl<S, B> Transform<S, ServiceRequest> for TokenRevocationMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = TokenRevocationMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenRevocationMiddlewareService {
            service: Rc::new(service),
            store: self.store.clone(),
        }))
    }
}

pub struct TokenRevocationMiddlewareService<S> {
    service: Rc<S>,
    store: Arc<dyn RevocationStore>,
}

impl<S, B> Service<ServiceRequest> for TokenRevocationMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let store = self.store.clone();

        Box::pin(async move {
            // No bearer token: unauthenticated route, nothing to check
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|header| header.to_str().ok())
                .and_then(|header| header.strip_prefix("Bearer "))
                .map(str::to_owned);

            let Some(token) = token else {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            };

            match store.is_revoked(&token).await {
                Ok(true) => {
                    tracing::warn!(
                        ip = req
                            .connection_info()
                            .realip_remote_addr()
                            .unwrap_or("unknown"),
                        path = %req.path(),
                        "attempt to use revoked token"
                    );
                    let response: HttpResponse<BoxBody> = HttpResponse::Unauthorized()
                        .json(json!({"error": "Token has been invalidated"}));
                    Ok(req.into_response(response).map_into_right_body())
                }
                Ok(false) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    // Fail closed: an uncheckable token is not trusted
                    tracing::error!(error = %err, "revocation check failed; refusing request");
                    let response: HttpResponse<BoxBody> = HttpResponse::ServiceUnavailable()
                        .json(json!({"error": "Token revocation check unavailable"}));
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn revocation_round_trip() {
        let store = InMemoryRevocationStore::new();
        store
            .revoke("tok1", 7, Utc::now() + Duration::hours(1), Some("logout"))
            .await
            .unwrap();

        assert!(store.is_revoked("tok1").await.unwrap());
        assert!(!store.is_revoked("unknown-token").await.unwrap());
    }

    #[tokio::test]
    async fn expired_entry_is_not_blocking_even_unswept() {
        let store = InMemoryRevocationStore::new();
        store
            .revoke("old", 1, Utc::now() - Duration::minutes(5), None)
            .await
            .unwrap();

        assert!(!store.is_revoked("old").await.unwrap());
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let store = InMemoryRevocationStore::new();
        store
            .revoke("expired", 1, Utc::now() - Duration::hours(1), None)
            .await
            .unwrap();
        store
            .revoke("live", 1, Utc::now() + Duration::hours(1), None)
            .await
            .unwrap();

        let removed = store.sweep().await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.is_revoked("live").await.unwrap());
        assert!(!store.is_revoked("expired").await.unwrap());
    }

    #[tokio::test]
    async fn double_revocation_is_not_an_error() {
        let store = InMemoryRevocationStore::new();
        let expires = Utc::now() + Duration::hours(1);

        store.revoke("tok", 7, expires, Some("logout")).await.unwrap();
        assert!(store.is_revoked("tok").await.unwrap());

        store.revoke("tok", 7, expires, Some("logout")).await.unwrap();
        assert!(store.is_revoked("tok").await.unwrap());
    }
}

//! Single-slot expiring cache for the payment gateway bearer token.
//!
//! ## Caching behavior
//!
//! - A cached token is reused as long as `now < expires_at`; no network call
//!   is made on the hit path.
//! - On a miss the configured [`TokenSource`] issues a fresh token. The cache
//!   stores it with a safety margin below the server-reported expiry so a
//!   token is never handed out moments before the server rejects it.
//! - The margin is 5 minutes for typical hour-lived tokens, scaled down to
//!   `lifetime / 12` for short-lived ones so they still get a usable window.
//! - When the endpoint omits expiry entirely, the token is cached for 55
//!   minutes.
//!
//! ## Concurrency
//!
//! The slot is a single `RwLock`-guarded value. Concurrent callers racing a
//! miss may each issue a network request; issuance is idempotent and
//! infrequent, so the redundant call is accepted instead of coalescing.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use super::errors::{AuthError, AuthResult};

/// Safety margin subtracted from the server-reported expiry
const EXPIRY_SAFETY_MARGIN_MILLIS: i64 = 5 * 60 * 1000;
/// Divisor bounding the margin for short-lived tokens
const MARGIN_LIFETIME_DIVISOR: i64 = 12;
/// Cache lifetime when the endpoint does not report expiry
const FALLBACK_LIFETIME_MILLIS: i64 = 55 * 60 * 1000;
/// Request timeout for the token endpoint
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A freshly issued bearer token as returned by the identity endpoint
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    /// Server-reported expiry, epoch seconds. `None` when omitted.
    pub expires_at: Option<i64>,
}

/// Port for token issuance, so the cache logic is testable without a network.
#[async_trait]
pub trait TokenSource: fmt::Debug + Send + Sync {
    /// Issue a fresh token with the client-credentials grant.
    async fn issue(&self) -> AuthResult<IssuedToken>;
}

/// Production token source: posts the client-credentials form to the
/// configured OAuth token URL.
#[derive(Debug, Clone)]
pub struct HttpTokenSource {
    client: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
}

impl HttpTokenSource {
    pub fn new(token_url: Url, client_id: String, client_secret: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            token_url,
            client_id,
            client_secret,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    /// Epoch seconds
    expires_at: Option<i64>,
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn issue(&self) -> AuthResult<IssuedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AuthError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let decoded: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        match decoded.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(IssuedToken {
                access_token,
                expires_at: decoded.expires_at,
            }),
            _ => Err(AuthError::MissingAccessToken),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at_millis: i64,
}

/// Single-slot expiring token cache. See the module docs for the caching and
/// concurrency contract.
#[derive(Debug, Clone)]
pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    slot: Arc<RwLock<Option<CachedToken>>>,
    #[cfg(any(test, feature = "testing"))]
    time_offset: Arc<RwLock<chrono::Duration>>,
}

impl TokenCache {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            slot: Arc::new(RwLock::new(None)),
            #[cfg(any(test, feature = "testing"))]
            time_offset: Arc::new(RwLock::new(chrono::Duration::zero())),
        }
    }

    async fn now_millis(&self) -> i64 {
        #[cfg(any(test, feature = "testing"))]
        {
            let offset = self.time_offset.read().await;
            (Utc::now() + *offset).timestamp_millis()
        }

        #[cfg(not(any(test, feature = "testing")))]
        {
            Utc::now().timestamp_millis()
        }
    }

    /// Advance virtual time for testing
    #[cfg(any(test, feature = "testing"))]
    pub async fn advance_time(&self, duration: chrono::Duration) {
        let mut offset = self.time_offset.write().await;
        *offset = *offset + duration;
    }

    /// Return a valid bearer token, issuing a fresh one when the cached token
    /// is absent or past its (margin-adjusted) expiry.
    pub async fn bearer_token(&self) -> AuthResult<String> {
        let now = self.now_millis().await;

        if let Some(cached) = self.slot.read().await.as_ref() {
            if now < cached.expires_at_millis {
                debug!("reusing cached payment bearer token");
                return Ok(cached.value.clone());
            }
        }

        // Miss path runs without the lock held, so concurrent misses each
        // fetch and the last writer wins.
        let issued = self.source.issue().await?;
        let expires_at_millis = cache_expiry_millis(now, issued.expires_at);
        info!(
            "issued payment bearer token, cached for {}s",
            (expires_at_millis - now).max(0) / 1000
        );

        *self.slot.write().await = Some(CachedToken {
            value: issued.access_token.clone(),
            expires_at_millis,
        });

        Ok(issued.access_token)
    }
}

/// Compute the cache expiry for a token issued at `now_millis`.
fn cache_expiry_millis(now_millis: i64, server_expiry_secs: Option<i64>) -> i64 {
    match server_expiry_secs {
        Some(expiry_secs) => {
            let expiry_millis = expiry_secs.saturating_mul(1000);
            let lifetime = expiry_millis - now_millis;
            let margin = (lifetime / MARGIN_LIFETIME_DIVISOR)
                .clamp(0, EXPIRY_SAFETY_MARGIN_MILLIS);
            expiry_millis - margin
        }
        None => now_millis + FALLBACK_LIFETIME_MILLIS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct StubSource {
        issued: AtomicUsize,
        expires_in_secs: Option<i64>,
    }

    impl StubSource {
        fn new(expires_in_secs: Option<i64>) -> Arc<Self> {
            Arc::new(Self {
                issued: AtomicUsize::new(0),
                expires_in_secs,
            })
        }

        fn issue_count(&self) -> usize {
            self.issued.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenSource for StubSource {
        async fn issue(&self) -> AuthResult<IssuedToken> {
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(IssuedToken {
                access_token: format!("token-{n}"),
                expires_at: self
                    .expires_in_secs
                    .map(|secs| Utc::now().timestamp() + secs),
            })
        }
    }

    #[derive(Debug)]
    struct FailingSource;

    #[async_trait]
    impl TokenSource for FailingSource {
        async fn issue(&self) -> AuthResult<IssuedToken> {
            Err(AuthError::Endpoint {
                status: 500,
                body: "identity endpoint unavailable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_token_reused_within_expiry_window() {
        let source = StubSource::new(Some(3600));
        let cache = TokenCache::new(source.clone());

        let first = cache.bearer_token().await.unwrap();
        let second = cache.bearer_token().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.issue_count(), 1);
    }

    #[tokio::test]
    async fn test_hour_token_refreshed_five_minutes_early() {
        let source = StubSource::new(Some(3600));
        let cache = TokenCache::new(source.clone());
        cache.bearer_token().await.unwrap();

        // 54 minutes in: still inside the margin-adjusted window
        cache.advance_time(chrono::Duration::minutes(54)).await;
        cache.bearer_token().await.unwrap();
        assert_eq!(source.issue_count(), 1);

        // 56 minutes in: past expiry - 5min, exactly one refetch
        cache.advance_time(chrono::Duration::minutes(2)).await;
        let refreshed = cache.bearer_token().await.unwrap();
        assert_eq!(source.issue_count(), 2);
        assert_eq!(refreshed, "token-2");
    }

    #[tokio::test]
    async fn test_sixty_second_token_lives_about_55_seconds() {
        let source = StubSource::new(Some(60));
        let cache = TokenCache::new(source.clone());
        let first = cache.bearer_token().await.unwrap();

        cache.advance_time(chrono::Duration::seconds(54)).await;
        assert_eq!(cache.bearer_token().await.unwrap(), first);
        assert_eq!(source.issue_count(), 1);

        cache.advance_time(chrono::Duration::seconds(2)).await;
        cache.bearer_token().await.unwrap();
        assert_eq!(source.issue_count(), 2);
    }

    #[tokio::test]
    async fn test_fallback_lifetime_when_expiry_missing() {
        let source = StubSource::new(None);
        let cache = TokenCache::new(source.clone());
        cache.bearer_token().await.unwrap();

        cache.advance_time(chrono::Duration::minutes(54)).await;
        cache.bearer_token().await.unwrap();
        assert_eq!(source.issue_count(), 1);

        cache.advance_time(chrono::Duration::minutes(2)).await;
        cache.bearer_token().await.unwrap();
        assert_eq!(source.issue_count(), 2);
    }

    #[tokio::test]
    async fn test_endpoint_failure_surfaces_auth_error() {
        let cache = TokenCache::new(Arc::new(FailingSource));
        let result = cache.bearer_token().await;
        assert!(matches!(
            result,
            Err(AuthError::Endpoint { status: 500, .. })
        ));
    }

    #[test]
    fn test_cache_expiry_margins() {
        let now = 1_000_000_000_000_i64;

        // Hour-lived token gets the full 5 minute margin
        let hour = cache_expiry_millis(now, Some(now / 1000 + 3600));
        assert_eq!(hour, now + 3600 * 1000 - 5 * 60 * 1000);

        // 60s token gets lifetime/12 = 5s
        let minute = cache_expiry_millis(now, Some(now / 1000 + 60));
        assert_eq!(minute, now + 60 * 1000 - 5 * 1000);

        // Missing expiry falls back to 55 minutes
        let fallback = cache_expiry_millis(now, None);
        assert_eq!(fallback, now + 55 * 60 * 1000);

        // Already-expired server timestamps never extend into the future
        let expired = cache_expiry_millis(now, Some(now / 1000 - 10));
        assert!(expired <= now);
    }
}

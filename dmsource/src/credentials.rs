//! Process-wide cache of catalog access credentials
//!
//! One [`CredentialCache`] per provider holds the live token. A credential
//! with a known expiry is reused while it stays valid for at least the
//! configured margin; a credential with unknown expiry is reused until a
//! call reports it as rejected. Concurrent refreshes are not coalesced:
//! the last writer wins and both tokens are valid.

use crate::error::{Result, SourceError};
use crate::model::Provider;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A cached access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    /// `None` when the provider does not say
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// True when the token stays valid for at least `margin` after `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at > now + margin,
            None => true,
        }
    }
}

/// Something able to mint a fresh credential
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> Result<Credential>;
}

/// Time source, injectable for expiry tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Errors that can tell whether the credential was rejected
pub trait AuthSignal {
    fn is_auth_error(&self) -> bool;
}

impl AuthSignal for SourceError {
    fn is_auth_error(&self) -> bool {
        SourceError::is_auth_error(self)
    }
}

pub struct CredentialCache {
    provider: Provider,
    source: Arc<dyn CredentialSource>,
    clock: Arc<dyn Clock>,
    margin: Duration,
    current: RwLock<Option<Credential>>,
}

impl CredentialCache {
    /// Default reuse margin before a known expiry
    pub const DEFAULT_MARGIN_SECS: i64 = 5;

    pub fn new(provider: Provider, source: Arc<dyn CredentialSource>) -> Self {
        Self::with_clock(provider, source, Arc::new(SystemClock))
    }

    pub fn with_clock(
        provider: Provider,
        source: Arc<dyn CredentialSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            source,
            clock,
            margin: Duration::seconds(Self::DEFAULT_MARGIN_SECS),
            current: RwLock::new(None),
        }
    }

    pub fn with_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Returns a valid token, fetching a new one when needed
    ///
    /// # Errors
    ///
    /// [`SourceError::UpstreamAuth`] if the refresh call fails.
    pub async fn token(&self) -> Result<String> {
        {
            let current = self.current.read().await;
            if let Some(credential) = current.as_ref() {
                if credential.is_valid_at(self.clock.now(), self.margin) {
                    return Ok(credential.token.clone());
                }
                debug!(provider = %self.provider, "Cached credential about to expire");
            }
        }
        self.refresh().await
    }

    /// Fetches a new credential unconditionally and stores it
    pub async fn refresh(&self) -> Result<String> {
        let credential = self.source.fetch().await.map_err(|err| match err {
            SourceError::UpstreamAuth { .. } => err,
            other => SourceError::auth(self.provider, other.to_string()),
        })?;

        info!(
            provider = %self.provider,
            expires_at = ?credential.expires_at,
            "Credential refreshed"
        );
        let token = credential.token.clone();
        *self.current.write().await = Some(credential);
        Ok(token)
    }

    /// Drops the cached credential
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }

    /// Current credential, if any, without refreshing
    pub async fn peek(&self) -> Option<Credential> {
        self.current.read().await.clone()
    }

    /// Runs `op` with a valid token; if the call reports an auth error the
    /// credential is refreshed and `op` is retried exactly once.
    pub async fn authorized<T, E, F, Fut>(&self, op: F) -> std::result::Result<T, E>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: AuthSignal + From<SourceError>,
    {
        let token = self.token().await?;
        match op(token).await {
            Err(err) if err.is_auth_error() => {
                warn!(provider = %self.provider, "Credential rejected, refreshing once");
                self.invalidate().await;
                let token = self.refresh().await?;
                op(token).await
            }
            other => other,
        }
    }
}

//! Bundled email/password identity provider.
//!
//! Credentials live behind a [`CredentialRepository`] as Argon2id PHC
//! strings; sessions are opaque random tokens held in process memory with a
//! fixed lifetime. Every session change is published on a broadcast channel,
//! and a background sweep evicts expired sessions so their expiry is
//! announced without anyone polling the token.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::RngCore;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AuthProvider, AuthProviderError, CredentialRepository, CredentialRepositoryError,
    StoredCredential,
};
use crate::domain::{
    AccessToken, AuthEvent, AuthIdentity, AuthSession, Credentials, DisplayName, UserId,
};

const SALT_BYTES: usize = 16;
const TOKEN_BYTES: usize = 32;
const EVENT_CAPACITY: usize = 64;
const REJECTED: &str = "invalid email or password";

/// How often the background sweep looks for expired sessions.
pub const DEFAULT_SWEEP_PERIOD: std::time::Duration = std::time::Duration::from_secs(60);

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0_u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

fn random_hex(len: usize) -> String {
    hex::encode(random_bytes(len))
}

/// Argon2id PHC string for `password` under a fresh random salt.
fn hash_password(password: &str) -> Result<String, AuthProviderError> {
    let salt = SaltString::encode_b64(&random_bytes(SALT_BYTES))
        .map_err(|err| AuthProviderError::query(err.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthProviderError::query(err.to_string()))
}

/// Constant-time check of `password` against a stored PHC string.
fn verify_password(password: &str, stored: &str) -> Result<bool, AuthProviderError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|err| AuthProviderError::query(format!("stored hash unreadable: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Run Argon2 off the async workers.
async fn blocking<T, F>(password: &str, work: F) -> Result<T, AuthProviderError>
where
    T: Send + 'static,
    F: FnOnce(&str) -> Result<T, AuthProviderError> + Send + 'static,
{
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || work(password.as_str()))
        .await
        .map_err(|err| AuthProviderError::query(format!("password hashing aborted: {err}")))?
}

fn map_repository_error(error: CredentialRepositoryError) -> AuthProviderError {
    match error {
        CredentialRepositoryError::Connection { message } => {
            AuthProviderError::connection(message)
        }
        CredentialRepositoryError::Query { message } => AuthProviderError::query(message),
        CredentialRepositoryError::DuplicateEmail { email } => {
            AuthProviderError::email_taken(email)
        }
    }
}

/// Password identity provider with in-process sessions.
pub struct PasswordAuthProvider<C> {
    credentials: Arc<C>,
    sessions: RwLock<HashMap<String, AuthSession>>,
    ttl: Duration,
    events: broadcast::Sender<AuthEvent>,
}

impl<C> PasswordAuthProvider<C> {
    /// Issue sessions that expire `ttl` after sign-in.
    pub fn new(credentials: Arc<C>, ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            credentials,
            sessions: RwLock::new(HashMap::new()),
            ttl,
            events,
        }
    }

    fn publish(&self, event: AuthEvent) {
        if self.events.send(event).is_err() {
            debug!("auth event dropped: no subscribers");
        }
    }

    async fn open_session(&self, credential: &StoredCredential) -> AuthSession {
        let session = AuthSession {
            token: AccessToken::new(random_hex(TOKEN_BYTES)),
            identity: AuthIdentity {
                user_id: credential.user_id,
                email: credential.email.clone(),
                metadata_name: credential.display_name.clone(),
            },
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions
            .write()
            .await
            .insert(session.token.as_ref().to_owned(), session.clone());
        self.publish(AuthEvent::SignedIn {
            user_id: credential.user_id,
        });
        session
    }

    /// Evict every expired session and announce each as
    /// [`AuthEvent::SessionExpired`]. Returns how many were evicted.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<AuthSession> = {
            let mut sessions = self.sessions.write().await;
            let tokens: Vec<String> = sessions
                .iter()
                .filter(|(_, session)| session.expires_at <= now)
                .map(|(token, _)| token.clone())
                .collect();
            tokens
                .iter()
                .filter_map(|token| sessions.remove(token))
                .collect()
        };
        for session in &expired {
            self.publish(AuthEvent::SessionExpired {
                user_id: session.identity.user_id,
            });
        }
        if !expired.is_empty() {
            debug!(evicted = expired.len(), "expired sessions swept");
        }
        expired.len()
    }

    /// Sweep expired sessions every `period` until the provider is dropped.
    pub fn spawn_expiry_sweep(self: &Arc<Self>, period: std::time::Duration) -> JoinHandle<()>
    where
        C: Send + Sync + 'static,
    {
        let provider: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            loop {
                ticks.tick().await;
                let Some(provider) = provider.upgrade() else {
                    debug!("identity provider dropped; stopping session sweep");
                    break;
                };
                provider.sweep_expired().await;
            }
        })
    }
}

#[async_trait]
impl<C> AuthProvider for PasswordAuthProvider<C>
where
    C: CredentialRepository,
{
    async fn sign_up(
        &self,
        credentials: &Credentials,
        name: Option<DisplayName>,
    ) -> Result<AuthSession, AuthProviderError> {
        let email = credentials.email();
        if self
            .credentials
            .find_by_email(email)
            .await
            .map_err(map_repository_error)?
            .is_some()
        {
            return Err(AuthProviderError::email_taken(email.to_string()));
        }
        let password_hash = blocking(credentials.password(), hash_password).await?;
        let credential = StoredCredential {
            user_id: UserId::random(),
            email: email.clone(),
            password_hash,
            display_name: name,
            created_at: Utc::now(),
        };
        self.credentials
            .insert(&credential)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %credential.user_id, "credential registered");
        Ok(self.open_session(&credential).await)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthProviderError> {
        let Some(stored) = self
            .credentials
            .find_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?
        else {
            debug!("sign-in for unknown email");
            return Err(AuthProviderError::rejected(REJECTED));
        };
        let stored_hash = stored.password_hash.clone();
        let matches = blocking(credentials.password(), move |password| {
            verify_password(password, &stored_hash)
        })
        .await
        .inspect_err(|err| warn!(user_id = %stored.user_id, error = %err, "password check failed"))?;
        if !matches {
            debug!(user_id = %stored.user_id, "sign-in with wrong password");
            return Err(AuthProviderError::rejected(REJECTED));
        }
        Ok(self.open_session(&stored).await)
    }

    async fn session(&self, token: &AccessToken) -> Result<Option<AuthSession>, AuthProviderError> {
        let found = self.sessions.read().await.get(token.as_ref()).cloned();
        match found {
            Some(session) if session.expires_at <= Utc::now() => {
                self.sessions.write().await.remove(token.as_ref());
                self.publish(AuthEvent::SessionExpired {
                    user_id: session.identity.user_id,
                });
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthProviderError> {
        if let Some(session) = self.sessions.write().await.remove(token.as_ref()) {
            self.publish(AuthEvent::SignedOut {
                user_id: session.identity.user_id,
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

//! Identity gate: institutional email check in front of the identity
//! provider, plus lazy profile creation.
//!
//! Registration creates the credential first and the profile second. If the
//! profile insert fails the credential stays behind and the error is
//! returned; the next successful login fills the gap.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::domain::ports::{AuthProvider, IdentityGate, SignedIn, UserRepository};
use crate::domain::{
    AccessToken, AuthEvent, AuthIdentity, AuthSession, Credentials, CurrentUser, DisplayName,
    EmailDomainPolicy, Error, User,
};

/// [`IdentityGate`] backed by an [`AuthProvider`] and a profile store.
#[derive(Clone)]
pub struct IdentityGateService<A, U> {
    auth: Arc<A>,
    users: Arc<U>,
    policy: EmailDomainPolicy,
}

impl<A, U> IdentityGateService<A, U> {
    /// Create a gate enforcing `policy`.
    pub fn new(auth: Arc<A>, users: Arc<U>, policy: EmailDomainPolicy) -> Self {
        Self {
            auth,
            users,
            policy,
        }
    }
}

impl<A, U> IdentityGateService<A, U>
where
    A: AuthProvider,
    U: UserRepository,
{
    /// Load the profile for `identity`, inserting one when missing.
    async fn ensure_profile(&self, identity: &AuthIdentity) -> Result<User, Error> {
        if let Some(user) = self.users.find_by_id(&identity.user_id).await? {
            return Ok(user);
        }

        let name = DisplayName::or_email_local_part(
            identity.metadata_name.as_ref().map(|name| name.as_ref()),
            &identity.email,
        );
        let user = User::new(identity.user_id, identity.email.clone(), name);
        if self.users.insert_if_absent(&user).await? {
            info!(user_id = %user.id(), "profile created");
            return Ok(user);
        }

        // Another request created it first.
        self.users
            .find_by_id(&identity.user_id)
            .await?
            .ok_or_else(|| Error::internal("profile vanished after concurrent insert"))
    }

    async fn signed_in(&self, session: AuthSession) -> Result<SignedIn, Error> {
        let user = self.ensure_profile(&session.identity).await?;
        Ok(SignedIn { session, user })
    }
}

#[async_trait]
impl<A, U> IdentityGate for IdentityGateService<A, U>
where
    A: AuthProvider,
    U: UserRepository,
{
    async fn register(
        &self,
        credentials: &Credentials,
        name: DisplayName,
    ) -> Result<SignedIn, Error> {
        self.policy.check(credentials.email())?;
        let session = self.auth.sign_up(credentials, Some(name)).await?;
        info!(user_id = %session.identity.user_id, "credential created");
        self.signed_in(session).await.inspect_err(|err| {
            warn!(
                error = %err,
                "credential created but profile could not be stored"
            );
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<SignedIn, Error> {
        self.policy.check(credentials.email())?;
        let session = self.auth.sign_in(credentials).await?;
        self.signed_in(session).await
    }

    async fn logout(&self, token: &AccessToken) {
        if let Err(err) = self.auth.sign_out(token).await {
            warn!(error = %err, "sign-out failed; local session dropped anyway");
        }
    }

    async fn current_user(&self, token: &AccessToken) -> Result<Option<CurrentUser>, Error> {
        let session = self.auth.session(token).await?;
        Ok(session.as_ref().map(AuthSession::current_user))
    }

    async fn session(&self, token: &AccessToken) -> Result<Option<SignedIn>, Error> {
        match self.auth.session(token).await? {
            Some(session) => self.signed_in(session).await.map(Some),
            None => Ok(None),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth.subscribe()
    }
}

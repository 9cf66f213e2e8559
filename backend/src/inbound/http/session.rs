//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie session stores only the provider's access token. Every
//! authenticated request re-resolves the token through the
//! [`IdentityGate`], so a session that expired or was signed out elsewhere
//! stops working immediately.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::ports::IdentityGate;
use crate::domain::{AccessToken, CurrentUser, Error};
use crate::inbound::http::state::HttpState;

pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the access token in the session cookie.
    pub fn persist_token(&self, token: &AccessToken) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(ACCESS_TOKEN_KEY, token.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the stored access token, if any.
    pub fn token(&self) -> Result<Option<AccessToken>, Error> {
        self.0
            .get::<String>(ACCESS_TOKEN_KEY)
            .map(|raw| raw.map(AccessToken::new))
            .map_err(|error| {
                warn!(%error, "unreadable session cookie");
                Error::internal(format!("failed to read session: {error}"))
            })
    }

    /// Drop everything stored in the session cookie.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Resolve the caller or fail with `401 Unauthorized`.
    ///
    /// A token the provider no longer honours is removed from the cookie.
    pub async fn require_user(&self, identity: &dyn IdentityGate) -> Result<CurrentUser, Error> {
        let token = self
            .token()?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        match identity.current_user(&token).await? {
            Some(user) => Ok(user),
            None => {
                debug!("stale access token dropped from session");
                self.clear();
                Err(Error::unauthorized("session expired; log in again"))
            }
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// The authenticated caller, extracted from the session cookie.
///
/// Handlers taking a `Viewer` argument reject anonymous requests with `401`.
#[derive(Debug, Clone)]
pub struct Viewer(pub CurrentUser);

impl FromRequest for Viewer {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let session = SessionContext::new(session.await?);
            let state = state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let user = session.require_user(state.identity.as_ref()).await?;
            Ok(Self(user))
        })
    }
}

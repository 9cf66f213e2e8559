//! Builders wiring domain services onto a concrete store.

use std::sync::Arc;

use actix_web::web;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use vote_backend::domain::ports::{
    CredentialRepository, IdentityGate, ProjectRepository, UserRepository, VoteRepository,
};
use vote_backend::domain::{
    BallotEngineService, DashboardService, IdentityGateService, ProjectRegistryService,
    SequentialBallotWriter,
};
use vote_backend::inbound::http::state::HttpState;
use vote_backend::outbound::auth::{DEFAULT_SWEEP_PERIOD, PasswordAuthProvider};
use vote_backend::outbound::memory::InMemoryStore;
use vote_backend::outbound::persistence::{
    DbPool, DieselCredentialRepository, DieselProjectRepository, DieselUserRepository,
    DieselVoteRepository,
};

use super::ServerConfig;

/// Store adapters the services are built on.
struct Stores<C, U, P, V> {
    credentials: Arc<C>,
    users: Arc<U>,
    projects: Arc<P>,
    votes: Arc<V>,
}

fn postgres_stores(
    pool: &DbPool,
) -> Stores<DieselCredentialRepository, DieselUserRepository, DieselProjectRepository, DieselVoteRepository>
{
    Stores {
        credentials: Arc::new(DieselCredentialRepository::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        projects: Arc::new(DieselProjectRepository::new(pool.clone())),
        votes: Arc::new(DieselVoteRepository::new(pool.clone())),
    }
}

fn memory_stores(
    retries: u32,
) -> Stores<InMemoryStore, InMemoryStore, InMemoryStore, SequentialBallotWriter<InMemoryStore>> {
    let store = Arc::new(InMemoryStore::new());
    Stores {
        credentials: store.clone(),
        users: store.clone(),
        projects: store.clone(),
        votes: Arc::new(SequentialBallotWriter::new(store, retries)),
    }
}

fn wire<C, U, P, V>(config: &ServerConfig, stores: Stores<C, U, P, V>) -> HttpState
where
    C: CredentialRepository + 'static,
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    V: VoteRepository + 'static,
{
    let Stores {
        credentials,
        users,
        projects,
        votes,
    } = stores;
    let auth = Arc::new(PasswordAuthProvider::new(credentials, config.session.ttl));
    // Detached; the sweep stops once the provider is dropped.
    drop(auth.spawn_expiry_sweep(DEFAULT_SWEEP_PERIOD));
    HttpState::new(
        Arc::new(IdentityGateService::new(
            auth,
            users,
            config.email_policy.clone(),
        )),
        Arc::new(ProjectRegistryService::new(projects.clone(), votes.clone())),
        Arc::new(BallotEngineService::new(projects.clone(), votes.clone())),
        Arc::new(DashboardService::new(
            projects,
            votes,
            config.total_eligible_voters,
        )),
    )
}

/// Build handler state on PostgreSQL when a pool is configured, otherwise on
/// a fresh in-memory store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => wire(config, postgres_stores(pool)),
        None => {
            warn!("no database configured; using in-memory store");
            wire(config, memory_stores(config.ballot_write_retries))
        }
    };
    web::Data::new(state)
}

/// Log every authentication event until the provider goes away.
pub(super) fn spawn_auth_event_logger(identity: &Arc<dyn IdentityGate>) {
    let mut events = identity.subscribe();
    actix_web::rt::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(user_id = %event.user_id(), ?event, "auth state changed"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "auth event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

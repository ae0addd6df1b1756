//! Builders wiring domain services to their port adapters.
//!
//! With `DATABASE_URL` set the state is backed by Diesel adapters over a
//! shared connection pool; without it everything runs on the in-memory
//! repositories, which is enough for local frontend work and smoke tests.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use backend::domain::activator::Activator;
use backend::domain::auth::{AuthService, RegistrationService};
use backend::domain::catalogue::CatalogueService;
use backend::domain::character::CharacterService;
use backend::domain::checkpoint::{ActivationCheckpoint, Pool};
use backend::domain::ports::{
    ActivationRepository, CatalogueQuery, Mailer, RoleRepository, Transactor, UserRepository,
};
use backend::domain::purchasing::ReplenishmentCreator;
use backend::domain::roles::RoleService;
use backend::inbound::http::state::HttpState;
use backend::outbound::assets::FsAssetStorage;
use backend::outbound::events::BroadcastDispatcher;
use backend::outbound::mail::{HttpMailer, TracingMailer};
use backend::outbound::memory::{
    InMemoryActivationRepository, InMemoryCatalogueQuery, InMemoryRoleRepository,
    InMemoryTransactor, InMemoryUserRepository,
};
use backend::outbound::persistence::{
    DbPool, DieselActivationRepository, DieselCatalogueQuery, DieselRoleRepository,
    DieselTransactor, DieselUserRepository, PoolConfig, run_migrations,
};

use super::config::ServerConfig;

/// Port bundle the service wiring is built from.
struct Ports {
    users: Arc<dyn UserRepository>,
    activations: Arc<dyn ActivationRepository>,
    roles: Arc<dyn RoleRepository>,
    catalogue: Arc<dyn CatalogueQuery>,
    transactor: Arc<dyn Transactor>,
}

async fn diesel_ports(database_url: &str) -> std::io::Result<Ports> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || run_migrations(&url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(std::io::Error::other)?;
    info!("connected to Postgres, migrations applied");

    Ok(Ports {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        activations: Arc::new(DieselActivationRepository::new(pool.clone())),
        roles: Arc::new(DieselRoleRepository::new(pool.clone())),
        catalogue: Arc::new(DieselCatalogueQuery::new(pool.clone())),
        transactor: Arc::new(DieselTransactor::new(pool)),
    })
}

fn memory_ports() -> Ports {
    let users = Arc::new(InMemoryUserRepository::new());
    Ports {
        users: users.clone(),
        activations: Arc::new(InMemoryActivationRepository::new()),
        roles: Arc::new(InMemoryRoleRepository::new()),
        catalogue: Arc::new(InMemoryCatalogueQuery::new(Vec::new())),
        transactor: Arc::new(InMemoryTransactor::new(users)),
    }
}

/// Build the handler state described by the configuration.
pub async fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let ports = match &config.database_url {
        Some(url) => diesel_ports(url).await?,
        None => memory_ports(),
    };

    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail) => Arc::new(HttpMailer::new(reqwest::Client::new(), mail.clone())),
        None => Arc::new(TracingMailer),
    };
    let events = Arc::new(BroadcastDispatcher::new(64));
    let clock = Arc::new(DefaultClock);
    let storage = Arc::new(FsAssetStorage::new(config.asset_root.clone()));

    let activator = Activator::new(
        ports.users.clone(),
        ports.activations,
        clock.clone(),
        config.activation_ttl,
    );
    let checkpoints = Pool::new(vec![Arc::new(ActivationCheckpoint)]);

    Ok(HttpState {
        auth: AuthService::new(ports.users.clone(), activator.clone(), checkpoints),
        registration: RegistrationService::new(ports.users.clone(), activator.clone(), mailer),
        activator,
        roles: RoleService::new(ports.roles),
        catalogue: CatalogueService::new(ports.catalogue),
        character: CharacterService::new(ports.users, storage),
        replenishment: ReplenishmentCreator::new(ports.transactor, events, clock),
        app_url: config.app_url.clone(),
    })
}

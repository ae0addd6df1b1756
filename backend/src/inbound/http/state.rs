//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`. It bundles the domain
//! services, each already wired to its port adapters, so handlers stay free
//! of infrastructure concerns.

use crate::domain::activator::Activator;
use crate::domain::auth::{AuthService, RegistrationService};
use crate::domain::catalogue::CatalogueService;
use crate::domain::character::CharacterService;
use crate::domain::purchasing::ReplenishmentCreator;
use crate::domain::roles::RoleService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService,
    pub registration: RegistrationService,
    pub activator: Activator,
    pub roles: RoleService,
    pub catalogue: CatalogueService,
    pub character: CharacterService,
    pub replenishment: ReplenishmentCreator,
    /// Public base URL activation completion redirects to.
    pub app_url: String,
}

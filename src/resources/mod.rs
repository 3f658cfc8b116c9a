//! The portal's list screens, each a [`CrudListController`] over one REST
//! collection.

pub mod maintenance;
pub mod visitor;

use crate::connection::{
    CollectionBackend, Endpoints, GateDecision, HttpCollection, ListScope, PortalConfig, Role,
    Session, SessionGate, UpdateShape,
};
use crate::controller::CrudListController;
use crate::core::{PortalError, Result};
use crate::schema::ResourceSchema;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    ResidentMaintenance,
    AdminMaintenance,
    Visitors,
}

impl Screen {
    pub const ALL: [Screen; 3] = [
        Screen::ResidentMaintenance,
        Screen::AdminMaintenance,
        Screen::Visitors,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::ResidentMaintenance => "Maintenance Requests",
            Screen::AdminMaintenance => "Maintenance Requests (admin)",
            Screen::Visitors => "Visitors List",
        }
    }

    pub fn required_role(&self) -> Role {
        match self {
            Screen::ResidentMaintenance | Screen::Visitors => Role::Resident,
            Screen::AdminMaintenance => Role::Admin,
        }
    }

    pub fn schema(&self) -> ResourceSchema {
        match self {
            Screen::ResidentMaintenance => maintenance::resident_schema(),
            Screen::AdminMaintenance => maintenance::admin_schema(),
            Screen::Visitors => visitor::schema(),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        match self {
            Screen::ResidentMaintenance | Screen::AdminMaintenance => maintenance::endpoints(),
            Screen::Visitors => visitor::endpoints(),
        }
    }

    pub fn update_shape(&self) -> UpdateShape {
        match self {
            Screen::AdminMaintenance => maintenance::update_shape(),
            Screen::ResidentMaintenance | Screen::Visitors => UpdateShape::default(),
        }
    }

    /// Admins see the whole collection; residents only their own rows.
    pub fn scope(&self, session: &Session) -> ListScope {
        match self {
            Screen::AdminMaintenance => ListScope::All,
            Screen::ResidentMaintenance | Screen::Visitors => {
                ListScope::Owner(session.user_id().to_string())
            }
        }
    }

    pub fn service_url<'a>(&self, config: &'a PortalConfig) -> &'a str {
        match self {
            Screen::ResidentMaintenance | Screen::AdminMaintenance => {
                &config.maintenance_service_url
            }
            Screen::Visitors => &config.visitor_service_url,
        }
    }

    /// Field an update overwrites, `None` on screens without inline editing.
    pub fn update_field(&self) -> Option<&'static str> {
        match self {
            Screen::AdminMaintenance => Some(maintenance::STATUS_FIELD),
            Screen::ResidentMaintenance | Screen::Visitors => None,
        }
    }

    /// Residents own their rows; the admin screen only moves status along.
    pub fn allows_create(&self) -> bool {
        !matches!(self, Screen::AdminMaintenance)
    }

    pub fn allows_delete(&self) -> bool {
        !matches!(self, Screen::AdminMaintenance)
    }

    pub fn gate(&self) -> SessionGate {
        SessionGate::new(self.required_role())
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::ResidentMaintenance => "maintenance",
            Screen::AdminMaintenance => "admin-maintenance",
            Screen::Visitors => "visitors",
        };
        f.write_str(name)
    }
}

impl FromStr for Screen {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.to_string() == s)
            .ok_or_else(|| PortalError::Config(format!("unknown screen '{}'", s)))
    }
}

/// Runs the screen's session gate.
///
/// A redirect yields [`PortalError::Unauthorized`] naming the route.
pub fn admit(screen: Screen, session: Option<&Session>) -> Result<Session> {
    match screen.gate().check(session) {
        GateDecision::Allow(session) => Ok(session),
        GateDecision::Redirect(route) => {
            warn!(screen = %screen, route, "session gate redirected");
            Err(PortalError::Unauthorized(format!("redirect to {}", route)))
        }
    }
}

/// Builds a screen's controller over `backend` once the gate lets it in.
pub fn mount<B: CollectionBackend>(
    screen: Screen,
    backend: B,
    session: Option<&Session>,
) -> Result<CrudListController<B>> {
    let session = admit(screen, session)?;
    let scope = screen.scope(&session);
    info!(screen = %screen, user = session.user_id(), "screen mounted");
    Ok(CrudListController::new(screen.schema(), backend, session, scope))
}

/// Opens a screen against its configured HTTP service.
///
/// The gate runs before the client is built or anything is fetched.
pub fn open_screen(
    config: &PortalConfig,
    screen: Screen,
    session: Option<&Session>,
) -> Result<CrudListController<HttpCollection>> {
    let session = admit(screen, session)?;
    let backend = HttpCollection::new(screen.service_url(config), config.request_timeout)?
        .with_endpoints(screen.endpoints())
        .with_update_shape(screen.update_shape());
    mount(screen, backend, Some(&session))
}

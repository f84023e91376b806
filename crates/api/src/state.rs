use std::sync::Arc;

use staffpurchase_db::{ProductStore, PurchaseRequestStore, StaffStore};
use staffpurchase_events::{EventBus, ReminderScheduler};

use crate::auth::identity::IdentityVerifier;
use crate::config::ServerConfig;
use crate::engine::admission::StaffAdmission;
use crate::engine::lifecycle::RequestLifecycle;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every backend handle sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub requests: Arc<dyn PurchaseRequestStore>,
    pub products: Arc<dyn ProductStore>,
    pub staff: Arc<dyn StaffStore>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub config: Arc<ServerConfig>,
    /// Workflow events are published here after each committed write.
    pub event_bus: Arc<EventBus>,
    pub reminders: Arc<ReminderScheduler>,
}

impl AppState {
    pub fn lifecycle(&self) -> RequestLifecycle<'_> {
        RequestLifecycle::new(self.requests.as_ref(), &self.event_bus)
    }

    pub fn admission(&self) -> StaffAdmission<'_> {
        StaffAdmission::new(self.staff.as_ref(), &self.event_bus)
    }
}

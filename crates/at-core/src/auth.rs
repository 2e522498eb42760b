//! Authorization gate for the attendance views.
//!
//! Requests are resolved to an optional [`Principal`] once, at the boundary.
//! Each view then asks [`authorize`] for the [`Capability`] it needs and gets
//! back either the principal or a [`Denial`] describing where to send the
//! caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{EmployeeId, Role};

/// The authenticated employee behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub employee_id: EmployeeId,
    pub name: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// What a view requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The employee dashboard. Admins are sent to their own landing view.
    ViewDashboard,
    /// Recording a punch for oneself.
    RecordPunch,
    /// Reading one's own attendance log.
    ViewOwnLogs,
    /// Listing every employee.
    ViewAllEmployees,
    /// Reading another employee's attendance log.
    ViewEmployeeLogs,
}

impl Capability {
    /// Whether only admins hold this capability.
    #[must_use]
    pub const fn admin_only(&self) -> bool {
        matches!(self, Self::ViewAllEmployees | Self::ViewEmployeeLogs)
    }
}

/// Why a request was not allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    /// No session was presented, or it did not resolve to an employee.
    #[error("not signed in")]
    NotSignedIn,
    /// The caller is signed in but belongs on a different view.
    #[error("redirect to {0}")]
    WrongLanding(&'static str),
    /// The caller is signed in but lacks the role.
    #[error("forbidden")]
    Forbidden,
}

/// Checks `principal` against `capability`.
pub fn authorize(
    principal: Option<&Principal>,
    capability: Capability,
) -> Result<&Principal, Denial> {
    let principal = principal.ok_or(Denial::NotSignedIn)?;

    if capability == Capability::ViewDashboard && principal.role != Role::Employee {
        return Err(Denial::WrongLanding(principal.role.landing_path()));
    }
    if capability.admin_only() && !principal.is_admin() {
        return Err(Denial::Forbidden);
    }
    Ok(principal)
}

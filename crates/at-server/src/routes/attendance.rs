//! Employee views: dashboard, punching and the own attendance log.

use at_core::{ActionType, Capability, CurrentStatus, EmployeeId};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::AppState;
use crate::session::Session;
use crate::views::{AttendanceLog, DashboardView};

#[derive(Debug, Deserialize)]
pub struct PunchRequest {
    pub action_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PunchResponse {
    pub message: String,
}

/// Optional `since`/`until` bounds (RFC 3339) for log views.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<DashboardView>, ApiError> {
    let principal = session.require(Capability::ViewDashboard)?;
    let status = current_status_of(&state, principal.employee_id)?;
    Ok(Json(DashboardView {
        name: principal.name.clone(),
        status,
    }))
}

/// POST /attendance: record a punch timestamped at receipt.
pub async fn record(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<PunchRequest>, JsonRejection>,
) -> Result<Json<PunchResponse>, ApiError> {
    let principal = session.require(Capability::RecordPunch)?;
    let Json(request) = body?;
    let action: ActionType = request
        .action_type
        .parse()
        .map_err(|err: at_core::UnknownAction| ApiError::BadRequest(err.to_string()))?;

    state
        .db()?
        .record_punch(principal.employee_id, action, Utc::now())?;
    tracing::info!(employee_id = %principal.employee_id, %action, "punch recorded");
    Ok(Json(PunchResponse {
        message: format!("{action} marked!"),
    }))
}

/// GET /attendance: the caller's own punches and summary.
pub async fn own_log(
    State(state): State<AppState>,
    session: Session,
    range: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<AttendanceLog>, ApiError> {
    let principal = session.require(Capability::ViewOwnLogs)?;
    let Query(range) = range?;
    let records =
        state
            .db()?
            .list_punches_between(principal.employee_id, range.since, range.until)?;
    let status = current_status_of(&state, principal.employee_id)?;
    Ok(Json(AttendanceLog::new(principal.name.clone(), records, status)))
}

/// Status from the employee's latest punch, regardless of any log window.
pub(crate) fn current_status_of(
    state: &AppState,
    employee_id: EmployeeId,
) -> Result<CurrentStatus, ApiError> {
    let last = state.db()?.last_punch(employee_id)?;
    Ok(CurrentStatus::from_last(last.as_ref()))
}

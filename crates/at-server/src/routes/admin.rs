//! Admin views.

use at_core::{Capability, Employee, EmployeeId};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::error::ApiError;
use crate::routes::attendance::{RangeParams, current_status_of};
use crate::server::AppState;
use crate::session::Session;
use crate::views::AttendanceLog;

/// GET /admin/users
pub async fn users(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Employee>>, ApiError> {
    session.require(Capability::ViewAllEmployees)?;
    Ok(Json(state.db()?.list_employees()?))
}

/// GET /admin/logs/{employee_id}
pub async fn employee_log(
    State(state): State<AppState>,
    session: Session,
    employee_id: Result<Path<i64>, PathRejection>,
    range: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<AttendanceLog>, ApiError> {
    session.require(Capability::ViewEmployeeLogs)?;
    let Path(employee_id) = employee_id?;
    let Query(range) = range?;
    let employee_id = EmployeeId::new(employee_id);
    let (employee, records) = {
        let db = state.db()?;
        let employee = db
            .get_employee(employee_id)?
            .ok_or_else(|| ApiError::NotFound(format!("employee {employee_id}")))?;
        let records = db.list_punches_between(employee.id, range.since, range.until)?;
        (employee, records)
    };
    let status = current_status_of(&state, employee.id)?;
    Ok(Json(AttendanceLog::new(employee.name, records, status)))
}

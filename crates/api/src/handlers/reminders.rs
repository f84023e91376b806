//! On-demand reminder sweep.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// POST /api/admin/reminders/run
///
/// Run the daily sweep now and return its report. Requests already
/// reminded today are skipped as usual.
pub async fn run_reminders(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    tracing::info!(admin = %admin.uid, "Manual reminder sweep requested");
    let report = state.reminders.sweep(Utc::now()).await?;
    Ok(Json(report))
}

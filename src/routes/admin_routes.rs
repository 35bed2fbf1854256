// src/routes/admin_routes.rs

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{
        auth_context::AuthContext,
        validated::{ValidPath, ValidQuery},
    },
    models::{ApiOk, AppState, ApprovalStatus, Role},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/doctors", get(list_doctors))
        .route("/admin/doctors/{doctor_id}/approve", post(approve_doctor))
        .route("/admin/doctors/{doctor_id}/deny", post(deny_doctor))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// pending | approved | denied; defaults to pending.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DoctorAccountRow {
    pub doctor_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub specialization: String,
    pub clinic_id: Option<Uuid>,
    pub approval_status: ApprovalStatus,
    pub decided_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub async fn list_doctors(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidQuery(q): ValidQuery<StatusQuery>,
) -> Result<Json<ApiOk<Vec<DoctorAccountRow>>>, ApiError> {
    auth.require(Role::Admin)?;

    let status = match q.status.as_deref() {
        None => ApprovalStatus::Pending,
        Some(raw) => ApprovalStatus::parse(raw).ok_or_else(|| {
            ApiError::BadRequest(
                "VALIDATION_ERROR",
                "status must be pending, approved or denied".into(),
            )
        })?,
    };

    let rows: Vec<DoctorAccountRow> = sqlx::query_as::<_, DoctorAccountRow>(
        r#"
        SELECT d.doctor_id,
               u.display_name AS full_name,
               u.email,
               d.specialization,
               d.clinic_id,
               d.approval_status,
               d.decided_at
        FROM doctor d
        JOIN app_user u ON u.user_id = d.doctor_id
        WHERE d.approval_status = $1
        ORDER BY u.created_at ASC
        "#,
    )
    .bind(status)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiOk { data: rows }))
}

async fn set_approval(
    state: &AppState,
    doctor_id: Uuid,
    status: ApprovalStatus,
) -> Result<DoctorAccountRow, ApiError> {
    let row: DoctorAccountRow = sqlx::query_as::<_, DoctorAccountRow>(
        r#"
        WITH updated AS (
            UPDATE doctor
            SET approval_status = $2,
                decided_at = now()
            WHERE doctor_id = $1
            RETURNING doctor_id, specialization, clinic_id, approval_status, decided_at
        )
        SELECT up.doctor_id,
               u.display_name AS full_name,
               u.email,
               up.specialization,
               up.clinic_id,
               up.approval_status,
               up.decided_at
        FROM updated up
        JOIN app_user u ON u.user_id = up.doctor_id
        "#,
    )
    .bind(doctor_id)
    .bind(status)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "doctor not found".into()))?;

    tracing::info!(%doctor_id, status = ?status, "doctor approval decided");
    Ok(row)
}

pub async fn approve_doctor(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidPath(doctor_id): ValidPath<Uuid>,
) -> Result<Json<ApiOk<DoctorAccountRow>>, ApiError> {
    auth.require(Role::Admin)?;
    let row = set_approval(&state, doctor_id, ApprovalStatus::Approved).await?;
    Ok(Json(ApiOk { data: row }))
}

/// Denying does not touch existing appointments; it only stops new bookings.
pub async fn deny_doctor(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidPath(doctor_id): ValidPath<Uuid>,
) -> Result<Json<ApiOk<DoctorAccountRow>>, ApiError> {
    auth.require(Role::Admin)?;
    let row = set_approval(&state, doctor_id, ApprovalStatus::Denied).await?;
    Ok(Json(ApiOk { data: row }))
}

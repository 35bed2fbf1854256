// src/routes/clinic_routes.rs

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{auth_context::AuthContext, validated::ValidPath},
    models::{ApiOk, AppState, ApprovalStatus, ClinicRow, Role, UNKNOWN},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clinics", get(list_clinics).post(create_clinic))
        .route("/clinics/{clinic_id}", get(get_clinic))
        .route("/specializations", get(list_specializations))
        .route("/specialty/{specialization}", get(doctors_by_specialty))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DoctorListItem {
    pub doctor_id: Uuid,
    pub full_name: String,
    pub specialization: String,
    pub clinic_id: Option<Uuid>,
    pub clinic_name: Option<String>,
    pub clinic_address: Option<String>,
}

impl DoctorListItem {
    /// Doctors without a (still existing) clinic render as "Unknown".
    fn with_clinic_fallback(mut self) -> Self {
        self.clinic_name.get_or_insert_with(|| UNKNOWN.to_string());
        self.clinic_address.get_or_insert_with(|| UNKNOWN.to_string());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct SpecialtyData {
    pub specialization: String,
    pub doctors: Vec<DoctorListItem>,
}

pub async fn list_clinics(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<ClinicRow>>>, ApiError> {
    let rows: Vec<ClinicRow> = sqlx::query_as::<_, ClinicRow>(
        r#"
        SELECT clinic_id, name, address
        FROM clinic
        ORDER BY name ASC
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiOk { data: rows }))
}

pub async fn get_clinic(
    State(state): State<AppState>,
    ValidPath(clinic_id): ValidPath<Uuid>,
) -> Result<Json<ApiOk<ClinicRow>>, ApiError> {
    let row = fetch_clinic(&state, clinic_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "clinic not found".into()))?;

    Ok(Json(ApiOk { data: row }))
}

pub(crate) async fn fetch_clinic(
    state: &AppState,
    clinic_id: Uuid,
) -> Result<Option<ClinicRow>, ApiError> {
    sqlx::query_as::<_, ClinicRow>(
        r#"
        SELECT clinic_id, name, address
        FROM clinic
        WHERE clinic_id = $1
        "#,
    )
    .bind(clinic_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)
}

#[derive(Debug, Deserialize)]
pub struct CreateClinicRequest {
    pub name: String,
    pub address: Option<String>,
}

pub async fn create_clinic(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateClinicRequest>,
) -> Result<Json<ApiOk<ClinicRow>>, ApiError> {
    auth.require(Role::Admin)?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("VALIDATION_ERROR", "name is required".into()));
    }
    if name.len() > 128 {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "name is too long (max 128)".into(),
        ));
    }

    let row: ClinicRow = sqlx::query_as::<_, ClinicRow>(
        r#"
        INSERT INTO clinic (name, address)
        VALUES ($1, $2)
        RETURNING clinic_id, name, address
        "#,
    )
    .bind(name)
    .bind(req.address.as_deref().map(str::trim).unwrap_or(""))
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::db)?;

    tracing::info!(clinic_id = %row.clinic_id, "clinic created");
    Ok(Json(ApiOk { data: row }))
}

pub async fn list_specializations(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<String>>>, ApiError> {
    let rows: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT initcap(d.specialization)
        FROM doctor d
        WHERE d.approval_status = $1
        ORDER BY 1
        "#,
    )
    .bind(ApprovalStatus::Approved)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiOk { data: rows }))
}

/// Page heading form of a specialization path segment: "cardiology" -> "Cardiology".
pub(crate) fn display_specialization(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Approved doctors of one specialization, with their clinic.
pub async fn doctors_by_specialty(
    State(state): State<AppState>,
    ValidPath(specialization): ValidPath<String>,
) -> Result<Json<ApiOk<SpecialtyData>>, ApiError> {
    let rows: Vec<DoctorListItem> = sqlx::query_as::<_, DoctorListItem>(
        r#"
        SELECT d.doctor_id,
               u.display_name AS full_name,
               d.specialization,
               d.clinic_id,
               c.name    AS clinic_name,
               c.address AS clinic_address
        FROM doctor d
        JOIN app_user u ON u.user_id = d.doctor_id
        LEFT JOIN clinic c ON c.clinic_id = d.clinic_id
        WHERE lower(d.specialization) = lower($1)
          AND d.approval_status = $2
          AND u.is_active = true
        ORDER BY u.display_name ASC
        "#,
    )
    .bind(specialization.trim())
    .bind(ApprovalStatus::Approved)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiOk {
        data: SpecialtyData {
            specialization: display_specialization(&specialization),
            doctors: rows.into_iter().map(DoctorListItem::with_clinic_fallback).collect(),
        },
    }))
}

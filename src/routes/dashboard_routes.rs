// src/routes/dashboard_routes.rs

use std::collections::HashMap;

use axum::{extract::State, routing::get, Json, Router};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    booking::Reservation,
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, Role, UNKNOWN},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patient/dashboard", get(patient_dashboard))
        .route("/doctor/dashboard", get(doctor_dashboard))
}

/// One appointment with the names a dashboard row shows.
#[derive(Debug, Serialize)]
pub struct AppointmentRow {
    pub appointment_id: Uuid,
    pub date: NaiveDate,
    pub slot: String,
    /// The other party: the doctor for patients, the patient for doctors.
    pub counterpart_id: Uuid,
    pub counterpart_name: String,
    pub clinic_name: String,
    pub clinic_location: String,
}

#[derive(sqlx::FromRow)]
struct NameRow {
    id: Uuid,
    name: String,
}

#[derive(sqlx::FromRow)]
struct ClinicNameRow {
    clinic_id: Uuid,
    name: String,
    address: String,
}

async fn user_names(state: &AppState, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, ApiError> {
    let rows: Vec<NameRow> = sqlx::query_as::<_, NameRow>(
        r#"
        SELECT user_id AS id, display_name AS name
        FROM app_user
        WHERE user_id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(rows.into_iter().map(|r| (r.id, r.name)).collect())
}

async fn clinic_names(
    state: &AppState,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, (String, String)>, ApiError> {
    let rows: Vec<ClinicNameRow> = sqlx::query_as::<_, ClinicNameRow>(
        r#"
        SELECT clinic_id, name, address
        FROM clinic
        WHERE clinic_id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(rows
        .into_iter()
        .map(|r| (r.clinic_id, (r.name, r.address)))
        .collect())
}

/// Attaches display names; anything that no longer resolves shows as "Unknown".
fn build_rows(
    reservations: Vec<Reservation>,
    counterpart: impl Fn(&Reservation) -> Uuid,
    names: &HashMap<Uuid, String>,
    clinics: &HashMap<Uuid, (String, String)>,
) -> Vec<AppointmentRow> {
    reservations
        .into_iter()
        .map(|r| {
            let counterpart_id = counterpart(&r);
            let (clinic_name, clinic_location) = r
                .clinic_id
                .and_then(|id| clinics.get(&id).cloned())
                .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string()));

            AppointmentRow {
                appointment_id: r.appointment_id,
                date: r.date,
                slot: r.slot,
                counterpart_id,
                counterpart_name: names
                    .get(&counterpart_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                clinic_name,
                clinic_location,
            }
        })
        .collect()
}

async fn dashboard(
    state: &AppState,
    reservations: Vec<Reservation>,
    counterpart: impl Fn(&Reservation) -> Uuid,
) -> Result<Vec<AppointmentRow>, ApiError> {
    let people: Vec<Uuid> = reservations.iter().map(&counterpart).collect();
    let clinic_ids: Vec<Uuid> = reservations.iter().filter_map(|r| r.clinic_id).collect();

    let names = user_names(state, &people).await?;
    let clinics = clinic_names(state, &clinic_ids).await?;

    Ok(build_rows(reservations, counterpart, &names, &clinics))
}

pub async fn patient_dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<Vec<AppointmentRow>>>, ApiError> {
    auth.require(Role::Patient)?;

    let reservations = state.bookings.appointments_for_patient(auth.user_id).await?;
    let rows = dashboard(&state, reservations, |r| r.doctor_id).await?;

    Ok(Json(ApiOk { data: rows }))
}

pub async fn doctor_dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<Vec<AppointmentRow>>>, ApiError> {
    auth.require(Role::Doctor)?;

    let reservations = state.bookings.appointments_for_doctor(auth.user_id).await?;
    let rows = dashboard(&state, reservations, |r| r.patient_id).await?;

    Ok(Json(ApiOk { data: rows }))
}

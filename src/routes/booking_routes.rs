// src/routes/booking_routes.rs

use axum::{extract::State, routing::get, Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    booking::{DoctorDirectory, Reservation, slots},
    error::ApiError,
    middleware::{
        auth_context::AuthContext,
        validated::{ValidForm, ValidPath, ValidQuery},
    },
    models::{ApiOk, AppState, ClinicRow, OkData, Role},
    routes::clinic_routes::fetch_clinic,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/slots", get(list_slots))
        .route("/book/{doctor_id}", get(booking_page).post(confirm_booking))
        .route(
            "/appointment/edit/{appointment_id}",
            get(edit_page).post(submit_edit),
        )
        .route("/appointment/delete/{appointment_id}", get(cancel_appointment))
}

/* ============================================================
   Query / form params
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    // YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct BookingForm {
    pub date: String,
    pub slot: String,
    /// Present when the booking page was opened to move an existing appointment.
    pub edit_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub date: String,
    pub slot: String,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest("VALIDATION_ERROR", "date must be YYYY-MM-DD".into()))
}

/// Empty form fields arrive as `Some("")`; treat those as absent.
pub(crate) fn parse_edit_id(raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|_| ApiError::BadRequest("VALIDATION_ERROR", "edit_id is not a valid id".into())),
    }
}

/* ============================================================
   Response DTOs
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct DoctorBrief {
    pub doctor_id: Uuid,
    pub full_name: String,
    pub specialization: String,
}

#[derive(Debug, Serialize)]
pub struct BookingPageData {
    pub doctor: DoctorBrief,
    pub clinic: Option<ClinicRow>,
    pub date: NaiveDate,
    pub available_slots: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EditPageData {
    pub appointment: Reservation,
    pub available_slots: Vec<String>,
}

/* ============================================================
   GET /slots
   ============================================================ */

pub async fn list_slots() -> Json<ApiOk<&'static [&'static str]>> {
    Json(ApiOk {
        data: slots::list_all_slots(),
    })
}

/* ============================================================
   GET /book/{doctor_id}?date=
   ============================================================ */

pub async fn booking_page(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidPath(doctor_id): ValidPath<Uuid>,
    ValidQuery(q): ValidQuery<DateQuery>,
) -> Result<Json<ApiOk<BookingPageData>>, ApiError> {
    auth.require(Role::Patient)?;
    let date = parse_date(&q.date)?;

    let doctor = state
        .bookings
        .store()
        .find_doctor(doctor_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "doctor not found".into()))?;

    let clinic = match doctor.clinic_id {
        Some(id) => fetch_clinic(&state, id).await?,
        None => None,
    };

    let available_slots = if doctor.can_receive_bookings() {
        state.bookings.list_availability(doctor_id, date).await?
    } else {
        Vec::new()
    };

    Ok(Json(ApiOk {
        data: BookingPageData {
            doctor: DoctorBrief {
                doctor_id: doctor.doctor_id,
                full_name: doctor.full_name,
                specialization: doctor.specialization,
            },
            clinic,
            date,
            available_slots,
        },
    }))
}

/* ============================================================
   POST /book/{doctor_id}
   ============================================================ */

pub async fn confirm_booking(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidPath(doctor_id): ValidPath<Uuid>,
    ValidForm(form): ValidForm<BookingForm>,
) -> Result<Json<ApiOk<Reservation>>, ApiError> {
    auth.require(Role::Patient)?;
    let date = parse_date(&form.date)?;

    let reservation = match parse_edit_id(form.edit_id.as_deref())? {
        Some(appointment_id) => {
            let current = state.bookings.authorize(appointment_id, auth.requester()).await?;
            if current.doctor_id != doctor_id {
                return Err(ApiError::BadRequest(
                    "VALIDATION_ERROR",
                    "appointment belongs to a different doctor".into(),
                ));
            }
            state
                .bookings
                .reschedule(appointment_id, date, &form.slot)
                .await?
        }
        None => {
            state
                .bookings
                .book(doctor_id, auth.user_id, date, &form.slot)
                .await?
        }
    };

    Ok(Json(ApiOk { data: reservation }))
}

/* ============================================================
   GET/POST /appointment/edit/{id}
   ============================================================ */

pub async fn edit_page(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidPath(appointment_id): ValidPath<Uuid>,
) -> Result<Json<ApiOk<EditPageData>>, ApiError> {
    auth.require(Role::Patient)?;

    let appointment = state.bookings.authorize(appointment_id, auth.requester()).await?;
    let available_slots = state
        .bookings
        .list_availability(appointment.doctor_id, appointment.date)
        .await?;

    Ok(Json(ApiOk {
        data: EditPageData {
            appointment,
            available_slots,
        },
    }))
}

pub async fn submit_edit(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidPath(appointment_id): ValidPath<Uuid>,
    ValidForm(form): ValidForm<EditForm>,
) -> Result<Json<ApiOk<Reservation>>, ApiError> {
    auth.require(Role::Patient)?;
    let date = parse_date(&form.date)?;

    state.bookings.authorize(appointment_id, auth.requester()).await?;
    let moved = state
        .bookings
        .reschedule(appointment_id, date, &form.slot)
        .await?;

    Ok(Json(ApiOk { data: moved }))
}

/* ============================================================
   GET /appointment/delete/{id}
   ============================================================ */

pub async fn cancel_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidPath(appointment_id): ValidPath<Uuid>,
) -> Result<Json<ApiOk<OkData>>, ApiError> {
    state.bookings.cancel(appointment_id, auth.requester()).await?;

    Ok(Json(ApiOk {
        data: OkData { ok: true },
    }))
}

// src/routes/auth_routes.rs

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{MIN_PASSWORD_LEN, SessionToken, hash_password, verify_password},
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::*,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patient/register", post(register_patient))
        .route("/doctor/register", post(register_doctor))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub struct RegisterPatientRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterDoctorRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub specialization: String,
    pub clinic_id: Option<Uuid>,
}

pub(crate) fn normalize_email(email: &str) -> Result<String, ApiError> {
    let e = email.trim().to_ascii_lowercase();
    let valid = match e.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "email is not valid".into(),
        ));
    }
    Ok(e)
}

fn validate_account(full_name: &str, password: &str) -> Result<(), ApiError> {
    if full_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "full_name is required".into(),
        ));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

fn email_taken_or_db(e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Conflict("EMAIL_TAKEN", "Email already registered".into())
        }
        _ => ApiError::db(e),
    }
}

/// Inserts the `app_user` row inside `tx` and returns its id.
async fn insert_user(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    email: &str,
    password: &str,
    full_name: &str,
    role: Role,
) -> Result<Uuid, ApiError> {
    let password_hash = hash_password(password)
        .map_err(|e| ApiError::Internal(format!("password hash: {e}")))?;

    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO app_user (email, password_hash, display_name, role)
        VALUES ($1, $2, $3, $4)
        RETURNING user_id
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(full_name.trim())
    .bind(role)
    .fetch_one(&mut **tx)
    .await
    .map_err(email_taken_or_db)
}

pub async fn register_patient(
    State(state): State<AppState>,
    Json(req): Json<RegisterPatientRequest>,
) -> Result<Json<ApiOk<UserProfile>>, ApiError> {
    validate_account(&req.full_name, &req.password)?;
    let email = normalize_email(&req.email)?;

    let mut tx = state.db.begin().await.map_err(ApiError::db)?;

    let user_id = insert_user(&mut tx, &email, &req.password, &req.full_name, Role::Patient).await?;

    sqlx::query(
        r#"
        INSERT INTO patient (patient_id, phone_number, age, gender, address)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(req.phone_number.as_deref().map(str::trim))
    .bind(req.age)
    .bind(req.gender.as_deref())
    .bind(req.address.as_deref())
    .execute(&mut *tx)
    .await
    .map_err(ApiError::db)?;

    tx.commit().await.map_err(ApiError::db)?;

    tracing::info!(%user_id, "patient registered");
    Ok(Json(ApiOk {
        data: UserProfile {
            user_id,
            email,
            display_name: req.full_name.trim().to_string(),
            role: Role::Patient,
        },
    }))
}

/// New doctors start `pending` and cannot receive bookings until an admin
/// approves them.
pub async fn register_doctor(
    State(state): State<AppState>,
    Json(req): Json<RegisterDoctorRequest>,
) -> Result<Json<ApiOk<UserProfile>>, ApiError> {
    validate_account(&req.full_name, &req.password)?;
    let email = normalize_email(&req.email)?;
    let specialization = req.specialization.trim();
    if specialization.is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "specialization is required".into(),
        ));
    }

    let mut tx = state.db.begin().await.map_err(ApiError::db)?;

    let user_id = insert_user(&mut tx, &email, &req.password, &req.full_name, Role::Doctor).await?;

    sqlx::query(
        r#"
        INSERT INTO doctor (doctor_id, specialization, clinic_id, approval_status)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(specialization)
    .bind(req.clinic_id)
    .bind(ApprovalStatus::Pending)
    .execute(&mut *tx)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            ApiError::BadRequest("UNKNOWN_CLINIC", "clinic_id does not exist".into())
        }
        _ => ApiError::db(e),
    })?;

    tx.commit().await.map_err(ApiError::db)?;

    tracing::info!(%user_id, "doctor registered, awaiting approval");
    Ok(Json(ApiOk {
        data: UserProfile {
            user_id,
            email,
            display_name: req.full_name.trim().to_string(),
            role: Role::Doctor,
        },
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiOk<LoginResponseData>>, ApiError> {
    let email = req.email.trim().to_ascii_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "email and password are required".into(),
        ));
    }

    let user: UserRow = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, email, display_name, password_hash, role, is_active
        FROM app_user
        WHERE email = $1
        "#,
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(ApiError::invalid_credentials)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::invalid_credentials());
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("FORBIDDEN", "Account is disabled".into()));
    }

    let issued = SessionToken::issue();
    let expires_at = Utc::now() + Duration::hours(state.session_ttl_hours);

    let session: SessionTokenRow = sqlx::query_as::<_, SessionTokenRow>(
        r#"
        INSERT INTO session_token (user_id, session_token_hash, expires_at)
        VALUES ($1, $2, $3)
        RETURNING session_token_id, expires_at
        "#,
    )
    .bind(user.user_id)
    .bind(&issued.digest)
    .bind(expires_at)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::db)?;

    tracing::info!(user_id = %user.user_id, role = user.role.as_str(), "login");
    Ok(Json(ApiOk {
        data: LoginResponseData {
            access_token: issued.token,
            expires_at: session.expires_at,
            user: user.profile(),
        },
    }))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<MeResponseData>>, ApiError> {
    let user: UserRow = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, email, display_name, password_hash, role, is_active
        FROM app_user
        WHERE user_id = $1
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(ApiError::session_expired)?;

    let session: SessionTokenRow = sqlx::query_as::<_, SessionTokenRow>(
        r#"
        SELECT session_token_id, expires_at
        FROM session_token
        WHERE session_token_id = $1
        "#,
    )
    .bind(auth.session_token_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(ApiError::session_expired)?;

    Ok(Json(ApiOk {
        data: MeResponseData {
            user: user.profile(),
            session: SessionInfo {
                session_token_id: session.session_token_id,
                expires_at: session.expires_at,
            },
        },
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<OkData>>, ApiError> {
    let rows = sqlx::query(
        r#"
        UPDATE session_token
        SET revoked_at = now()
        WHERE session_token_id = $1
          AND user_id = $2
          AND revoked_at IS NULL
        "#,
    )
    .bind(auth.session_token_id)
    .bind(auth.user_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::db)?;

    if rows.rows_affected() == 0 {
        return Err(ApiError::session_expired());
    }

    Ok(Json(ApiOk {
        data: OkData { ok: true },
    }))
}

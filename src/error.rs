use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::booking::{BookingError, StoreError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str, String),
    Forbidden(&'static str, String),
    BadRequest(&'static str, String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Unprocessable(&'static str, String),
    Unavailable(&'static str, String),
    Internal(String),
}

impl ApiError {
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("INVALID_CREDENTIALS", "Email or password is incorrect".into())
    }

    pub fn session_expired() -> Self {
        ApiError::Unauthorized("SESSION_EXPIRED", "Session expired".into())
    }

    /// Pool exhaustion and dropped connections become 503; everything else
    /// stays a 500.
    pub fn db(e: sqlx::Error) -> Self {
        let msg = format!("db error: {e}");
        match StoreError::from(e) {
            StoreError::Unavailable(detail) => BookingError::TransientStore(detail).into(),
            _ => ApiError::Internal(msg),
        }
    }

    fn to_error_response(code: &str, message: &str) -> Json<ErrorResponse> {
        Json(ErrorResponse {
            error: ErrorObject {
                code: code.to_string(),
                message: message.to_string(),
            },
        })
    }
}

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        let msg = e.to_string();
        match e {
            BookingError::InvalidSlot(_) => ApiError::BadRequest("INVALID_SLOT", msg),
            BookingError::DoctorNotEligible => {
                ApiError::Unprocessable("DOCTOR_NOT_ELIGIBLE", msg)
            }
            BookingError::SlotAlreadyBooked => ApiError::Conflict(
                "SLOT_ALREADY_BOOKED",
                "Slot already booked. Please pick another.".into(),
            ),
            BookingError::NotFound => ApiError::NotFound("NOT_FOUND", msg),
            BookingError::Unauthorized => ApiError::Forbidden("NOT_OWNER", msg),
            BookingError::TransientStore(_) => {
                tracing::warn!(error = %msg, "reservation store unavailable");
                ApiError::Unavailable("STORE_UNAVAILABLE", "Please try again".into())
            }
            BookingError::Store(_) => ApiError::Internal(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::from(BookingError::from(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(code, msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Forbidden(code, msg) => {
                (StatusCode::FORBIDDEN, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::BadRequest(code, msg) => {
                (StatusCode::BAD_REQUEST, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::NotFound(code, msg) => {
                (StatusCode::NOT_FOUND, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Conflict(code, msg) => {
                (StatusCode::CONFLICT, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Unprocessable(code, msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::to_error_response(code, &msg),
            )
                .into_response(),
            ApiError::Unavailable(code, msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::to_error_response(code, &msg),
            )
                .into_response(),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::to_error_response("INTERNAL", &msg),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: BookingError) -> StatusCode {
        ApiError::from(e).into_response().status()
    }

    #[test]
    fn booking_errors_map_to_distinct_statuses() {
        assert_eq!(status_of(BookingError::InvalidSlot("9:00 AM".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(BookingError::DoctorNotEligible), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of(BookingError::SlotAlreadyBooked), StatusCode::CONFLICT);
        assert_eq!(status_of(BookingError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(BookingError::Unauthorized), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(BookingError::TransientStore("pool timed out".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(BookingError::Store("syntax".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unreachable_database_is_unavailable_not_internal() {
        let timed_out = ApiError::db(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(timed_out.status(), StatusCode::SERVICE_UNAVAILABLE);

        let closed = ApiError::db(sqlx::Error::PoolClosed).into_response();
        assert_eq!(closed.status(), StatusCode::SERVICE_UNAVAILABLE);

        let missing = ApiError::db(sqlx::Error::RowNotFound).into_response();
        assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn slot_conflict_carries_its_own_code() {
        match ApiError::from(BookingError::SlotAlreadyBooked) {
            ApiError::Conflict(code, _) => assert_eq!(code, "SLOT_ALREADY_BOOKED"),
            other => panic!("unexpected {other:?}"),
        }
    }
}

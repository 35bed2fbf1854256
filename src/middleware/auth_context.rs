use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use uuid::Uuid;

use crate::auth::token_digest;
use crate::booking::Requester;
use crate::error::ApiError;
use crate::models::{AppState, Role};

/// Who is calling: resolved from `Authorization: Bearer <token>` against a
/// live, unrevoked session of an active account.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
    pub session_token_id: Uuid,
}

impl AuthContext {
    pub fn requester(&self) -> Requester {
        Requester::new(self.user_id, self.role)
    }

    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "FORBIDDEN",
                format!("Only {} accounts can do this", role.as_str()),
            ))
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LiveSession {
    session_token_id: Uuid,
    user_id: Uuid,
    role: Role,
}

impl From<LiveSession> for AuthContext {
    fn from(s: LiveSession) -> Self {
        AuthContext {
            user_id: s.user_id,
            role: s.role,
            session_token_id: s.session_token_id,
        }
    }
}

/// Validates the session and stamps `last_seen_at` in one statement.
async fn touch_session(state: &AppState, digest: &str) -> Result<Option<LiveSession>, ApiError> {
    sqlx::query_as::<_, LiveSession>(
        r#"
        UPDATE session_token st
        SET last_seen_at = now()
        FROM app_user u
        WHERE st.session_token_hash = $1
          AND st.revoked_at IS NULL
          AND st.expires_at > now()
          AND u.user_id = st.user_id
          AND u.is_active = true
        RETURNING st.session_token_id, st.user_id, u.role
        "#,
    )
    .bind(digest)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            // missing or malformed header reads the same as an expired session
            let TypedHeader(authz) =
                TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                    .await
                    .map_err(|_| ApiError::session_expired())?;

            let session = touch_session(state, &token_digest(authz.token()))
                .await?
                .ok_or_else(ApiError::session_expired)?;

            Ok(session.into())
        }
    }
}

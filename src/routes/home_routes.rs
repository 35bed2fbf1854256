use axum::{Json, Router, extract::State, routing::get};

use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::{ApiOk, AppState, Role};

#[derive(serde::Serialize)]
pub struct HomeData {
    pub view: &'static str,
    pub user_name: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/home", get(home))
}

/// Landing payload: which dashboard the signed-in user should see.
pub async fn home(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<HomeData>>, ApiError> {
    let user_name: String = sqlx::query_scalar(
        r#"
        SELECT display_name
        FROM app_user
        WHERE user_id = $1
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(ApiError::session_expired)?;

    let view = match auth.role {
        Role::Patient => "patient",
        Role::Doctor => "doctor",
        Role::Admin => "admin",
    };

    Ok(Json(ApiOk {
        data: HomeData { view, user_name },
    }))
}

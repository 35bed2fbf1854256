use crate::models::AppState;
use axum::Router;

pub mod admin_routes;
pub mod auth_routes;
pub mod booking_routes;
pub mod clinic_routes;
pub mod dashboard_routes;
pub mod home_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/auth", auth_routes::router())
        .nest("/api/v1", clinic_routes::router())
        .nest("/api/v1", booking_routes::router())
        .nest("/api/v1", dashboard_routes::router())
        .nest("/api/v1", admin_routes::router())
        .nest("/api/v1", home_routes::router())
        .with_state(state)
}

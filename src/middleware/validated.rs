//! `Path`, `Query` and `Form` whose rejections use the JSON error envelope
//! (`VALIDATION_ERROR`) instead of axum's plain-text bodies.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Form;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

fn invalid(detail: String) -> ApiError {
    ApiError::BadRequest("VALIDATION_ERROR", detail)
}

pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let Path(value) = Path::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e| invalid(e.body_text()))?;
            Ok(ValidPath(value))
        }
    }
}

pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let Query(value) = Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e| invalid(e.body_text()))?;
            Ok(ValidQuery(value))
        }
    }
}

pub struct ValidForm<T>(pub T);

impl<S, T> FromRequest<S> for ValidForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    fn from_request(
        req: Request,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| invalid(e.body_text()))?;
            Ok(ValidForm(value))
        }
    }
}

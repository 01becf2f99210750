//! HTTP error mapping for API handlers.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pastelink_core::AppError;
use serde_json::json;

/// Error type returned by HTTP handlers.
#[derive(Debug)]
pub enum HttpError {
    /// Domain or storage error from the core crate.
    App(AppError),
    /// Request carried no usable actor identity.
    Unauthenticated(&'static str),
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated(message) => {
                let body = Json(json!({ "error": message }));
                (StatusCode::UNAUTHORIZED, body).into_response()
            }
            Self::App(err) => app_error_response(err),
        }
    }
}

fn app_error_response(err: AppError) -> Response {
    if err.is_transient() {
        tracing::error!("Storage unavailable: {}", err);
        let body = Json(json!({ "error": "Storage temporarily unavailable" }));
        let mut response = (StatusCode::SERVICE_UNAVAILABLE, body).into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        return response;
    }

    let (status, body) = match &err {
        AppError::Validation { field, reason } => (
            StatusCode::BAD_REQUEST,
            json!({ "error": reason, "field": field }),
        ),
        AppError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Paste not found" })),
        AppError::Forbidden => (
            StatusCode::FORBIDDEN,
            json!({ "error": "Not authorized to access this paste" }),
        ),
        AppError::Expired => (
            StatusCode::GONE,
            json!({ "error": "This paste has expired" }),
        ),
        AppError::IdentifierConflict(conflict) => (
            StatusCode::CONFLICT,
            json!({
                "error": format!("Share id '{}' is already taken", conflict.share_id),
                "existing": {
                    "share_id": conflict.share_id,
                    "title": conflict.title,
                },
            }),
        ),
        _ => {
            tracing::error!("Internal error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            )
        }
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::HttpError;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use pastelink_core::error::ShareIdConflict;
    use pastelink_core::{AppError, ShareId};

    #[test]
    fn domain_errors_map_to_their_status_codes() {
        let cases = [
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::Expired, StatusCode::GONE),
            (
                AppError::validation("title", "Title is required for published pastes"),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::IdentifierConflict(ShareIdConflict {
                    share_id: ShareId::new("taken"),
                    title: None,
                }),
                StatusCode::CONFLICT,
            ),
            (
                AppError::StorageMessage("corrupt row".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = HttpError::App(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn transient_errors_are_unavailable_with_retry_hint() {
        let err = AppError::UnavailableMessage("disk detached".to_string());
        let response = HttpError::App(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok()),
            Some("1")
        );
    }

    #[test]
    fn unauthenticated_maps_to_401() {
        let response = HttpError::Unauthenticated("Missing x-actor-id header").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

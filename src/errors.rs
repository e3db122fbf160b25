use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid username or password")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { .. } => AppError::BadRequest(e.to_string()),
            DomainError::NotFound(what) => AppError::NotFound(what),
            DomainError::AuthFailure => AppError::Unauthorized,
            DomainError::StorageUnavailable(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": message
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;
    use actix_web::ResponseError;

    fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = resp.into_body().try_into_bytes().expect("buffered body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn bad_request_returns_400() {
        let resp = AppError::BadRequest("Invalid stock: must be a non-negative integer".to_string())
            .error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Order 9999".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unauthorized_returns_401() {
        assert_eq!(
            AppError::Unauthorized.error_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn internal_error_returns_500_without_details() {
        let err = AppError::Internal("collection 'orders'".to_string());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn not_found_display() {
        assert_eq!(
            AppError::NotFound("Product 7".to_string()).to_string(),
            "Product 7 not found"
        );
    }

    #[test]
    fn domain_validation_maps_to_bad_request() {
        let app_err: AppError = DomainError::validation("status", "unknown").into();
        assert!(matches!(app_err, AppError::BadRequest(ref msg) if msg == "Invalid status: unknown"));
    }

    #[test]
    fn domain_not_found_maps_to_app_not_found() {
        let app_err: AppError = DomainError::NotFound("Order 1".to_string()).into();
        assert!(matches!(app_err, AppError::NotFound(_)));
    }

    #[test]
    fn domain_storage_maps_to_app_internal() {
        let app_err: AppError = DomainError::StorageUnavailable("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn domain_auth_failure_maps_to_unauthorized() {
        let app_err: AppError = DomainError::AuthFailure.into();
        assert!(matches!(app_err, AppError::Unauthorized));
    }
}

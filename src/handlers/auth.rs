use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::errors::DomainError;
use crate::errors::AppError;
use crate::AppState;

use super::SuccessResponse;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/login
///
/// Staff login check. No session is issued; the admin page keeps its own
/// logged-in flag.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = SuccessResponse),
        (status = 401, description = "Invalid username or password"),
    ),
    tag = "auth"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    if !state.credentials.verify(&body.username, &body.password) {
        log::warn!("rejected login attempt for '{}'", body.username);
        return Err(DomainError::AuthFailure.into());
    }
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

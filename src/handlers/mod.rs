use serde::Serialize;
use utoipa::ToSchema;

pub mod auth;
pub mod health;
pub mod inventory;
pub mod money;
pub mod orders;
pub mod products;
pub mod reports;

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

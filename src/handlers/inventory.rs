use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::product::InventoryRecord;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecordResponse {
    pub product_id: u64,
    pub current_stock: u32,
    pub minimum_stock: u32,
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

impl From<InventoryRecord> for InventoryRecordResponse {
    fn from(r: InventoryRecord) -> Self {
        Self {
            product_id: r.product_id,
            current_stock: r.current_stock,
            minimum_stock: r.minimum_stock,
            status: r.status.as_str().to_string(),
            last_updated: r.last_updated,
        }
    }
}

/// GET /api/inventory
///
/// One record per catalog product, status derived from current vs minimum stock.
#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "Inventory records", body = Vec<InventoryRecordResponse>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inventory"
)]
pub async fn list_inventory(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let records = state.inventory.list_inventory().await?;
    let body: Vec<InventoryRecordResponse> = records.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

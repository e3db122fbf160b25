use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::Number;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::AppState;

use super::money;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportResponse {
    /// Sum of non-cancelled order totals
    #[schema(value_type = f64)]
    pub total_sales: Number,
    pub total_orders: usize,
    pub pending_orders: usize,
    /// Average non-cancelled order value, rounded to cents
    #[schema(value_type = f64)]
    pub average_order: Number,
}

/// GET /api/sales-report
#[utoipa::path(
    get,
    path = "/api/sales-report",
    responses(
        (status = 200, description = "Aggregate sales figures", body = SalesReportResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reports"
)]
pub async fn sales_report(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let report = state.orders.sales_report().await?;
    Ok(HttpResponse::Ok().json(SalesReportResponse {
        total_sales: money::to_json(&report.total_sales),
        total_orders: report.total_orders,
        pending_orders: report.pending_orders,
        average_order: money::to_json(&report.average_order),
    }))
}

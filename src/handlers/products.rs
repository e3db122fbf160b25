use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use utoipa::ToSchema;

use crate::application::catalog::{self, Availability, CatalogFilter, SortOrder};
use crate::application::inventory_service::InventoryService;
use crate::domain::errors::DomainError;
use crate::domain::product::Product;
use crate::errors::AppError;
use crate::AppState;

use super::{money, SuccessResponse};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: u64,
    pub name: String,
    #[schema(value_type = f64)]
    pub price: Number,
    pub unit: String,
    pub category: String,
    pub stock: u32,
    /// `in-stock`, `low-stock` or `out-of-stock` against the configured threshold
    pub stock_status: String,
}

impl ProductResponse {
    pub fn new(product: Product, inventory: &InventoryService) -> Self {
        Self {
            stock_status: inventory.classify(product.stock).as_str().to_string(),
            id: product.id,
            name: product.name,
            price: money::to_json(&product.price),
            unit: product.unit,
            category: product.category,
            stock: product.stock,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductPayload {
    pub id: u64,
    pub name: String,
    /// Accepts a JSON number or a decimal string
    #[serde(deserialize_with = "money::deserialize")]
    #[schema(value_type = f64)]
    pub price: BigDecimal,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub category: String,
    pub stock: u32,
}

fn default_unit() -> String {
    "kg".to_string()
}

impl From<ProductPayload> for Product {
    fn from(p: ProductPayload) -> Self {
        Product {
            id: p.id,
            name: p.name.trim().to_string(),
            price: p.price,
            unit: p.unit,
            category: p.category,
            stock: p.stock,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockUpdateRequest {
    /// New absolute stock level; must be a non-negative integer
    #[schema(value_type = i64)]
    pub stock: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockUpdateResponse {
    pub success: bool,
    pub product: ProductResponse,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub availability: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatsResponse {
    pub total: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/products
///
/// Returns the catalog, optionally filtered and sorted.
#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive match on name or category"),
        ("category" = Option<String>, Query, description = "Exact category"),
        ("availability" = Option<String>, Query, description = "all, in-stock, out-of-stock or low-stock"),
        ("sort" = Option<String>, Query, description = "<field>-<asc|desc>, e.g. price-desc"),
    ),
    responses(
        (status = 200, description = "Products", body = Vec<ProductResponse>),
        (status = 400, description = "Unknown availability or sort"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let criteria = CatalogFilter {
        search: query.search,
        category: query.category,
        availability: query
            .availability
            .as_deref()
            .map(str::parse::<Availability>)
            .transpose()?
            .unwrap_or_default(),
    };
    let order = query
        .sort
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<SortOrder>)
        .transpose()?;

    let inventory = &state.inventory;
    let products = inventory.list_products().await?;
    let mut products = catalog::filter(&products, &criteria, inventory.low_stock_threshold());
    if let Some(order) = order {
        products = catalog::sort(&products, order);
    }

    let body: Vec<ProductResponse> = products
        .into_iter()
        .map(|p| ProductResponse::new(p, inventory))
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/products
///
/// Replaces the whole catalog. Inventory records are rebuilt to match.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = Vec<ProductPayload>,
    responses(
        (status = 200, description = "Catalog replaced", body = SuccessResponse),
        (status = 400, description = "Duplicate id, empty name or negative price"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn replace_products(
    state: web::Data<AppState>,
    body: web::Json<Vec<ProductPayload>>,
) -> Result<HttpResponse, AppError> {
    let catalog: Vec<Product> = body.into_inner().into_iter().map(Product::from).collect();
    state.inventory.replace_catalog(catalog).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

/// PUT /api/products/{id}/stock
#[utoipa::path(
    put,
    path = "/api/products/{id}/stock",
    params(
        ("id" = u64, Path, description = "Product id"),
    ),
    request_body = StockUpdateRequest,
    responses(
        (status = 200, description = "Stock updated", body = StockUpdateResponse),
        (status = 400, description = "Stock is negative or not an integer"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn update_stock(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<StockUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let stock = body
        .stock
        .as_i64()
        .ok_or_else(|| DomainError::validation("stock", "must be a non-negative integer"))?;

    let product = state.inventory.adjust_stock(product_id, stock).await?;
    Ok(HttpResponse::Ok().json(StockUpdateResponse {
        success: true,
        product: ProductResponse::new(product, &state.inventory),
    }))
}

/// GET /api/products/stats
#[utoipa::path(
    get,
    path = "/api/products/stats",
    responses(
        (status = 200, description = "Stock counts across the catalog", body = CatalogStatsResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn product_stats(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let products = state.inventory.list_products().await?;
    let stats = catalog::stats(&products, state.inventory.low_stock_threshold());
    Ok(HttpResponse::Ok().json(CatalogStatsResponse {
        total: stats.total,
        in_stock: stats.in_stock,
        low_stock: stats.low_stock,
        out_of_stock: stats.out_of_stock,
    }))
}

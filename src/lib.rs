pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::inventory_service::InventoryService;
use application::order_service::OrderService;
use config::Settings;
use domain::ports::CredentialVerifier;
use errors::AppError;
use infrastructure::credentials::StaticCredentialVerifier;
use infrastructure::record_store::RecordStore;

/// Services shared by every worker.
pub struct AppState {
    pub orders: OrderService,
    pub inventory: InventoryService,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(store: Arc<RecordStore>, settings: &Settings) -> Self {
        let inventory = InventoryService::new(Arc::clone(&store), settings.low_stock_threshold);
        let orders = OrderService::new(
            store,
            inventory.clone(),
            settings.decrement_stock_on_order,
        );
        let credentials = Arc::new(StaticCredentialVerifier::new(
            settings.admin_username.clone(),
            settings.admin_password.clone(),
        ));
        Self {
            orders,
            inventory,
            credentials,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::products::list_products,
        handlers::products::replace_products,
        handlers::products::update_stock,
        handlers::products::product_stats,
        handlers::inventory::list_inventory,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::reports::sales_report,
        handlers::auth::login,
        handlers::health::health,
    ),
    components(schemas(
        handlers::SuccessResponse,
        handlers::products::ProductResponse,
        handlers::products::ProductPayload,
        handlers::products::StockUpdateRequest,
        handlers::products::StockUpdateResponse,
        handlers::products::CatalogStatsResponse,
        handlers::inventory::InventoryRecordResponse,
        handlers::orders::CreateOrderRequest,
        handlers::orders::CreateOrderLineRequest,
        handlers::orders::CreateOrderResponse,
        handlers::orders::OrderResponse,
        handlers::orders::OrderLineResponse,
        handlers::orders::UpdateOrderStatusRequest,
        handlers::reports::SalesReportResponse,
        handlers::auth::LoginRequest,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "products", description = "Catalog and stock levels"),
        (name = "inventory", description = "Inventory records"),
        (name = "orders", description = "Order lifecycle"),
        (name = "reports", description = "Sales figures"),
        (name = "auth", description = "Staff login"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// Route table and extractor configuration, shared by the server and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Malformed request body: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid path: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query: {err}")).into()
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health::health))
            .route("/login", web::post().to(handlers::auth::login))
            .route("/sales-report", web::get().to(handlers::reports::sales_report))
            .route("/inventory", web::get().to(handlers::inventory::list_inventory))
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::list_products))
                    .route("", web::post().to(handlers::products::replace_products))
                    .route("/stats", web::get().to(handlers::products::product_stats))
                    .route("/{id}/stock", web::put().to(handlers::products::update_stock)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}", web::put().to(handlers::orders::update_order_status)),
            ),
    )
    .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let listener = TcpListener::bind((host, port))?;
    build_server_on(state, listener)
}

/// Same as [`build_server`] but on an already bound listener.
pub fn build_server_on(
    state: web::Data<AppState>,
    listener: TcpListener,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure)
    })
    .listen(listener)?
    .run())
}

use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use storefront_service::config::Settings;
use storefront_service::infrastructure::record_store::RecordStore;
use storefront_service::infrastructure::seed::seed_default_catalog;
use storefront_service::{build_server, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().expect("Invalid configuration");
    if settings.admin_password.is_none() {
        log::warn!("ADMIN_PASSWORD is not set; staff login is disabled");
    }

    let store = Arc::new(RecordStore::new(&settings.data_dir));
    seed_default_catalog(&store, settings.low_stock_threshold)
        .await
        .expect("Failed to provision the product catalog");

    let state = web::Data::new(AppState::new(store, &settings));

    log::info!(
        "Starting server at http://{}:{} with data in {}",
        settings.host,
        settings.port,
        settings.data_dir.display()
    );

    build_server(state, &settings.host, settings.port)?.await
}

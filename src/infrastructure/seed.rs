use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::domain::errors::DomainError;
use crate::domain::product::{InventoryRecord, Product};

use super::record_store::{Collection, RecordStore, StoreError};

const DEFAULT_CATALOG: &[(u64, &str, i64, &str, u32)] = &[
    (1, "Pork Liempo", 300, "pork", 50),
    (2, "Pork Kasim", 280, "pork", 40),
    (3, "Pork Ribs", 390, "pork", 30),
    (4, "Pork Chop", 320, "pork", 35),
    (5, "Pork Liver", 180, "internal", 12),
    (6, "Pork Intestines", 220, "internal", 8),
    (7, "Pork Heart", 200, "internal", 6),
    (8, "Pig Ears", 160, "face", 20),
    (9, "Pig Face", 190, "face", 4),
    (10, "Pork Tongue", 260, "face", 0),
];

pub fn default_catalog() -> Vec<Product> {
    DEFAULT_CATALOG
        .iter()
        .map(|&(id, name, price, category, stock)| Product {
            id,
            name: name.to_string(),
            price: BigDecimal::from(price),
            unit: "kg".to_string(),
            category: category.to_string(),
            stock,
        })
        .collect()
}

/// Writes the default catalog and its inventory records when no product
/// collection exists yet. Returns whether anything was written.
pub async fn seed_default_catalog(
    store: &RecordStore,
    minimum_stock: u32,
) -> Result<bool, DomainError> {
    let products = store.lock(Collection::Products).await;
    let inventory = store.lock(Collection::Inventory).await;

    match products.load::<Product>().await {
        Ok(_) => return Ok(false),
        Err(StoreError::Missing { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    let catalog = default_catalog();
    let now = Utc::now();
    let records: Vec<InventoryRecord> = catalog
        .iter()
        .map(|p| InventoryRecord::new(p.id, p.stock, minimum_stock, now))
        .collect();

    inventory.save(&records).await?;
    products.save(&catalog).await?;
    log::info!(
        "seeded default catalog with {} products into {}",
        catalog.len(),
        store.dir().display()
    );
    Ok(true)
}

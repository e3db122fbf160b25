use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainError;
use crate::domain::product::{classify_stock, InventoryRecord, Product, ProductId, StockStatus};
use crate::infrastructure::record_store::{Collection, CollectionGuard, RecordStore};

/// A quantity of one product taken from (or returned to) stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Sole mutator of product stock and inventory records.
///
/// Every mutation holds the `products` and `inventory` guards together and
/// writes products first; if the inventory write then fails the previous
/// product collection is written back.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<RecordStore>,
    low_stock_threshold: u32,
}

impl InventoryService {
    pub fn new(store: Arc<RecordStore>, low_stock_threshold: u32) -> Self {
        Self {
            store,
            low_stock_threshold,
        }
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    /// Classification against the configured threshold, for products with no
    /// inventory record of their own.
    pub fn classify(&self, current_stock: u32) -> StockStatus {
        classify_stock(current_stock, self.low_stock_threshold)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.load_or_default(Collection::Products).await?)
    }

    /// One record per catalog product. Records missing from storage are
    /// computed on the fly from the product and are not saved.
    pub async fn list_inventory(&self) -> Result<Vec<InventoryRecord>, DomainError> {
        let products_guard = self.store.lock(Collection::Products).await;
        let inventory_guard = self.store.lock(Collection::Inventory).await;
        let products: Vec<Product> = products_guard.load_or_default().await?;
        let mut inventory: Vec<InventoryRecord> = inventory_guard.load_or_default().await?;

        let now = Utc::now();
        Ok(products
            .iter()
            .map(|p| {
                let record = self.record_for(&mut inventory, p, now).clone();
                record.refreshed()
            })
            .collect())
    }

    pub async fn adjust_stock(
        &self,
        product_id: ProductId,
        new_stock: i64,
    ) -> Result<Product, DomainError> {
        if new_stock < 0 {
            return Err(DomainError::validation(
                "stock",
                "must be a non-negative integer",
            ));
        }
        let new_stock = u32::try_from(new_stock)
            .map_err(|_| DomainError::validation("stock", "is too large"))?;

        let products_guard = self.store.lock(Collection::Products).await;
        let inventory_guard = self.store.lock(Collection::Inventory).await;
        let previous: Vec<Product> = products_guard.load_or_default().await?;
        let mut inventory: Vec<InventoryRecord> = inventory_guard.load_or_default().await?;

        let mut products = previous.clone();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| DomainError::NotFound(format!("Product {product_id}")))?;
        product.stock = new_stock;
        let updated = product.clone();

        let now = Utc::now();
        self.record_for(&mut inventory, &updated, now)
            .set_stock(new_stock, now);

        self.persist(&products_guard, &inventory_guard, &previous, &products, &inventory)
            .await?;
        log::info!(
            "stock for product {} ({}) set to {}",
            updated.id,
            updated.name,
            new_stock
        );
        Ok(updated)
    }

    /// Looks up the product behind each request, in request order.
    pub async fn resolve(&self, requests: &[StockRequest]) -> Result<Vec<Product>, DomainError> {
        let products: Vec<Product> = self.store.load_or_default(Collection::Products).await?;
        resolve_in(&products, requests)
    }

    /// Takes the requested quantities out of stock, all or nothing, and
    /// returns the products as they were priced at that moment.
    pub async fn reserve(&self, requests: &[StockRequest]) -> Result<Vec<Product>, DomainError> {
        let products_guard = self.store.lock(Collection::Products).await;
        let inventory_guard = self.store.lock(Collection::Inventory).await;
        let previous: Vec<Product> = products_guard.load_or_default().await?;
        let mut inventory: Vec<InventoryRecord> = inventory_guard.load_or_default().await?;

        let snapshots = resolve_in(&previous, requests)?;

        let mut products = previous.clone();
        let now = Utc::now();
        for (product_id, wanted) in totals(requests) {
            let Some(product) = products.iter_mut().find(|p| p.id == product_id) else {
                continue;
            };
            if u64::from(product.stock) < wanted {
                return Err(DomainError::validation(
                    "items",
                    format!(
                        "only {}{} of {} available",
                        product.stock, product.unit, product.name
                    ),
                ));
            }
            // `wanted` fits: it is no larger than a u32 stock level.
            product.stock -= wanted as u32;
            let remaining = product.clone();
            self.record_for(&mut inventory, &remaining, now)
                .set_stock(remaining.stock, now);
        }

        self.persist(&products_guard, &inventory_guard, &previous, &products, &inventory)
            .await?;
        Ok(snapshots)
    }

    /// Returns previously reserved quantities to stock.
    pub async fn release(&self, requests: &[StockRequest]) -> Result<(), DomainError> {
        let products_guard = self.store.lock(Collection::Products).await;
        let inventory_guard = self.store.lock(Collection::Inventory).await;
        let previous: Vec<Product> = products_guard.load_or_default().await?;
        let mut inventory: Vec<InventoryRecord> = inventory_guard.load_or_default().await?;

        let mut products = previous.clone();
        let now = Utc::now();
        for (product_id, returned) in totals(requests) {
            let Some(product) = products.iter_mut().find(|p| p.id == product_id) else {
                log::warn!("cannot return stock to product {product_id}: no longer in catalog");
                continue;
            };
            let restored = u64::from(product.stock).saturating_add(returned);
            product.stock = u32::try_from(restored).unwrap_or(u32::MAX);
            let restored = product.clone();
            self.record_for(&mut inventory, &restored, now)
                .set_stock(restored.stock, now);
        }

        self.persist(&products_guard, &inventory_guard, &previous, &products, &inventory)
            .await
    }

    /// Bulk catalog import. Inventory records are rebuilt from the new
    /// catalog, keeping the minimum stock of products that already had one.
    pub async fn replace_catalog(&self, catalog: Vec<Product>) -> Result<(), DomainError> {
        validate_catalog(&catalog)?;

        let products_guard = self.store.lock(Collection::Products).await;
        let inventory_guard = self.store.lock(Collection::Inventory).await;
        let previous: Vec<Product> = products_guard.load_or_default().await?;
        let existing: Vec<InventoryRecord> = inventory_guard.load_or_default().await?;

        let now = Utc::now();
        let inventory: Vec<InventoryRecord> = catalog
            .iter()
            .map(|p| {
                let minimum = existing
                    .iter()
                    .find(|r| r.product_id == p.id)
                    .map_or(self.low_stock_threshold, |r| r.minimum_stock);
                InventoryRecord::new(p.id, p.stock, minimum, now)
            })
            .collect();

        self.persist(&products_guard, &inventory_guard, &previous, &catalog, &inventory)
            .await?;
        log::info!("catalog replaced with {} products", catalog.len());
        Ok(())
    }

    fn record_for<'a>(
        &self,
        inventory: &'a mut Vec<InventoryRecord>,
        product: &Product,
        now: DateTime<Utc>,
    ) -> &'a mut InventoryRecord {
        let index = match inventory.iter().position(|r| r.product_id == product.id) {
            Some(index) => index,
            None => {
                inventory.push(InventoryRecord::new(
                    product.id,
                    product.stock,
                    self.low_stock_threshold,
                    now,
                ));
                inventory.len() - 1
            }
        };
        &mut inventory[index]
    }

    async fn persist(
        &self,
        products_guard: &CollectionGuard<'_>,
        inventory_guard: &CollectionGuard<'_>,
        previous: &[Product],
        products: &[Product],
        inventory: &[InventoryRecord],
    ) -> Result<(), DomainError> {
        products_guard.save(products).await?;
        if let Err(e) = inventory_guard.save(inventory).await {
            log::warn!("inventory write failed, restoring previous products collection");
            if let Err(rollback) = products_guard.save(previous).await {
                log::error!("products rollback failed: {rollback}");
            }
            return Err(e.into());
        }
        Ok(())
    }
}

fn resolve_in(products: &[Product], requests: &[StockRequest]) -> Result<Vec<Product>, DomainError> {
    requests
        .iter()
        .enumerate()
        .map(|(i, r)| {
            products
                .iter()
                .find(|p| p.id == r.product_id)
                .cloned()
                .ok_or_else(|| {
                    DomainError::validation(
                        format!("items[{i}].productId"),
                        format!("unknown product {}", r.product_id),
                    )
                })
        })
        .collect()
}

/// Quantities per product, summing repeated lines.
fn totals(requests: &[StockRequest]) -> BTreeMap<ProductId, u64> {
    let mut totals = BTreeMap::new();
    for r in requests {
        *totals.entry(r.product_id).or_insert(0u64) += u64::from(r.quantity);
    }
    totals
}

fn validate_catalog(catalog: &[Product]) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for (i, p) in catalog.iter().enumerate() {
        if !seen.insert(p.id) {
            return Err(DomainError::validation(
                format!("products[{i}].id"),
                format!("duplicate product id {}", p.id),
            ));
        }
        if p.name.trim().is_empty() {
            return Err(DomainError::validation(
                format!("products[{i}].name"),
                "must not be empty",
            ));
        }
        if p.price < BigDecimal::from(0) {
            return Err(DomainError::validation(
                format!("products[{i}].price"),
                "must not be negative",
            ));
        }
    }
    Ok(())
}

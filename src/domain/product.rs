use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ProductId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: BigDecimal,
    pub unit: String,
    pub category: String,
    pub stock: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StockStatus::InStock => "in-stock",
            StockStatus::LowStock => "low-stock",
            StockStatus::OutOfStock => "out-of-stock",
        }
    }
}

/// `out-of-stock` at zero, `low-stock` strictly below `minimum_stock`,
/// `in-stock` otherwise.
pub fn classify_stock(current_stock: u32, minimum_stock: u32) -> StockStatus {
    if current_stock == 0 {
        StockStatus::OutOfStock
    } else if current_stock < minimum_stock {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub product_id: ProductId,
    pub current_stock: u32,
    pub minimum_stock: u32,
    pub status: StockStatus,
    pub last_updated: DateTime<Utc>,
}

impl InventoryRecord {
    pub fn new(
        product_id: ProductId,
        current_stock: u32,
        minimum_stock: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id,
            current_stock,
            minimum_stock,
            status: classify_stock(current_stock, minimum_stock),
            last_updated: now,
        }
    }

    /// The only way stock changes on a record; status follows the count.
    pub fn set_stock(&mut self, current_stock: u32, now: DateTime<Utc>) {
        self.current_stock = current_stock;
        self.status = classify_stock(current_stock, self.minimum_stock);
        self.last_updated = now;
    }

    /// Status as derived from the counts, ignoring whatever was persisted.
    pub fn refreshed(mut self) -> Self {
        self.status = classify_stock(self.current_stock, self.minimum_stock);
        self
    }
}

//! Stateless filtering, sorting and counting over a loaded product list.
//!
//! None of these functions mutate their input; each returns a fresh `Vec`.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::errors::DomainError;
use crate::domain::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    All,
    /// Any stock above zero, low or not.
    InStock,
    OutOfStock,
    /// Above zero but under the low-stock threshold.
    LowStock,
}

impl FromStr for Availability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(Availability::All),
            "in-stock" => Ok(Availability::InStock),
            "out-of-stock" => Ok(Availability::OutOfStock),
            "low-stock" => Ok(Availability::LowStock),
            other => Err(DomainError::validation(
                "availability",
                format!("'{other}' is not one of all, in-stock, out-of-stock, low-stock"),
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub availability: Availability,
}

fn is_low(stock: u32, low_stock_threshold: u32) -> bool {
    stock > 0 && stock < low_stock_threshold
}

pub fn filter(products: &[Product], criteria: &CatalogFilter, low_stock_threshold: u32) -> Vec<Product> {
    let needle = criteria
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let category = criteria.category.as_deref().filter(|c| !c.is_empty());

    products
        .iter()
        .filter(|p| match &needle {
            Some(needle) => {
                p.name.to_lowercase().contains(needle) || p.category.to_lowercase().contains(needle)
            }
            None => true,
        })
        .filter(|p| category.map_or(true, |c| p.category == c))
        .filter(|p| match criteria.availability {
            Availability::All => true,
            Availability::InStock => p.stock > 0,
            Availability::OutOfStock => p.stock == 0,
            Availability::LowStock => is_low(p.stock, low_stock_threshold),
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Price,
    Category,
    Stock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            direction: SortDirection::Asc,
        }
    }
}

/// Parses the storefront's `<field>-<direction>` form, e.g. `price-desc`.
impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            DomainError::validation(
                "sort",
                format!("'{s}' is not <id|name|price|category|stock>-<asc|desc>"),
            )
        };
        let (field, direction) = s.split_once('-').ok_or_else(invalid)?;
        let field = match field {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "price" => SortField::Price,
            "category" => SortField::Category,
            "stock" => SortField::Stock,
            _ => return Err(invalid()),
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid()),
        };
        Ok(SortOrder { field, direction })
    }
}

fn compare(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Price => a.price.cmp(&b.price),
        SortField::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
        SortField::Stock => a.stock.cmp(&b.stock),
    }
}

/// Stable sort; equal keys keep their input order in both directions.
pub fn sort(products: &[Product], order: SortOrder) -> Vec<Product> {
    let mut sorted = products.to_vec();
    sorted.sort_by(|a, b| match order.direction {
        SortDirection::Asc => compare(a, b, order.field),
        SortDirection::Desc => compare(b, a, order.field),
    });
    sorted
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogStats {
    pub total: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
}

pub fn stats(products: &[Product], low_stock_threshold: u32) -> CatalogStats {
    products.iter().fold(
        CatalogStats {
            total: products.len(),
            ..CatalogStats::default()
        },
        |mut acc, p| {
            if p.stock == 0 {
                acc.out_of_stock += 1;
            } else {
                acc.in_stock += 1;
                if is_low(p.stock, low_stock_threshold) {
                    acc.low_stock += 1;
                }
            }
            acc
        },
    )
}

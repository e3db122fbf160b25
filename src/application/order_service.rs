use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::order::{
    order_total, NewOrder, Order, OrderId, OrderLine, OrderStatus, FIRST_ORDER_ID,
};
use crate::infrastructure::record_store::{Collection, RecordStore};

use super::inventory_service::{InventoryService, StockRequest};
use super::report::{sales_report, SalesReport};

const MIN_PHONE_LEN: usize = 10;
const ORDER_SEQUENCE: &str = "orders";

/// Last id handed out for a sequence, persisted in the `sequences` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Sequence {
    name: String,
    last: u64,
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<RecordStore>,
    inventory: InventoryService,
    decrement_stock: bool,
}

impl OrderService {
    pub fn new(store: Arc<RecordStore>, inventory: InventoryService, decrement_stock: bool) -> Self {
        Self {
            store,
            inventory,
            decrement_stock,
        }
    }

    /// Validates and records a new `pending` order, returning its id.
    ///
    /// With stock decrement enabled the lines are first reserved from
    /// inventory; if the order then cannot be written, the reservation is
    /// returned and the order counts as not created.
    pub async fn create_order(&self, new_order: NewOrder) -> Result<OrderId, DomainError> {
        let validated = validate(new_order)?;

        let snapshots = if self.decrement_stock {
            self.inventory.reserve(&validated.requests).await?
        } else {
            self.inventory.resolve(&validated.requests).await?
        };

        let lines: Vec<OrderLine> = validated
            .requests
            .iter()
            .zip(snapshots)
            .map(|(request, product)| OrderLine {
                product_id: product.id,
                product_name: product.name,
                quantity: request.quantity,
                unit_price: product.price,
            })
            .collect();
        let total = order_total(&lines);

        let result = self
            .insert(
                validated.customer_name,
                validated.customer_phone,
                validated.notes,
                lines,
                total,
            )
            .await;

        match result {
            Ok(order) => {
                log::info!(
                    "order {} created for {} with {} lines, total {}",
                    order.id,
                    order.customer_name,
                    order.lines.len(),
                    order.total
                );
                Ok(order.id)
            }
            Err(e) => {
                if self.decrement_stock {
                    match self.inventory.release(&validated.requests).await {
                        Ok(()) => log::warn!("order not created; reserved stock returned"),
                        Err(release) => {
                            log::error!("order not created and reserved stock not returned: {release}")
                        }
                    }
                }
                Err(e)
            }
        }
    }

    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: &str,
    ) -> Result<Order, DomainError> {
        let next: OrderStatus = status.parse()?;

        let guard = self.store.lock(Collection::Orders).await;
        let mut orders: Vec<Order> = guard.load_or_default().await?;
        let order = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| DomainError::NotFound(format!("Order {order_id}")))?;

        let current = order.status;
        if !current.can_transition_to(next) {
            let message = if current.is_terminal() {
                format!("order {order_id} is already {current}")
            } else {
                format!("cannot move order {order_id} from {current} to {next}")
            };
            return Err(DomainError::validation("status", message));
        }

        order.status = next;
        if next == OrderStatus::Completed {
            order.completed_at = Some(Utc::now());
        }
        let updated = order.clone();

        guard.save(&orders).await?;
        log::info!("order {order_id} moved from {current} to {next}");
        Ok(updated)
    }

    /// All orders in storage order; callers sort for presentation.
    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.store.load_or_default(Collection::Orders).await?)
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>, DomainError> {
        let orders: Vec<Order> = self.store.load_or_default(Collection::Orders).await?;
        Ok(orders.into_iter().find(|o| o.id == id))
    }

    pub async fn sales_report(&self) -> Result<SalesReport, DomainError> {
        let orders: Vec<Order> = self.store.load_or_default(Collection::Orders).await?;
        Ok(sales_report(&orders))
    }

    async fn insert(
        &self,
        customer_name: String,
        customer_phone: String,
        notes: Option<String>,
        lines: Vec<OrderLine>,
        total: bigdecimal::BigDecimal,
    ) -> Result<Order, DomainError> {
        let orders_guard = self.store.lock(Collection::Orders).await;
        let sequences_guard = self.store.lock(Collection::Sequences).await;
        let mut orders: Vec<Order> = orders_guard.load_or_default().await?;
        let mut sequences: Vec<Sequence> = sequences_guard.load_or_default().await?;

        let last_issued = sequences
            .iter()
            .find(|s| s.name == ORDER_SEQUENCE)
            .map(|s| s.last);
        let highest_stored = orders.iter().map(|o| o.id).max();
        let id = match last_issued.max(highest_stored) {
            Some(last) => last
                .checked_add(1)
                .ok_or_else(|| {
                    log::error!("order id sequence exhausted at {last}");
                    DomainError::StorageUnavailable("order id sequence exhausted".to_string())
                })?
                .max(FIRST_ORDER_ID),
            None => FIRST_ORDER_ID,
        };

        match sequences.iter_mut().find(|s| s.name == ORDER_SEQUENCE) {
            Some(sequence) => sequence.last = id,
            None => sequences.push(Sequence {
                name: ORDER_SEQUENCE.to_string(),
                last: id,
            }),
        }
        // Burn the id before the order exists, so a failed order write can
        // never lead to the id being handed out twice.
        sequences_guard.save(&sequences).await?;

        let order = Order {
            id,
            customer_name,
            customer_phone,
            notes,
            ordered_at: Utc::now(),
            completed_at: None,
            status: OrderStatus::Pending,
            lines,
            total,
        };
        orders.push(order.clone());
        orders_guard.save(&orders).await?;
        Ok(order)
    }
}

struct ValidatedOrder {
    customer_name: String,
    customer_phone: String,
    notes: Option<String>,
    requests: Vec<StockRequest>,
}

fn validate(new_order: NewOrder) -> Result<ValidatedOrder, DomainError> {
    let customer_name = new_order.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(DomainError::validation("customerName", "is required"));
    }

    let customer_phone = new_order.customer_phone.trim().to_string();
    if customer_phone.is_empty() {
        return Err(DomainError::validation("customerPhone", "is required"));
    }
    if customer_phone.chars().count() < MIN_PHONE_LEN {
        return Err(DomainError::validation(
            "customerPhone",
            format!("must be at least {MIN_PHONE_LEN} characters"),
        ));
    }

    if new_order.lines.is_empty() {
        return Err(DomainError::validation("items", "must contain at least one line"));
    }
    let requests = new_order
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            u32::try_from(line.quantity)
                .ok()
                .filter(|q| *q >= 1)
                .map(|quantity| StockRequest {
                    product_id: line.product_id,
                    quantity,
                })
                .ok_or_else(|| {
                    DomainError::validation(format!("items[{i}].quantity"), "must be at least 1")
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let notes = new_order
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    Ok(ValidatedOrder {
        customer_name,
        customer_phone,
        notes,
        requests,
    })
}

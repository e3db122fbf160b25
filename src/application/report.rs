use bigdecimal::BigDecimal;

use crate::domain::order::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesReport {
    /// Sum of totals over orders that were not cancelled.
    pub total_sales: BigDecimal,
    pub total_orders: usize,
    pub pending_orders: usize,
    /// `total_sales` per non-cancelled order, rounded to cents.
    pub average_order: BigDecimal,
}

pub fn sales_report(orders: &[Order]) -> SalesReport {
    let counted: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .collect();
    let total_sales = counted
        .iter()
        .fold(BigDecimal::from(0), |acc, o| acc + &o.total);
    let average_order = if counted.is_empty() {
        BigDecimal::from(0)
    } else {
        (total_sales.clone() / BigDecimal::from(counted.len() as u64)).round(2)
    };

    SalesReport {
        total_sales,
        total_orders: orders.len(),
        pending_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count(),
        average_order,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;

    use super::*;

    fn order(id: u64, status: OrderStatus, total: &str) -> Order {
        Order {
            id,
            customer_name: "Maria".to_string(),
            customer_phone: "09998887777".to_string(),
            notes: None,
            ordered_at: Utc::now(),
            completed_at: None,
            status,
            lines: vec![],
            total: BigDecimal::from_str(total).expect("valid decimal"),
        }
    }

    #[test]
    fn empty_report_is_all_zero() {
        let report = sales_report(&[]);
        assert_eq!(report.total_sales, BigDecimal::from(0));
        assert_eq!(report.total_orders, 0);
        assert_eq!(report.pending_orders, 0);
        assert_eq!(report.average_order, BigDecimal::from(0));
    }

    #[test]
    fn cancelled_orders_count_but_do_not_sell() {
        let orders = vec![
            order(1001, OrderStatus::Pending, "990"),
            order(1002, OrderStatus::Completed, "300"),
            order(1003, OrderStatus::Cancelled, "5000"),
            order(1004, OrderStatus::Processing, "100.50"),
        ];
        let report = sales_report(&orders);
        assert_eq!(report.total_orders, 4);
        assert_eq!(report.pending_orders, 1);
        assert_eq!(
            report.total_sales,
            BigDecimal::from_str("1390.50").expect("valid decimal")
        );
        assert_eq!(
            report.average_order,
            BigDecimal::from_str("463.50").expect("valid decimal")
        );
    }

    #[test]
    fn average_rounds_to_cents() {
        let orders = vec![
            order(1, OrderStatus::Pending, "10"),
            order(2, OrderStatus::Pending, "10"),
            order(3, OrderStatus::Pending, "0.01"),
        ];
        assert_eq!(
            sales_report(&orders).average_order,
            BigDecimal::from_str("6.67").expect("valid decimal")
        );
    }
}

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Snapshot of a purchased product, frozen at checkout time.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub product_name: String,
    pub price_at_purchase: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub username: String,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

/// One page of the admin sales log.
#[derive(Debug, Clone)]
pub struct SalesPage {
    pub items: Vec<OrderView>,
    pub total: i64,
}

use uuid::Uuid;

use super::errors::DomainError;
use super::order::SalesPage;

pub trait OrderRepository: Send + Sync + 'static {
    /// Convert the user's cart into an order as one atomic unit: verify
    /// stock, snapshot prices, decrement stock, clear the cart. Returns the
    /// new order's id. On any failure no partial effect remains.
    fn checkout(&self, user_id: Uuid) -> Result<Uuid, DomainError>;

    /// Paginated sales log, newest order first, each with its snapshot lines.
    fn sales_log(&self, page: i64, limit: i64) -> Result<SalesPage, DomainError>;
}

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::SalesPage;
use crate::domain::ports::OrderRepository;

/// Thin application facade over the checkout repository port.
///
/// Handlers depend on this type rather than on the Diesel adapter, so the
/// store can be swapped (or faked) without touching the HTTP layer.
pub struct CheckoutService<R> {
    repo: R,
}

impl<R: OrderRepository> CheckoutService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn checkout(&self, user_id: Uuid) -> Result<Uuid, DomainError> {
        self.repo.checkout(user_id)
    }

    pub fn sales_log(&self, page: i64, limit: i64) -> Result<SalesPage, DomainError> {
        self.repo.sales_log(page, limit)
    }
}

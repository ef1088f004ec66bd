use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;

/// One cart line joined with the live product row it points at, as read
/// inside the checkout transaction.
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: BigDecimal,
    pub stock: i32,
    pub quantity: i32,
}

/// Verify stock for every line and compute the order total.
///
/// Fails with `EmptyCart` for an empty cart and with `InsufficientStock`
/// (naming the product) for the first line whose requested quantity exceeds
/// the stock read in the same transaction. On success returns
/// `sum(unit_price * quantity)` over all lines.
pub fn verify_and_total(lines: &[CheckoutLine]) -> Result<BigDecimal, DomainError> {
    if lines.is_empty() {
        return Err(DomainError::EmptyCart);
    }

    let mut total = BigDecimal::from(0);
    for line in lines {
        if line.stock < line.quantity {
            return Err(DomainError::InsufficientStock {
                product: line.product_name.clone(),
            });
        }
        total += line.unit_price.clone() * BigDecimal::from(line.quantity);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn line(name: &str, price: &str, stock: i32, quantity: i32) -> CheckoutLine {
        CheckoutLine {
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            unit_price: BigDecimal::from_str(price).expect("valid decimal"),
            stock,
            quantity,
        }
    }

    #[test]
    fn empty_cart_is_rejected() {
        let result = verify_and_total(&[]);
        assert!(matches!(result, Err(DomainError::EmptyCart)));
    }

    #[test]
    fn short_stock_names_the_product() {
        let lines = vec![
            line("Classic Watch", "120.00", 50, 1),
            line("Wireless Headphones", "250.00", 2, 3),
        ];
        match verify_and_total(&lines) {
            Err(DomainError::InsufficientStock { product }) => {
                assert_eq!(product, "Wireless Headphones");
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
    }

    #[test]
    fn quantity_equal_to_stock_is_allowed() {
        let lines = vec![line("Leather Bag", "85.50", 2, 2)];
        let total = verify_and_total(&lines).expect("checkout should pass");
        assert_eq!(total, BigDecimal::from_str("171.00").unwrap());
    }

    #[test]
    fn total_is_sum_of_price_times_quantity() {
        let lines = vec![
            line("Classic Watch", "120.00", 50, 1),
            line("Running Shoes", "95.00", 30, 2),
        ];
        let total = verify_and_total(&lines).expect("checkout should pass");
        assert_eq!(total, BigDecimal::from_str("310.00").unwrap());
    }
}

//! Money calculation utilities using rust_decimal for precision
//!
//! All monetary arithmetic runs on `Decimal` and converts to `f64` only
//! for storage/serialization. Client-declared sums are accepted when they
//! agree with the server recompute within [`MONEY_TOLERANCE`].

use crate::db::models::OrderItemInput;
use crate::orders::{OrderError, OrderResult};
use rust_decimal::prelude::*;

/// Rounding: 2 decimal places, half-up
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line item
const MAX_QUANTITY: i32 = 9999;

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// True when the two amounts agree within one cent.
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() <= MONEY_TOLERANCE
}

/// Line total: unit price × quantity.
pub fn line_total(price: f64, quantity: i32) -> Decimal {
    to_decimal(price) * Decimal::from(quantity)
}

/// Server-side recompute: items sum and grand total with the flat
/// shipping fee applied.
pub fn order_totals(items: &[OrderItemInput], shipping_fee: f64) -> (f64, f64) {
    let subtotal: Decimal = items
        .iter()
        .map(|item| line_total(item.price, item.quantity))
        .sum();
    let total = subtotal + to_decimal(shipping_fee);
    (to_f64(subtotal), to_f64(total))
}

/// Validate one checkout line before any stock work.
pub fn validate_item(item: &OrderItemInput) -> OrderResult<()> {
    if !item.price.is_finite() {
        return Err(OrderError::Validation(format!(
            "price must be a finite number, got {}",
            item.price
        )));
    }
    if item.price < 0.0 {
        return Err(OrderError::Validation(format!(
            "price must be non-negative, got {}",
            item.price
        )));
    }
    if item.price > MAX_PRICE {
        return Err(OrderError::Validation(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, item.price
        )));
    }
    if item.quantity <= 0 {
        return Err(OrderError::Validation(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(OrderError::Validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::VariantKey;

    fn item(price: f64, quantity: i32) -> OrderItemInput {
        OrderItemInput {
            product: "product:p1".to_string(),
            quantity,
            price,
            variant: None,
        }
    }

    #[test]
    fn decimal_avoids_float_drift() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn accumulation_stays_exact() {
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn money_eq_tolerates_one_cent() {
        assert!(money_eq(100.0, 100.0));
        assert!(money_eq(100.0, 100.01));
        assert!(money_eq(100.01, 100.0));
        assert!(!money_eq(100.0, 100.02));
    }

    #[test]
    fn order_totals_add_shipping() {
        let items = vec![item(10.99, 3), item(5.0, 1)];
        let (subtotal, total) = order_totals(&items, 5.0);
        assert_eq!(subtotal, 37.97); // 10.99*3 + 5.00
        assert_eq!(total, 42.97);
    }

    #[test]
    fn totals_empty_order() {
        let (subtotal, total) = order_totals(&[], 5.0);
        assert_eq!(subtotal, 0.0);
        assert_eq!(total, 5.0);
    }

    #[test]
    fn rejects_bad_items() {
        assert!(validate_item(&item(f64::NAN, 1)).is_err());
        assert!(validate_item(&item(-1.0, 1)).is_err());
        assert!(validate_item(&item(2_000_000.0, 1)).is_err());
        assert!(validate_item(&item(10.0, 0)).is_err());
        assert!(validate_item(&item(10.0, -2)).is_err());
        assert!(validate_item(&item(10.0, 10_000)).is_err());
        assert!(validate_item(&item(10.0, 2)).is_ok());
    }

    #[test]
    fn variant_field_does_not_affect_totals() {
        let mut with_variant = item(20.0, 2);
        with_variant.variant = Some(VariantKey {
            color: "red".into(),
            size: "M".into(),
        });
        let (subtotal, total) = order_totals(&[with_variant], 0.0);
        assert_eq!(subtotal, 40.0);
        assert_eq!(total, 40.0);
    }
}

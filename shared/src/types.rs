//! Common wire types shared between server and storefront

use serde::{Deserialize, Serialize};
use std::fmt;

/// User role. Role names travel inside JWT claims.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Buyer,
    Seller,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Buyer => f.write_str("buyer"),
            UserRole::Seller => f.write_str("seller"),
            UserRole::Admin => f.write_str("admin"),
        }
    }
}

/// Product listing status. Sellers create products as `pending`;
/// an admin flips them to `approved` before they can be sold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Pending,
    Approved,
}

/// A (color, size) stock-keeping unit selected on an order item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantKey {
    pub color: String,
    pub size: String,
}

/// Per-variant stock bucket on a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantStock {
    pub color: String,
    pub size: String,
    pub stock: i32,
}

impl VariantStock {
    pub fn matches(&self, key: &VariantKey) -> bool {
        self.color == key.color && self.size == key.size
    }
}

/// Shipping / billing address sub-object embedded in order documents.
/// Field names are part of the wire contract (`shippingInfo` pages).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub full_name: String,
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl Address {
    /// (field name, value) pairs for the fields that must be non-empty.
    pub fn required_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("fullName", &self.full_name),
            ("street", &self.street),
            ("city", &self.city),
            ("postalCode", &self.postal_code),
            ("country", &self.country),
            ("phone", &self.phone),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_serializes_camel_case() {
        let addr = Address {
            full_name: "Ada Lovelace".into(),
            street: "12 Analytical Way".into(),
            city: "London".into(),
            state: None,
            postal_code: "N1 9GU".into(),
            country: "UK".into(),
            phone: "+44 20 1234 5678".into(),
        };
        let json = serde_json::to_value(&addr).unwrap();
        assert!(json.get("fullName").is_some());
        assert!(json.get("postalCode").is_some());
        assert!(json.get("full_name").is_none());
    }

    #[test]
    fn variant_match_is_exact() {
        let v = VariantStock {
            color: "red".into(),
            size: "M".into(),
            stock: 5,
        };
        assert!(v.matches(&VariantKey {
            color: "red".into(),
            size: "M".into()
        }));
        assert!(!v.matches(&VariantKey {
            color: "red".into(),
            size: "m".into()
        }));
    }
}

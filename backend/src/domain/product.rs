//! Product read model served by the product query port.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a product in the authoritative store.
///
/// Identifiers start at 1; `0` is the zero value of an unset product and
/// marks a structurally empty payload.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Wrap a raw identifier.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw identifier value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Product projection returned by read endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Price in minor currency units.
    pub price_cents: u64,
    /// Identifier of the user who listed the product.
    pub owner_id: u64,
}

impl Product {
    /// True for the zero value (no identifier assigned).
    pub fn is_unset(&self) -> bool {
        self.id.get() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_product_is_unset() {
        assert!(Product::default().is_unset());
    }

    #[rstest]
    fn product_serialises_camel_case() {
        let product = Product {
            id: ProductId::new(42),
            name: "Lamp".to_owned(),
            description: "Desk lamp".to_owned(),
            price_cents: 1999,
            owner_id: 7,
        };
        let json = serde_json::to_value(&product).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "id": 42,
                "name": "Lamp",
                "description": "Desk lamp",
                "priceCents": 1999,
                "ownerId": 7,
            })
        );
        assert!(!product.is_unset());
    }

    #[rstest]
    fn product_id_displays_raw_value() {
        assert_eq!(ProductId::from(42).to_string(), "42");
    }
}

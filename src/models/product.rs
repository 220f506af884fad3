use serde::{Deserialize, Serialize};

use super::amount::Amount;
use crate::store::Keyed;

/// Catalog product descriptor.
///
/// `price` is optional here because the catalog service may list products
/// without a current price; the cart engine rejects such products at
/// add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Amount>,
    /// True for national-only products, false for international-only.
    /// Absent means the product has no destination restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domestic: Option<bool>,
    /// Print-layout schema version tied to the product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppl: Option<u32>,
}

impl Product {
    pub fn new(id: u32, price: Amount) -> Self {
        Self {
            id,
            name: None,
            price: Some(price),
            domestic: None,
            ppl: None,
        }
    }
}

impl Keyed for Product {
    fn key(&self) -> u32 {
        self.id
    }
}

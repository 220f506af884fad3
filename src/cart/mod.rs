//! Shopping cart engine: accumulates purchasable voucher items, validates
//! them against the provider's business rules, and assembles checkout
//! payloads.
//!
//! The cart is an ordered sequence of nullable slots. Removal tombstones a
//! slot instead of shifting, so indices handed out by [`ShoppingCart::add_item`]
//! stay valid across removals. The cart lives in memory only: it is created
//! empty, cleared atomically on successful checkout, and never persisted.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::ServiceError;
use crate::models::address::is_domestic;
use crate::models::{
    AddressBinding, AddressInput, Amount, NamedAddress, Product, VoucherLayout, VoucherPosition,
};

mod payload;
mod position;

pub use payload::{build_payload, CheckoutOptions, CheckoutPayload, PositionPayload};
pub use position::{LabelGrid, PositionMap};

/// One pending voucher in the cart.
///
/// Invariant: at most one of `image_id` / `address` is set, and each is
/// constrained to its compatible layout (image -> franking zone, address
/// pair -> address zone). An item with neither is a plain voucher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingCartItem {
    pub product_code: u32,
    pub voucher_layout: VoucherLayout,
    pub price: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<VoucherPosition>,
}

/// Per-item options for [`ShoppingCart::add_item`].
#[derive(Debug, Clone, Default)]
pub struct ItemOptions {
    /// Falls back to the service-level default layout when unset.
    pub voucher_layout: Option<VoucherLayout>,
    pub image_id: Option<u32>,
    pub sender: Option<AddressInput>,
    pub receiver: Option<AddressInput>,
    pub position: Option<VoucherPosition>,
}

/// Cart summary: live items in slot order plus the aggregated total.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub positions: Vec<ShoppingCartItem>,
    pub total: Amount,
}

/// In-memory shopping cart with tombstoned slots.
#[derive(Debug, Default)]
pub struct ShoppingCart {
    slots: Vec<Option<ShoppingCartItem>>,
    default_layout: Option<VoucherLayout>,
}

impl ShoppingCart {
    pub fn new(default_layout: Option<VoucherLayout>) -> Self {
        Self {
            slots: Vec::new(),
            default_layout,
        }
    }

    /// Validates and appends an item, returning its slot index.
    ///
    /// The returned index is `slot count - 1` at append time; tombstoned
    /// slots still count, so it is not a live-item count. Validation is
    /// fail-fast: on any error the cart is left exactly as it was.
    #[instrument(skip(self, product, options), fields(product_code = product.id))]
    pub fn add_item(
        &mut self,
        product: &Product,
        options: ItemOptions,
    ) -> Result<usize, ServiceError> {
        let layout = options
            .voucher_layout
            .or(self.default_layout)
            .ok_or_else(|| {
                ServiceError::VoucherLayout(
                    "no voucher layout given and no default configured".to_string(),
                )
            })?;

        if options.image_id.is_some() && layout == VoucherLayout::AddressZone {
            return Err(ServiceError::VoucherLayout(
                "cannot attach an image in the address layout".to_string(),
            ));
        }

        let address = match (options.sender, options.receiver) {
            (None, None) => None,
            (Some(sender), Some(receiver)) => {
                if layout == VoucherLayout::FrankingZone {
                    return Err(ServiceError::VoucherLayout(
                        "addresses require the address layout".to_string(),
                    ));
                }
                Some(AddressBinding {
                    sender: NamedAddress::try_from_input(sender)?,
                    receiver: NamedAddress::try_from_input(receiver)?,
                })
            }
            _ => {
                return Err(ServiceError::Address(
                    "sender and receiver must be given together".to_string(),
                ))
            }
        };

        if let (Some(domestic), Some(binding)) = (product.domestic, &address) {
            let receiver_domestic = is_domestic(&binding.receiver.address.country);
            if domestic && !receiver_domestic {
                return Err(ServiceError::Product(format!(
                    "national product {} cannot ship to {}",
                    product.id, binding.receiver.address.country
                )));
            }
            if !domestic && receiver_domestic {
                return Err(ServiceError::Product(format!(
                    "international product {} cannot ship domestically",
                    product.id
                )));
            }
        }

        let price = product
            .price
            .clone()
            .ok_or_else(|| ServiceError::Product(format!("product {} has no price", product.id)))?;

        self.slots.push(Some(ShoppingCartItem {
            product_code: product.id,
            voucher_layout: layout,
            price,
            ppl: product.ppl,
            image_id: options.image_id,
            address,
            position: options.position,
        }));
        let index = self.slots.len() - 1;
        debug!(index, "item added to cart");
        Ok(index)
    }

    /// Defensive copy of the item at `index`; `None` for out-of-range or
    /// tombstoned slots.
    pub fn get_item(&self, index: usize) -> Option<ShoppingCartItem> {
        self.slots.get(index).and_then(Clone::clone)
    }

    /// Tombstones the slot in place and returns the prior value. Indices of
    /// other items are unaffected.
    pub fn remove_item(&mut self, index: usize) -> Option<ShoppingCartItem> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Live items in slot order.
    pub(crate) fn live_items(&self) -> Vec<&ShoppingCartItem> {
        self.slots.iter().flatten().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Number of slots, including tombstones.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn summary(&self) -> CartSummary {
        let positions: Vec<ShoppingCartItem> = self.slots.iter().flatten().cloned().collect();
        let total = positions
            .iter()
            .map(|item| item.price.to_minor_units())
            .sum();
        CartSummary {
            positions,
            total: Amount::from_minor_units(total),
        }
    }

    /// Assembles the checkout payload for the current cart contents.
    /// Fails before any side effect when the cart has no live items.
    pub fn prepare_checkout(
        &self,
        user_token: &str,
        options: &CheckoutOptions,
    ) -> Result<CheckoutPayload, ServiceError> {
        let items = self.live_items();
        if items.is_empty() {
            return Err(ServiceError::Checkout(
                "shopping cart is empty".to_string(),
            ));
        }
        build_payload(user_token, &items, options)
    }

    /// Empties the cart. Called only after a checkout fully succeeded.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

use serde::Serialize;

use super::position::{LabelGrid, PositionMap};
use super::ShoppingCartItem;
use crate::errors::ServiceError;
use crate::models::{AddressBinding, PageFormat, ShippingList, VoucherLayout, VoucherPosition};

/// Options accepted by a checkout call.
#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    /// Supplying a page format selects PDF output; without one the checkout
    /// produces standalone PNG vouchers.
    pub page_format: Option<PageFormat>,
    /// Explicit order id to place under; the provider assigns one otherwise.
    pub shop_order_id: Option<u64>,
    /// Skip the remote call and return the assembled payload. Defaults to
    /// the runtime mode when unset (dry run outside production).
    pub dry_run: Option<bool>,
    pub create_manifest: Option<bool>,
    pub create_shipping_list: Option<ShippingList>,
}

/// One voucher position as transmitted to the purchasing service.
///
/// Deliberately carries no price field: the client's aggregated `total` is
/// the binding price contract, and per-item ppl is likewise lifted to the
/// batch level.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionPayload {
    pub product_code: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressBinding>,
    pub voucher_layout: VoucherLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<VoucherPosition>,
}

/// Complete checkout payload in the purchasing service's wire shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub user_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_order_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_format_id: Option<u32>,
    pub positions: Vec<PositionPayload>,
    /// Sum of all item prices in minor units.
    pub total: i64,
    /// Maximum print-layout version across the batch; never sent per item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ppl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_manifest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_shipping_list: Option<u8>,
}

/// Assembles the checkout payload from the live cart items in slot order.
///
/// For PDF checkouts this resolves every item's grid placement: explicit
/// positions are validated against the label grid and collisions displace
/// the previously seated item; items without a position are packed into the
/// first free slot. The position map is only built when at least one item
/// needs packing.
pub fn build_payload(
    user_token: &str,
    items: &[&ShoppingCartItem],
    options: &CheckoutOptions,
) -> Result<CheckoutPayload, ServiceError> {
    let page_format = options.page_format.as_ref();
    let grid = page_format.map(|format| {
        LabelGrid::new(
            format.page_layout.label_count.labels_x,
            format.page_layout.label_count.labels_y,
        )
    });

    let mut map = match grid {
        Some(grid) if items.iter().any(|item| item.position.is_none()) => {
            if grid.is_empty() {
                return Err(ServiceError::Checkout(
                    "page format declares no label grid; position data is mandatory".to_string(),
                ));
            }
            Some(PositionMap::new(grid))
        }
        _ => None,
    };

    let mut positions = Vec::with_capacity(items.len());
    let mut total: i64 = 0;
    let mut max_ppl: Option<u32> = None;

    for (index, item) in items.iter().enumerate() {
        total += item.price.to_minor_units();
        if let Some(ppl) = item.ppl {
            max_ppl = Some(max_ppl.map_or(ppl, |current| current.max(ppl)));
        }

        let mut transmitted_position = None;
        if page_format.is_some() {
            match (&item.position, &mut map) {
                (Some(position), Some(map)) => {
                    if let Some(grid) = grid {
                        grid.validate(position)?;
                    }
                    map.seat_at(position, index);
                }
                (Some(position), None) => {
                    if let Some(grid) = grid {
                        grid.validate(position)?;
                    }
                    transmitted_position = Some(*position);
                }
                (None, Some(map)) => map.seat_first_free(index),
                (None, None) => {
                    return Err(ServiceError::Checkout(
                        "no position map available; position data is mandatory".to_string(),
                    ))
                }
            }
        }

        positions.push(PositionPayload {
            product_code: item.product_code,
            image_id: item.image_id,
            address: item.address.clone(),
            voucher_layout: item.voucher_layout,
            position: transmitted_position,
        });
    }

    if let Some(map) = &map {
        let grid = map.grid();
        for (slot, item_index) in map.entries() {
            positions[item_index].position = Some(grid.unflatten(slot));
        }
    }

    Ok(CheckoutPayload {
        user_token: user_token.to_string(),
        shop_order_id: options.shop_order_id,
        page_format_id: page_format.map(|format| format.id),
        positions,
        total,
        ppl: max_ppl,
        create_manifest: options.create_manifest,
        create_shipping_list: options.create_shipping_list.map(ShippingList::wire_value),
    })
}

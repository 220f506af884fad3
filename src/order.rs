use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Amount;

/// Single purchased voucher within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub voucher_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,
}

/// Normalized result of a checkout or order retrieval. Immutable once
/// constructed; only ever built from a successful remote response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Link to the rendered artifact (PDF or PNG archive).
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_order_id: Option<u64>,
    pub vouchers: Vec<Voucher>,
}

/// Parses the provider's checkout/retrieve response into an [`Order`].
///
/// Returns `None` when the raw response lacks the shopping-cart/voucher-list
/// shape. That models "no order", not a transport fault; callers must check
/// the absent case explicitly.
pub fn parse_order(raw: &Value) -> Option<Order> {
    let cart = raw.get("shoppingCart")?;
    let voucher_entries = cart.get("voucherList")?.get("voucher")?.as_array()?;

    let vouchers = voucher_entries
        .iter()
        .filter_map(|entry| {
            Some(Voucher {
                voucher_id: entry.get("voucherId")?.as_str()?.to_string(),
                tracking_code: entry
                    .get("trackingId")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect();

    Some(Order {
        link: raw
            .get("link")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        manifest_link: raw
            .get("manifestLink")
            .and_then(Value::as_str)
            .map(str::to_string),
        shop_order_id: order_id(cart.get("shopOrderId")),
        vouchers,
    })
}

/// Reads the wallet balance a checkout response carries alongside the order.
/// Accepts the provider's historical misspelling of the field.
pub(crate) fn wallet_balance_from(raw: &Value) -> Option<Amount> {
    raw.get("walletBalance")
        .or_else(|| raw.get("walletBallance"))
        .and_then(Value::as_i64)
        .map(Amount::from_minor_units)
}

fn order_id(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

use serde::{Deserialize, Serialize};

/// Voucher rendering mode. The two zones are mutually exclusive: the
/// franking zone permits an attached motif image, the address zone permits
/// bound sender/receiver addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoucherLayout {
    #[serde(rename = "FrankingZone")]
    FrankingZone,
    #[serde(rename = "AddressZone")]
    AddressZone,
}

/// Rendered artifact format of a checkout. PDF checkouts place vouchers on
/// a page format grid; PNG checkouts produce one standalone image per
/// voucher and carry no position data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    Png,
    Pdf,
}

impl OutputFormat {
    /// Remote operation name for a checkout in this format. The table lives
    /// here so the cart engine stays format-agnostic; the façade resolves
    /// the operation right before the transport call.
    pub fn checkout_operation(self) -> &'static str {
        match self {
            OutputFormat::Png => "checkoutShoppingCartPNG",
            OutputFormat::Pdf => "checkoutShoppingCartPDF",
        }
    }
}

/// Shipping list variant forwarded with a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShippingList {
    NoList,
    WithoutAddresses,
    WithAddresses,
}

impl ShippingList {
    /// Numeric wire encoding expected by the purchasing service.
    pub fn wire_value(self) -> u8 {
        match self {
            ShippingList::NoList => 0,
            ShippingList::WithoutAddresses => 1,
            ShippingList::WithAddresses => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_wire_names() {
        assert_eq!(
            serde_json::to_value(VoucherLayout::FrankingZone).expect("serialize"),
            serde_json::json!("FrankingZone")
        );
        assert_eq!(
            serde_json::to_value(VoucherLayout::AddressZone).expect("serialize"),
            serde_json::json!("AddressZone")
        );
    }

    #[test]
    fn operation_lookup_table() {
        assert_eq!(
            OutputFormat::Png.checkout_operation(),
            "checkoutShoppingCartPNG"
        );
        assert_eq!(
            OutputFormat::Pdf.checkout_operation(),
            "checkoutShoppingCartPDF"
        );
    }

    #[test]
    fn shipping_list_wire_values() {
        assert_eq!(ShippingList::NoList.wire_value(), 0);
        assert_eq!(ShippingList::WithoutAddresses.wire_value(), 1);
        assert_eq!(ShippingList::WithAddresses.wire_value(), 2);
    }
}

use serde::{Deserialize, Serialize};

use crate::store::Keyed;

/// Page orientation of a printable template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Number of label slots per page, by axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    pub labels_x: u32,
    pub labels_y: u32,
}

/// Layout block of a page format. Only the label grid matters to the cart
/// engine; margins and spacing are carried for callers that render previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    pub orientation: Orientation,
    pub label_count: LabelCount,
}

/// Printable layout template describing a grid of label slots per page.
/// Used only for PDF-mode checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFormat {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub is_address_possible: bool,
    #[serde(default)]
    pub is_image_possible: bool,
    pub page_layout: PageLayout,
}

impl Keyed for PageFormat {
    fn key(&self) -> u32 {
        self.id
    }
}

/// One-based page/x/y placement of a voucher on a page format grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherPosition {
    pub label_x: u32,
    pub label_y: u32,
    pub page: u32,
}

impl VoucherPosition {
    pub fn new(label_x: u32, label_y: u32, page: u32) -> Self {
        Self {
            label_x,
            label_y,
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_page_format() {
        let json = serde_json::json!({
            "id": 1,
            "name": "DIN A4 normal paper",
            "isAddressPossible": true,
            "isImagePossible": false,
            "pageLayout": {
                "orientation": "PORTRAIT",
                "labelCount": {"labelsX": 2, "labelsY": 5}
            }
        });
        let format: PageFormat = serde_json::from_value(json).expect("deserialize");
        assert_eq!(format.page_layout.label_count.labels_x, 2);
        assert_eq!(format.page_layout.label_count.labels_y, 5);
        assert_eq!(format.page_layout.orientation, Orientation::Portrait);
        assert!(format.is_address_possible);
    }

    #[test]
    fn voucher_position_wire_shape() {
        let pos = VoucherPosition::new(1, 2, 1);
        let json = serde_json::to_value(pos).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"labelX": 1, "labelY": 2, "page": 1})
        );
    }
}

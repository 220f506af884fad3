use serde::{Deserialize, Serialize};

use crate::store::Keyed;

/// Motif image attachable to a franking-zone voucher.
///
/// Public gallery images are provider-curated; private gallery images are
/// uploads bound to the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
}

impl Keyed for GalleryImage {
    fn key(&self) -> u32 {
        self.id
    }
}

pub mod address;
pub mod amount;
pub mod gallery;
pub mod page_format;
pub mod product;
pub mod voucher;

pub use address::{AddressBinding, AddressInput, Name, NamedAddress, SimpleAddress};
pub use amount::{Amount, DEFAULT_CURRENCY};
pub use gallery::GalleryImage;
pub use page_format::{LabelCount, Orientation, PageFormat, PageLayout, VoucherPosition};
pub use product::Product;
pub use voucher::{OutputFormat, ShippingList, VoucherLayout};

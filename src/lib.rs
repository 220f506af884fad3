//! Postal voucher client library
//!
//! Exposes a postal voucher provider's purchasing, product catalog, and
//! account services through a unified local API. Requests are shaped into
//! the provider's wire format, session state (authentication token, cached
//! reference data) is maintained locally, and responses are translated into
//! typed domain objects.
//!
//! The heart of the crate is the shopping-cart checkout engine in [`cart`]:
//! items are accumulated and validated client-side, packed onto a page
//! format's label grid, and assembled into the provider's checkout payload.
//! [`service::VoucherService`] is the single entry point consumed by
//! callers.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod cart;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod order;
pub mod service;
pub mod session;
pub mod store;
pub mod transport;

pub use cart::{
    CartSummary, CheckoutOptions, CheckoutPayload, ItemOptions, ShoppingCart, ShoppingCartItem,
};
pub use config::AppConfig;
pub use errors::ServiceError;
pub use models::{
    AddressInput, Amount, GalleryImage, OutputFormat, PageFormat, Product, ShippingList,
    VoucherLayout, VoucherPosition,
};
pub use order::{parse_order, Order, Voucher};
pub use service::{CheckoutResult, Credentials, VoucherService};
pub use session::{UserData, UserSession};
pub use store::{Keyed, ReferenceStore, Refresher};
pub use transport::{HttpTransport, Transport, TransportError};

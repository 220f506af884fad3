use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::cart::{CartSummary, CheckoutOptions, CheckoutPayload, ItemOptions, ShoppingCart, ShoppingCartItem};
use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::models::{Amount, GalleryImage, OutputFormat, PageFormat, Product};
use crate::order::{parse_order, wallet_balance_from, Order};
use crate::session::{UserData, UserSession};
use crate::store::{Keyed, Refresher, ReferenceStore};
use crate::transport::{HttpTransport, Transport};

const OP_AUTHENTICATE: &str = "authenticateUser";
const OP_RETRIEVE_ORDER: &str = "retrieveOrder";
const OP_PAGE_FORMATS: &str = "retrievePageFormats";
const OP_PUBLIC_GALLERY: &str = "retrievePublicGalleryImages";
const OP_PRIVATE_GALLERY: &str = "retrievePrivateGalleryImages";
const OP_PRODUCT_LIST: &str = "getProductList";

/// Account service credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Result of a checkout call: either the assembled payload (dry run) or the
/// placed order.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutResult {
    DryRun(CheckoutPayload),
    Placed(Order),
}

/// Transport-backed refresher loading a list operation into an id-keyed map.
struct OperationRefresher<T> {
    transport: Arc<dyn Transport>,
    operation: &'static str,
    list_field: &'static str,
    /// Present for operations that require an authenticated session token.
    session: Option<Arc<UserSession>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> OperationRefresher<T> {
    fn new(
        transport: Arc<dyn Transport>,
        operation: &'static str,
        list_field: &'static str,
        session: Option<Arc<UserSession>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            transport,
            operation,
            list_field,
            session,
            _marker: PhantomData,
        })
    }
}

#[async_trait]
impl<T> Refresher<T> for OperationRefresher<T>
where
    T: DeserializeOwned + Keyed + Send + Sync + 'static,
{
    async fn refresh(&self) -> Result<HashMap<u32, T>, ServiceError> {
        let mut payload = json!({});
        if let Some(session) = &self.session {
            payload["userToken"] = Value::String(session.token()?);
        }
        let raw = self
            .transport
            .request(self.operation, payload)
            .await
            .map_err(ServiceError::from)?;
        let list = raw.get(self.list_field).cloned().unwrap_or(Value::Array(Vec::new()));
        let items: Vec<T> = serde_json::from_value(list)?;
        Ok(items.into_iter().map(|item| (item.key(), item)).collect())
    }
}

/// Single entry point for callers: orchestrates session init, reference
/// data loading, and delegates cart operations to the engine.
///
/// Cart-mutating calls are synchronous; checkout and remote retrieval are
/// async. Checkout calls must be serialized per instance — the engine
/// provides no internal locking.
pub struct VoucherService {
    config: AppConfig,
    transport: Arc<dyn Transport>,
    session: Arc<UserSession>,
    cart: ShoppingCart,
    page_formats: ReferenceStore<PageFormat>,
    products: ReferenceStore<Product>,
    public_gallery: ReferenceStore<GalleryImage>,
    private_gallery: ReferenceStore<GalleryImage>,
}

impl VoucherService {
    pub fn new(config: AppConfig, transport: Arc<dyn Transport>) -> Self {
        let session = Arc::new(UserSession::new());
        let ttl = Some(config.cache_ttl());
        let page_formats = ReferenceStore::new(
            "pageFormats",
            OperationRefresher::new(transport.clone(), OP_PAGE_FORMATS, "pageFormats", None),
            ttl,
        );
        let products = ReferenceStore::new(
            "products",
            OperationRefresher::new(transport.clone(), OP_PRODUCT_LIST, "products", None),
            ttl,
        );
        let public_gallery = ReferenceStore::new(
            "publicGallery",
            OperationRefresher::new(transport.clone(), OP_PUBLIC_GALLERY, "items", None),
            ttl,
        );
        let private_gallery = ReferenceStore::new(
            "privateGallery",
            OperationRefresher::new(
                transport.clone(),
                OP_PRIVATE_GALLERY,
                "items",
                Some(session.clone()),
            ),
            ttl,
        );
        let cart = ShoppingCart::new(config.default_voucher_layout);
        Self {
            config,
            transport,
            session,
            cart,
            page_formats,
            products,
            public_gallery,
            private_gallery,
        }
    }

    /// Builds a service backed by the default HTTP transport from the
    /// configured gateway URL.
    pub fn connect(config: AppConfig) -> Result<Self, ServiceError> {
        let transport = HttpTransport::new(config.gateway_url.clone())
            .map_err(ServiceError::from)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Authenticates against the account service and loads the session.
    #[instrument(skip(self, credentials))]
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), ServiceError> {
        let raw = self
            .transport
            .request(
                OP_AUTHENTICATE,
                json!({
                    "username": credentials.username,
                    "password": credentials.password,
                }),
            )
            .await
            .map_err(ServiceError::from)?;

        let data = UserData {
            user_token: raw
                .get("userToken")
                .and_then(Value::as_str)
                .map(str::to_string),
            wallet_balance: wallet_balance_from(&raw),
            info_message: raw
                .get("infoMessage")
                .and_then(Value::as_str)
                .map(str::to_string),
        };
        if data.user_token.is_none() {
            return Err(ServiceError::Unauthorized(
                "authentication response carried no user token".to_string(),
            ));
        }
        if let Some(message) = &data.info_message {
            warn!(%message, "provider info message on authentication");
        }
        self.session.load(data);
        info!("session authenticated");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn wallet_balance(&self) -> Option<Amount> {
        self.session.wallet_balance()
    }

    pub fn order_ids(&self) -> Vec<u64> {
        self.session.order_ids()
    }

    /// Validates and adds an item to the cart, returning its slot index.
    pub fn add_item(
        &mut self,
        product: &Product,
        options: ItemOptions,
    ) -> Result<usize, ServiceError> {
        self.cart.add_item(product, options)
    }

    pub fn get_item(&self, index: usize) -> Option<ShoppingCartItem> {
        self.cart.get_item(index)
    }

    pub fn remove_item(&mut self, index: usize) -> Option<ShoppingCartItem> {
        self.cart.remove_item(index)
    }

    pub fn summary(&self) -> CartSummary {
        self.cart.summary()
    }

    /// Places the cart with the purchasing service, or returns the
    /// assembled payload on a dry run.
    ///
    /// On success the order id is recorded in the session, the wallet
    /// balance is updated from the response, and the cart is cleared
    /// atomically. On any failure the cart is left exactly as it was.
    #[instrument(skip(self, options))]
    pub async fn checkout(
        &mut self,
        options: CheckoutOptions,
    ) -> Result<CheckoutResult, ServiceError> {
        let token = self.session.token()?;
        let payload = self.cart.prepare_checkout(&token, &options)?;

        let dry_run = options
            .dry_run
            .or(self.config.dry_run)
            .unwrap_or(!self.config.is_production());
        if dry_run {
            info!(
                positions = payload.positions.len(),
                total = payload.total,
                "dry-run checkout, skipping remote call"
            );
            return Ok(CheckoutResult::DryRun(payload));
        }

        let format = if options.page_format.is_some() {
            OutputFormat::Pdf
        } else {
            OutputFormat::Png
        };
        let operation = format.checkout_operation();

        let raw = self
            .transport
            .request(operation, serde_json::to_value(&payload)?)
            .await
            .map_err(ServiceError::from)?;

        let order = parse_order(&raw).ok_or_else(|| {
            ServiceError::ExternalService(
                "checkout response did not contain an order".to_string(),
            )
        })?;

        if let Some(balance) = wallet_balance_from(&raw) {
            self.session.set_wallet_balance(balance);
        }
        if let Some(id) = order.shop_order_id {
            self.session.add_order_id(id);
        }
        self.cart.clear();
        info!(
            order_id = ?order.shop_order_id,
            vouchers = order.vouchers.len(),
            "checkout placed"
        );
        Ok(CheckoutResult::Placed(order))
    }

    /// Re-fetches a previously placed order. `Ok(None)` means the provider
    /// knows no such order; transport faults still fail.
    #[instrument(skip(self))]
    pub async fn retrieve_order(&self, shop_order_id: u64) -> Result<Option<Order>, ServiceError> {
        let token = self.session.token()?;
        let raw = self
            .transport
            .request(
                OP_RETRIEVE_ORDER,
                json!({"userToken": token, "shopOrderId": shop_order_id}),
            )
            .await
            .map_err(ServiceError::from)?;
        Ok(parse_order(&raw))
    }

    pub async fn page_formats(&self) -> Result<Vec<PageFormat>, ServiceError> {
        self.page_formats.get_list().await
    }

    pub async fn page_format(&self, id: u32) -> Result<Option<PageFormat>, ServiceError> {
        self.page_formats.get_item(id).await
    }

    pub async fn products(&self) -> Result<Vec<Product>, ServiceError> {
        self.products.get_list().await
    }

    pub async fn product(&self, id: u32) -> Result<Option<Product>, ServiceError> {
        self.products.get_item(id).await
    }

    pub async fn public_gallery_images(&self) -> Result<Vec<GalleryImage>, ServiceError> {
        self.public_gallery.get_list().await
    }

    pub async fn private_gallery_images(&self) -> Result<Vec<GalleryImage>, ServiceError> {
        self.private_gallery.get_list().await
    }
}

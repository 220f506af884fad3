//! End-to-end flow: authenticate, load reference data, fill the cart, place
//! a PDF checkout, and retrieve the order again — all against a scripted
//! transport.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use postvoucher::cart::{CheckoutOptions, ItemOptions};
use postvoucher::{
    AppConfig, Amount, CheckoutResult, Credentials, Product, ServiceError, Transport,
    TransportError, VoucherLayout, VoucherPosition, VoucherService,
};

#[derive(Default)]
struct ScriptedTransport {
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, Value)>>,
    responses: Mutex<HashMap<String, Value>>,
}

impl ScriptedTransport {
    fn respond(&self, operation: &str, value: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(operation.to_string(), value);
    }

    fn requests_for(&self, operation: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| op == operation)
            .map(|(_, payload)| payload.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(&self, operation: &str, payload: Value) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((operation.to_string(), payload));
        self.responses
            .lock()
            .unwrap()
            .get(operation)
            .cloned()
            .ok_or_else(|| TransportError::Fault(format!("unexpected operation {}", operation)))
    }
}

fn production_config() -> AppConfig {
    AppConfig {
        environment: "production".to_string(),
        ..Default::default()
    }
}

fn scripted_service() -> (VoucherService, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::default());
    transport.respond(
        "authenticateUser",
        json!({"userToken": "token-1", "walletBalance": 500000}),
    );
    transport.respond(
        "retrievePageFormats",
        json!({"pageFormats": [{
            "id": 26,
            "name": "DIN A4 normal paper",
            "isAddressPossible": true,
            "isImagePossible": true,
            "pageLayout": {
                "orientation": "PORTRAIT",
                "labelCount": {"labelsX": 2, "labelsY": 2}
            }
        }]}),
    );
    transport.respond(
        "getProductList",
        json!({"products": [
            {"id": 1, "name": "Standardbrief", "price": {"value": "0.85", "currency": "EUR"}, "domestic": true, "ppl": 33},
            {"id": 82, "name": "Brief International", "price": {"value": "1.10", "currency": "EUR"}, "domestic": false, "ppl": 54}
        ]}),
    );
    (VoucherService::new(production_config(), transport.clone()), transport)
}

fn sender() -> postvoucher::AddressInput {
    postvoucher::AddressInput {
        first_name: Some("Erika".into()),
        last_name: Some("Musterfrau".into()),
        street: "Unter den Linden".into(),
        house_no: Some("1".into()),
        zip: "10117".into(),
        city: "Berlin".into(),
        ..Default::default()
    }
}

fn foreign_receiver() -> postvoucher::AddressInput {
    postvoucher::AddressInput {
        country: Some("AUT".into()),
        city: "Wien".into(),
        zip: "1010".into(),
        street: "Stephansplatz".into(),
        ..sender()
    }
}

#[tokio::test]
async fn full_pdf_checkout_flow() {
    let (mut service, transport) = scripted_service();

    service
        .authenticate(&Credentials {
            username: "user@example.invalid".into(),
            password: "secret".into(),
        })
        .await
        .expect("authenticate");

    let products = service.products().await.expect("products");
    assert_eq!(products.len(), 2);
    let domestic = service.product(1).await.expect("product").expect("present");
    let international = service.product(82).await.expect("product").expect("present");
    let page_format = service
        .page_format(26)
        .await
        .expect("page format")
        .expect("present");

    // Two items with the same explicit slot plus one unplaced.
    let first = service
        .add_item(
            &domestic,
            ItemOptions {
                voucher_layout: Some(VoucherLayout::FrankingZone),
                position: Some(VoucherPosition::new(1, 1, 1)),
                ..Default::default()
            },
        )
        .expect("add first");
    let second = service
        .add_item(
            &international,
            ItemOptions {
                voucher_layout: Some(VoucherLayout::AddressZone),
                sender: Some(sender()),
                receiver: Some(foreign_receiver()),
                position: Some(VoucherPosition::new(1, 1, 1)),
                ..Default::default()
            },
        )
        .expect("add second");
    let third = service
        .add_item(
            &domestic,
            ItemOptions {
                voucher_layout: Some(VoucherLayout::FrankingZone),
                ..Default::default()
            },
        )
        .expect("add third");
    assert_eq!((first, second, third), (0, 1, 2));

    let summary = service.summary();
    assert_eq!(summary.positions.len(), 3);
    assert_eq!(summary.total.to_minor_units(), 85 + 110 + 85);

    transport.respond(
        "checkoutShoppingCartPDF",
        json!({
            "link": "https://example.invalid/orders/7001.pdf",
            "walletBallance": 497200,
            "shoppingCart": {
                "shopOrderId": 7001,
                "voucherList": {"voucher": [
                    {"voucherId": "A0001"},
                    {"voucherId": "A0002", "trackingId": "XP000000001DE"},
                    {"voucherId": "A0003"}
                ]}
            }
        }),
    );

    let result = service
        .checkout(CheckoutOptions {
            page_format: Some(page_format),
            ..Default::default()
        })
        .await
        .expect("checkout");

    let order = match result {
        CheckoutResult::Placed(order) => order,
        other => panic!("expected placed order, got {:?}", other),
    };
    assert_eq!(order.shop_order_id, Some(7001));
    assert_eq!(order.vouchers.len(), 3);
    assert_eq!(
        order.vouchers[1].tracking_code.as_deref(),
        Some("XP000000001DE")
    );

    // Session and cart reflect the placement.
    assert!(service.summary().positions.is_empty());
    assert_eq!(service.order_ids(), vec![7001]);
    assert_eq!(
        service.wallet_balance().map(|b| b.to_minor_units()),
        Some(497200)
    );

    // The transmitted payload resolved the collision: the second claimant
    // kept (1,1), the first was displaced to (2,1), the unplaced item
    // packed into (1,2). Aggregates: one total, one max ppl, no per-item
    // price.
    let checkout_requests = transport.requests_for("checkoutShoppingCartPDF");
    assert_eq!(checkout_requests.len(), 1);
    let payload = &checkout_requests[0];
    assert_eq!(payload["pageFormatId"], json!(26));
    assert_eq!(payload["total"], json!(280));
    assert_eq!(payload["ppl"], json!(54));
    let positions = payload["positions"].as_array().expect("positions");
    assert_eq!(positions.len(), 3);
    assert_eq!(
        positions[0]["position"],
        json!({"labelX": 2, "labelY": 1, "page": 1})
    );
    assert_eq!(
        positions[1]["position"],
        json!({"labelX": 1, "labelY": 1, "page": 1})
    );
    assert_eq!(
        positions[2]["position"],
        json!({"labelX": 1, "labelY": 2, "page": 1})
    );
    for position in positions {
        assert!(position.get("price").is_none());
        assert!(position.get("ppl").is_none());
    }

    // Retrieval round trip.
    transport.respond(
        "retrieveOrder",
        json!({
            "link": "https://example.invalid/orders/7001.pdf",
            "shoppingCart": {
                "shopOrderId": 7001,
                "voucherList": {"voucher": [{"voucherId": "A0001"}]}
            }
        }),
    );
    let retrieved = service
        .retrieve_order(7001)
        .await
        .expect("retrieve")
        .expect("order present");
    assert_eq!(retrieved.shop_order_id, Some(7001));

    transport.respond("retrieveOrder", json!({"unknown": true}));
    assert!(service
        .retrieve_order(9999)
        .await
        .expect("retrieve")
        .is_none());
}

#[tokio::test]
async fn validation_failures_do_not_touch_the_cart() {
    let (mut service, _transport) = scripted_service();

    let priceless = Product {
        price: None,
        ..Product::new(5, Amount::from_minor_units(0))
    };
    let err = service
        .add_item(
            &priceless,
            ItemOptions {
                voucher_layout: Some(VoucherLayout::FrankingZone),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Product(_)));

    let err = service
        .add_item(
            &Product::new(1, Amount::from_minor_units(85)),
            ItemOptions {
                voucher_layout: Some(VoucherLayout::AddressZone),
                image_id: Some(12),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::VoucherLayout(_)));

    let err = service
        .add_item(
            &Product::new(1, Amount::from_minor_units(85)),
            ItemOptions {
                voucher_layout: Some(VoucherLayout::AddressZone),
                sender: Some(sender()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Address(_)));

    assert!(service.summary().positions.is_empty());
}

//! End-to-end order flow against the in-memory engine:
//! checkout, stock reservation/restoration, the status lifecycle,
//! revenue ledger folding and refund records.

use market_server::db::DbService;
use market_server::db::models::{
    Order, OrderCreate, OrderItemInput, ProductCreate, ProductUpdate, RefundCreate, User,
};
use market_server::db::repository::{
    OrderRepository, ProductRepository, RefundRepository, RepoError, RevenueRepository,
    UserRepository, record_id,
};
use market_server::integrity::IntegrityChecker;
use market_server::orders::{
    CheckoutService, LifecycleService, OrderError, StockLedger,
};
use shared::{
    Address, OrderStatus, PaymentMethod, UserRole, VariantKey, VariantStock,
};

const SHIPPING_FEE: f64 = 5.0;

struct TestCtx {
    db: surrealdb::Surreal<surrealdb::engine::local::Db>,
    products: ProductRepository,
    orders: OrderRepository,
    revenue: RevenueRepository,
    checkout: CheckoutService,
    lifecycle: LifecycleService,
    checker: IntegrityChecker,
    buyer_id: String,
    seller_id: String,
    admin_id: String,
    product_id: String,
}

async fn setup() -> TestCtx {
    let db = DbService::memory().await.expect("in-memory db").db;

    let users = UserRepository::new(db.clone());
    let products = ProductRepository::new(db.clone());
    let orders = OrderRepository::new(db.clone());
    let revenue = RevenueRepository::new(db.clone());
    let refunds = RefundRepository::new(db.clone());

    let stock = StockLedger::new(products.clone());
    let checkout = CheckoutService::new(
        products.clone(),
        orders.clone(),
        stock.clone(),
        SHIPPING_FEE,
    );
    let lifecycle = LifecycleService::new(orders.clone(), revenue.clone(), refunds, stock);
    let checker = IntegrityChecker::new(db.clone());

    let buyer = users
        .create(User::new("Ada".into(), "ada@example.com".into(), UserRole::Buyer))
        .await
        .unwrap();
    let seller = users
        .create(User::new(
            "Grace".into(),
            "grace@example.com".into(),
            UserRole::Seller,
        ))
        .await
        .unwrap();
    let admin = users
        .create(User::new(
            "Root".into(),
            "root@example.com".into(),
            UserRole::Admin,
        ))
        .await
        .unwrap();

    let buyer_id = buyer.id.unwrap().to_string();
    let seller_id = seller.id.unwrap().to_string();
    let admin_id = admin.id.unwrap().to_string();

    // Product with (red, M) = 5 and (blue, L) = 4; aggregate derived to 9.
    let seller_rid = record_id("user", &seller_id).unwrap();
    let product = products
        .create(
            seller_rid,
            ProductCreate {
                name: "Custom Tee".into(),
                description: Some("Printed on demand".into()),
                price: 25.0,
                stock: 0,
                variants: vec![
                    VariantStock {
                        color: "red".into(),
                        size: "M".into(),
                        stock: 5,
                    },
                    VariantStock {
                        color: "blue".into(),
                        size: "L".into(),
                        stock: 4,
                    },
                ],
            },
        )
        .await
        .unwrap();
    let product_id = product.id.unwrap().to_string();
    products.approve(&product_id).await.unwrap();

    TestCtx {
        db,
        products,
        orders,
        revenue,
        checkout,
        lifecycle,
        checker,
        buyer_id,
        seller_id,
        admin_id,
        product_id,
    }
}

fn address() -> Address {
    Address {
        full_name: "Ada Lovelace".into(),
        street: "12 Analytical Way".into(),
        city: "London".into(),
        state: None,
        postal_code: "N1 9GU".into(),
        country: "UK".into(),
        phone: "+44 20 1234 5678".into(),
    }
}

fn red_m() -> VariantKey {
    VariantKey {
        color: "red".into(),
        size: "M".into(),
    }
}

fn order_payload(ctx: &TestCtx, quantity: i32) -> OrderCreate {
    let subtotal = 25.0 * quantity as f64;
    OrderCreate {
        seller: ctx.seller_id.clone(),
        items: vec![OrderItemInput {
            product: ctx.product_id.clone(),
            quantity,
            price: 25.0,
            variant: Some(red_m()),
        }],
        subtotal,
        total_amount: subtotal + SHIPPING_FEE,
        payment_method: PaymentMethod::Bank,
        shipping_info: address(),
        billing_info: address(),
    }
}

async fn place(ctx: &TestCtx, quantity: i32) -> Order {
    ctx.checkout
        .place_order(&ctx.buyer_id, order_payload(ctx, quantity), None)
        .await
        .expect("checkout should succeed")
}

fn assert_validation(err: OrderError, needle: &str) {
    match err {
        OrderError::Validation(msg) => {
            assert!(msg.contains(needle), "expected {needle:?} in {msg:?}")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn checkout_reserves_variant_stock_and_recomputes_aggregate() {
    let ctx = setup().await;
    let order = place(&ctx, 2).await;

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.subtotal, 50.0);
    assert_eq!(order.total_amount, 55.0);
    assert_eq!(order.timeline.len(), 1);
    assert_eq!(order.timeline[0].status, OrderStatus::Pending);

    let product = ctx.products.find_by_id(&ctx.product_id).await.unwrap().unwrap();
    let red = product.variants.iter().find(|v| v.color == "red").unwrap();
    assert_eq!(red.stock, 3);
    assert_eq!(product.stock, 7); // 3 + 4, re-derived from variants
    assert_eq!(product.sold_count, 2);
}

#[tokio::test]
async fn cancelling_restores_stock_exactly() {
    let ctx = setup().await;
    let order = place(&ctx, 2).await;

    let cancelled = ctx
        .lifecycle
        .transition(&order.id_string(), OrderStatus::Cancelled, &ctx.buyer_id, None)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.timeline.len(), 2);

    let product = ctx.products.find_by_id(&ctx.product_id).await.unwrap().unwrap();
    let red = product.variants.iter().find(|v| v.color == "red").unwrap();
    assert_eq!(red.stock, 5);
    assert_eq!(product.stock, 9);

    // Cancelled from pending: no revenue was ever added.
    assert_eq!(ctx.revenue.total().await.unwrap(), 0.0);
}

#[tokio::test]
async fn total_mismatch_is_rejected_with_no_stock_change() {
    let ctx = setup().await;
    let mut payload = order_payload(&ctx, 2);
    payload.total_amount += 0.02;

    let err = ctx
        .checkout
        .place_order(&ctx.buyer_id, payload, None)
        .await
        .unwrap_err();
    assert_validation(err, "Total amount calculation mismatch");

    let product = ctx.products.find_by_id(&ctx.product_id).await.unwrap().unwrap();
    assert_eq!(product.stock, 9);
    assert_eq!(product.sold_count, 0);
}

#[tokio::test]
async fn one_cent_total_difference_is_tolerated() {
    let ctx = setup().await;
    let mut payload = order_payload(&ctx, 1);
    payload.total_amount += 0.01;
    payload.subtotal -= 0.01;

    assert!(
        ctx.checkout
            .place_order(&ctx.buyer_id, payload, None)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn price_mismatch_is_rejected() {
    let ctx = setup().await;
    let mut payload = order_payload(&ctx, 1);
    payload.items[0].price = 24.0;
    payload.subtotal = 24.0;
    payload.total_amount = 24.0 + SHIPPING_FEE;

    let err = ctx
        .checkout
        .place_order(&ctx.buyer_id, payload, None)
        .await
        .unwrap_err();
    assert_validation(err, "Price mismatch");
}

#[tokio::test]
async fn insufficient_variant_stock_is_rejected() {
    let ctx = setup().await;
    let err = ctx
        .checkout
        .place_order(&ctx.buyer_id, order_payload(&ctx, 6), None)
        .await
        .unwrap_err();
    assert_validation(err, "Insufficient stock");
}

#[tokio::test]
async fn failed_multi_item_reservation_rolls_back() {
    let ctx = setup().await;
    // Two lines against the same (red, M) bucket of 5: each passes the
    // per-line catalog check, but together they oversell. The first line
    // reserves, the second fails under the ledger lock, and the first
    // must be rolled back.
    let mut payload = order_payload(&ctx, 4);
    payload.items.push(OrderItemInput {
        product: ctx.product_id.clone(),
        quantity: 4,
        price: 25.0,
        variant: Some(red_m()),
    });
    payload.subtotal = 25.0 * 8.0;
    payload.total_amount = payload.subtotal + SHIPPING_FEE;

    let err = ctx
        .checkout
        .place_order(&ctx.buyer_id, payload, None)
        .await
        .unwrap_err();
    assert_validation(err, "Insufficient stock");

    // The reservation that went through first was rolled back.
    let product = ctx.products.find_by_id(&ctx.product_id).await.unwrap().unwrap();
    let red = product.variants.iter().find(|v| v.color == "red").unwrap();
    assert_eq!(red.stock, 5);
    assert_eq!(product.stock, 9);
    assert_eq!(product.sold_count, 0);
}

#[tokio::test]
async fn blank_address_field_is_rejected() {
    let ctx = setup().await;
    let mut payload = order_payload(&ctx, 1);
    payload.shipping_info.city = "  ".into();

    let err = ctx
        .checkout
        .place_order(&ctx.buyer_id, payload, None)
        .await
        .unwrap_err();
    assert_validation(err, "shippingInfo.city");
}

#[tokio::test]
async fn unapproved_product_cannot_be_ordered() {
    let ctx = setup().await;
    let seller_rid = record_id("user", &ctx.seller_id).unwrap();
    let pending = ctx
        .products
        .create(
            seller_rid,
            ProductCreate {
                name: "Unreviewed".into(),
                description: None,
                price: 10.0,
                stock: 10,
                variants: vec![],
            },
        )
        .await
        .unwrap();

    let mut payload = order_payload(&ctx, 1);
    payload.items[0].product = pending.id.unwrap().to_string();
    payload.items[0].price = 10.0;
    payload.items[0].variant = None;
    payload.subtotal = 10.0;
    payload.total_amount = 10.0 + SHIPPING_FEE;

    let err = ctx
        .checkout
        .place_order(&ctx.buyer_id, payload, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn confirm_then_cancel_nets_revenue_to_zero() {
    let ctx = setup().await;
    let order = place(&ctx, 2).await;
    let id = order.id_string();

    ctx.lifecycle
        .transition(&id, OrderStatus::Confirmed, &ctx.seller_id, None)
        .await
        .unwrap();
    assert_eq!(ctx.revenue.total().await.unwrap(), 55.0);
    assert_eq!(ctx.orders.sum_confirmed_totals().await.unwrap(), 55.0);

    ctx.lifecycle
        .transition(&id, OrderStatus::Cancelled, &ctx.buyer_id, None)
        .await
        .unwrap();
    assert_eq!(ctx.revenue.total().await.unwrap(), 0.0);
    assert_eq!(ctx.orders.sum_confirmed_totals().await.unwrap(), 0.0);

    // Cancellation after confirmation also restores the goods.
    let product = ctx.products.find_by_id(&ctx.product_id).await.unwrap().unwrap();
    assert_eq!(product.stock, 9);

    // Two signed entries remain on the ledger for the audit trail.
    let entries = ctx.revenue.list(10).await.unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn revenue_fold_matches_confirmed_orders_across_sequence() {
    let ctx = setup().await;
    let first = place(&ctx, 1).await;
    let second = place(&ctx, 2).await;

    ctx.lifecycle
        .transition(&first.id_string(), OrderStatus::Confirmed, &ctx.seller_id, None)
        .await
        .unwrap();
    ctx.lifecycle
        .transition(&second.id_string(), OrderStatus::Confirmed, &ctx.seller_id, None)
        .await
        .unwrap();
    ctx.lifecycle
        .transition(&first.id_string(), OrderStatus::Cancelled, &ctx.buyer_id, None)
        .await
        .unwrap();

    let fold = ctx.revenue.total().await.unwrap();
    let confirmed = ctx.orders.sum_confirmed_totals().await.unwrap();
    assert_eq!(fold, confirmed);
    assert_eq!(fold, 55.0); // only the 2-unit order remains confirmed

    let report = ctx.checker.run().await.unwrap();
    assert!(report.is_clean(), "{report:?}");
}

#[tokio::test]
async fn delivery_shortcut_is_rejected_by_transition_table() {
    let ctx = setup().await;
    let order = place(&ctx, 1).await;
    let id = order.id_string();

    ctx.lifecycle
        .transition(&id, OrderStatus::Confirmed, &ctx.seller_id, None)
        .await
        .unwrap();

    let err = ctx
        .lifecycle
        .transition(&id, OrderStatus::Delivered, &ctx.seller_id, None)
        .await
        .unwrap_err();
    assert_validation(err, "Invalid status transition");

    // The sanctioned path works.
    for next in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        ctx.lifecycle
            .transition(&id, next, &ctx.seller_id, None)
            .await
            .unwrap();
    }

    let order = ctx.lifecycle.get(&id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.timeline.len(), 5); // pending + 4 transitions
}

#[tokio::test]
async fn cancellation_is_rejected_once_placed() {
    let ctx = setup().await;
    let order = place(&ctx, 1).await;
    let id = order.id_string();

    ctx.lifecycle
        .transition(&id, OrderStatus::Placed, &ctx.seller_id, None)
        .await
        .unwrap();

    let err = ctx
        .lifecycle
        .transition(&id, OrderStatus::Cancelled, &ctx.buyer_id, None)
        .await
        .unwrap_err();
    assert_validation(err, "Invalid status transition");
}

#[tokio::test]
async fn refund_flow_is_gated_and_one_to_one() {
    let ctx = setup().await;
    let order = place(&ctx, 2).await;
    let id = order.id_string();

    // Refund before cancellation is rejected.
    let premature = ctx
        .lifecycle
        .create_refund(
            &ctx.admin_id,
            RefundCreate {
                order_id: id.clone(),
                amount: 55.0,
                method: "bank transfer".into(),
                reason: "buyer remorse".into(),
                screenshot: None,
            },
        )
        .await
        .unwrap_err();
    assert_validation(premature, "cancelled order");

    ctx.lifecycle
        .transition(&id, OrderStatus::Cancelled, &ctx.buyer_id, None)
        .await
        .unwrap();

    // Amount above the order total is rejected.
    let too_much = ctx
        .lifecycle
        .create_refund(
            &ctx.admin_id,
            RefundCreate {
                order_id: id.clone(),
                amount: 60.0,
                method: "bank transfer".into(),
                reason: "buyer remorse".into(),
                screenshot: None,
            },
        )
        .await
        .unwrap_err();
    assert_validation(too_much, "exceeds order total");

    let refund = ctx
        .lifecycle
        .create_refund(
            &ctx.admin_id,
            RefundCreate {
                order_id: id.clone(),
                amount: 55.0,
                method: "bank transfer".into(),
                reason: "buyer remorse".into(),
                screenshot: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(refund.amount, 55.0);

    let order = ctx.lifecycle.get(&id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Refunded);

    // A second refund for the same order is refused.
    let duplicate = ctx
        .lifecycle
        .create_refund(
            &ctx.admin_id,
            RefundCreate {
                order_id: id.clone(),
                amount: 10.0,
                method: "wallet credit".into(),
                reason: "double entry".into(),
                screenshot: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(duplicate, OrderError::Conflict(_)), "got {duplicate:?}");

    let found = ctx.lifecycle.find_refund(&id).await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn bare_stock_update_is_rejected_while_variants_exist() {
    let ctx = setup().await;

    let err = ctx
        .products
        .update(
            &ctx.product_id,
            ProductUpdate {
                name: None,
                description: None,
                price: None,
                stock: Some(500),
                variants: None,
                is_active: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)), "got {err:?}");

    // Nothing changed.
    let product = ctx.products.find_by_id(&ctx.product_id).await.unwrap().unwrap();
    assert_eq!(product.stock, 9);
}

#[tokio::test]
async fn variant_update_rederives_aggregate_ignoring_client_stock() {
    let ctx = setup().await;

    let product = ctx
        .products
        .update(
            &ctx.product_id,
            ProductUpdate {
                name: None,
                description: None,
                price: None,
                stock: Some(999),
                variants: Some(vec![
                    VariantStock {
                        color: "red".into(),
                        size: "M".into(),
                        stock: 2,
                    },
                    VariantStock {
                        color: "blue".into(),
                        size: "L".into(),
                        stock: 1,
                    },
                ]),
                is_active: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(product.stock, 3);
}

#[tokio::test]
async fn bare_stock_update_works_for_variantless_products() {
    let ctx = setup().await;
    let seller_rid = record_id("user", &ctx.seller_id).unwrap();
    let plain = ctx
        .products
        .create(
            seller_rid,
            ProductCreate {
                name: "Gift Card".into(),
                description: None,
                price: 50.0,
                stock: 10,
                variants: vec![],
            },
        )
        .await
        .unwrap();

    let updated = ctx
        .products
        .update(
            &plain.id.unwrap().to_string(),
            ProductUpdate {
                name: None,
                description: None,
                price: None,
                stock: Some(25),
                variants: None,
                is_active: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.stock, 25);
}

#[tokio::test]
async fn integrity_checker_flags_drifted_aggregate() {
    let ctx = setup().await;

    assert!(ctx.checker.run().await.unwrap().is_clean());

    // Corrupt the stored aggregate behind the write path's back.
    let rid = record_id("product", &ctx.product_id).unwrap();
    ctx.db
        .query("UPDATE $id SET stock = 999")
        .bind(("id", rid))
        .await
        .unwrap();

    let report = ctx.checker.run().await.unwrap();
    assert_eq!(report.stock_violations.len(), 1);
    assert_eq!(report.stock_violations[0].stored, 999);
    assert_eq!(report.stock_violations[0].derived, 9);
}

#[tokio::test]
async fn integrity_checker_flags_revenue_drift() {
    let ctx = setup().await;
    let order = place(&ctx, 1).await;

    ctx.lifecycle
        .transition(&order.id_string(), OrderStatus::Confirmed, &ctx.seller_id, None)
        .await
        .unwrap();
    assert!(ctx.checker.run().await.unwrap().is_clean());

    // A ledger entry with no matching confirmed order.
    let rid = record_id("order", "ghost").unwrap();
    ctx.revenue
        .append(rid, 42.0, market_server::db::models::RevenueReason::OrderConfirmed)
        .await
        .unwrap();

    let report = ctx.checker.run().await.unwrap();
    let (ledger, confirmed) = report.revenue_drift.expect("drift should be detected");
    assert_eq!(ledger, 30.0 + 42.0); // 25 + 5 shipping, plus the ghost entry
    assert_eq!(confirmed, 30.0);
}

//! Order placement
//!
//! Validation happens entirely before the first write. The write sequence
//! is a compensating saga: reserve stock for every line (the ledger rolls
//! back partial reservations itself), then persist the order; if the
//! order insert fails, the reservations are released again. No code path
//! leaves stock decremented without a persisted order.

use surrealdb::RecordId;

use crate::db::models::{Order, OrderCreate, OrderItem, Product};
use crate::db::repository::{OrderRepository, ProductRepository, record_id};
use crate::orders::money;
use crate::orders::stock::{StockLedger, has_sufficient_stock};
use crate::orders::{OrderError, OrderResult};
use crate::utils::validation::{MAX_ADDRESS_LEN, validate_required_text};
use shared::{Address, OrderStatus, TimelineEntry};

#[derive(Clone)]
pub struct CheckoutService {
    products: ProductRepository,
    orders: OrderRepository,
    stock: StockLedger,
    shipping_fee: f64,
}

impl CheckoutService {
    pub fn new(
        products: ProductRepository,
        orders: OrderRepository,
        stock: StockLedger,
        shipping_fee: f64,
    ) -> Self {
        Self {
            products,
            orders,
            stock,
            shipping_fee,
        }
    }

    /// Place an order for `buyer_id`.
    ///
    /// `screenshot` is the already-persisted payment screenshot path, if
    /// the upload succeeded; a missing screenshot never blocks checkout.
    pub async fn place_order(
        &self,
        buyer_id: &str,
        input: OrderCreate,
        screenshot: Option<String>,
    ) -> OrderResult<Order> {
        let buyer = parse_user_id(buyer_id)?;
        let seller = record_id("user", &input.seller)
            .map_err(|_| OrderError::Validation("Invalid seller id".to_string()))?;

        validate_address(&input.shipping_info, "shippingInfo")?;
        validate_address(&input.billing_info, "billingInfo")?;

        if input.items.is_empty() {
            return Err(OrderError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }
        for item in &input.items {
            money::validate_item(item)?;
        }

        // Catalog pass: existence, purchasability, seller match, price check.
        let mut items: Vec<OrderItem> = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let product_id = record_id("product", &line.product)
                .map_err(|_| OrderError::Validation(format!("Invalid product id {}", line.product)))?;
            let product = self
                .products
                .find_by_id(&product_id.to_string())
                .await?
                .filter(Product::is_purchasable)
                .ok_or_else(|| {
                    OrderError::NotFound(format!("Product {} not available", line.product))
                })?;

            if product.seller != seller {
                return Err(OrderError::Validation(format!(
                    "Product {} does not belong to this seller",
                    product.name
                )));
            }
            if !money::money_eq(line.price, product.price) {
                return Err(OrderError::Validation(format!(
                    "Price mismatch for {}",
                    product.name
                )));
            }
            // Early sufficiency check for a friendly error; the ledger
            // re-validates under its lock before decrementing.
            if !has_sufficient_stock(&product, line.quantity, line.variant.as_ref()) {
                return Err(OrderError::Validation(format!(
                    "Insufficient stock for {}",
                    product.name
                )));
            }

            items.push(OrderItem {
                product: product_id,
                name: product.name,
                quantity: line.quantity,
                price: product.price,
                variant: line.variant.clone(),
            });
        }

        // Amount checks against the server recompute.
        let (subtotal, total_amount) = money::order_totals(&input.items, self.shipping_fee);
        if !money::money_eq(input.subtotal, subtotal) {
            return Err(OrderError::Validation(
                "Subtotal calculation mismatch".to_string(),
            ));
        }
        if !money::money_eq(input.total_amount, total_amount) {
            return Err(OrderError::Validation(
                "Total amount calculation mismatch".to_string(),
            ));
        }

        // Reserve, then persist; release on insert failure.
        self.stock.reserve(&items).await?;

        let order = Order {
            id: None,
            buyer: buyer.clone(),
            seller,
            items: items.clone(),
            subtotal,
            total_amount,
            payment_method: input.payment_method,
            payment_screenshot: screenshot,
            payment_confirmed: false,
            shipping_info: input.shipping_info,
            billing_info: input.billing_info,
            status: OrderStatus::Pending,
            timeline: vec![TimelineEntry::new(
                OrderStatus::Pending,
                Some(buyer.to_string()),
                None,
            )],
            created_at: shared::util::now_millis(),
        };

        match self.orders.create(order).await {
            Ok(order) => Ok(order),
            Err(e) => {
                tracing::error!(error = %e, "Order insert failed, releasing reserved stock");
                self.stock.release(&items).await;
                Err(e.into())
            }
        }
    }
}

fn parse_user_id(id: &str) -> OrderResult<RecordId> {
    record_id("user", id).map_err(|_| OrderError::Validation("Invalid user id".to_string()))
}

fn validate_address(address: &Address, label: &str) -> OrderResult<()> {
    for (field, value) in address.required_fields() {
        validate_required_text(value, &format!("{label}.{field}"), MAX_ADDRESS_LEN).map_err(
            |e| match e {
                crate::utils::AppError::Validation(msg) => OrderError::Validation(msg),
                other => OrderError::Validation(other.to_string()),
            },
        )?;
    }
    Ok(())
}

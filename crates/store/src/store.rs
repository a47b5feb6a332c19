//! The storage trait shared by the Postgres and in-memory backends.

use async_trait::async_trait;
use common::{OrderId, ProductId, UserId};
use domain::{CartEntry, Category, NewProduct, Order, Payment, Product, ProductFilter};

use crate::error::Result;

/// Persistence operations for the commerce core.
///
/// Atomicity contract: `checkout`, `process_payment`, `cancel_order`, and
/// `return_order` each execute as one atomic unit. Any error leaves no
/// partial writes behind — in particular a checkout that fails on its last
/// cart line must not keep the stock decrements of the earlier lines.
///
/// Concurrency contract: stock mutations serialize per product (row lock or
/// equivalent); checkout reserves lines in ascending product-id order so two
/// overlapping checkouts never deadlock on each other's locks; lifecycle
/// operations on one order are mutually exclusive via the order's own lock.
#[async_trait]
pub trait CommerceStore: Send + Sync {
    // -- Catalog --

    /// Creates a category.
    async fn create_category(&self, name: &str) -> Result<Category>;

    /// Lists all categories.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Creates a product. Fails with `CategoryNotFound` for an unknown
    /// category reference.
    async fn create_product(&self, new: NewProduct) -> Result<Product>;

    /// Fetches one product.
    async fn get_product(&self, product_id: ProductId) -> Result<Product>;

    /// Lists products matching the filter.
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>>;

    // -- Cart --

    /// Adds a line to the user's cart, merging quantity if the product is
    /// already present. The stock check here is advisory only; checkout
    /// re-validates under the row lock.
    async fn add_cart_line(&self, user: UserId, product_id: ProductId, quantity: u32)
    -> Result<()>;

    /// Returns the user's cart lines joined with current catalog data.
    async fn get_cart(&self, user: UserId) -> Result<Vec<CartEntry>>;

    // -- Order lifecycle --

    /// Converts the user's cart into a `PendingPayment` order: reserves stock
    /// per line in ascending product order, snapshots prices, clears the
    /// cart. All-or-nothing.
    async fn checkout(&self, user: UserId) -> Result<Order>;

    /// Settles payment for a pending order and completes it. The method
    /// string is validated after the status check, so an unsupported method
    /// on an already-settled order reports `PaymentAlreadyProcessed`.
    async fn process_payment(
        &self,
        user: UserId,
        order_id: OrderId,
        method: &str,
    ) -> Result<Payment>;

    /// Cancels a pending or completed order, restoring stock per item.
    async fn cancel_order(&self, user: UserId, order_id: OrderId) -> Result<Order>;

    /// Flags a completed order as returned within the 30-day window,
    /// restoring stock per item. The order status itself is unchanged.
    async fn return_order(&self, user: UserId, order_id: OrderId) -> Result<Order>;

    // -- Order queries --

    /// Fetches one of the caller's orders.
    async fn get_order(&self, user: UserId, order_id: OrderId) -> Result<Order>;

    /// Lists the caller's orders, newest first.
    async fn list_orders(&self, user: UserId) -> Result<Vec<Order>>;
}

//! In-memory store implementation for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CategoryId, OrderId, PaymentId, ProductId, UserId};
use domain::{
    CartEntry, Category, Money, NewProduct, Order, OrderItem, OrderStatus, Payment, PaymentMethod,
    PaymentStatus, Product, ProductFilter, ReturnStatus, cart::validate_quantity,
    error::OrderError,
};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::CommerceStore;

#[derive(Debug, Default)]
struct State {
    categories: HashMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    // BTreeMap keeps cart lines in ascending product-id order, matching the
    // reservation order the Postgres backend gets from ORDER BY.
    carts: HashMap<UserId, BTreeMap<ProductId, u32>>,
    orders: HashMap<OrderId, Order>,
    payments: Vec<Payment>,
}

/// In-memory commerce store.
///
/// A single writer lock is held for the whole of each mutating operation, so
/// every operation is atomic and stock mutations serialize exactly as the
/// row-locked Postgres backend serializes them. Checkout validates every
/// line before applying any decrement, which gives all-or-nothing semantics
/// without needing rollback.
#[derive(Clone, Default)]
pub struct InMemoryCommerceStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryCommerceStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current stock of a product, if it exists.
    pub async fn stock_of(&self, product_id: ProductId) -> Option<u32> {
        self.state
            .read()
            .await
            .products
            .get(&product_id)
            .map(|p| p.stock)
    }

    /// Returns the number of recorded payments.
    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }

    /// Rewrites an order's creation timestamp. Test knob for exercising the
    /// return window without waiting 30 days.
    pub async fn backdate_order(&self, order_id: OrderId, created_at: DateTime<Utc>) {
        if let Some(order) = self.state.write().await.orders.get_mut(&order_id) {
            order.created_at = created_at;
        }
    }
}

#[async_trait]
impl CommerceStore for InMemoryCommerceStore {
    async fn create_category(&self, name: &str) -> Result<Category> {
        let category = Category {
            id: CategoryId::new(),
            name: name.to_string(),
        };
        self.state
            .write()
            .await
            .categories
            .insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<_> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product> {
        let mut state = self.state.write().await;
        if let Some(category_id) = new.category_id
            && !state.categories.contains_key(&category_id)
        {
            return Err(OrderError::CategoryNotFound(category_id).into());
        }

        let now = Utc::now();
        let product = Product {
            id: ProductId::new(),
            name: new.name,
            description: new.description,
            unit_price: new.unit_price,
            stock: new.stock,
            category_id: new.category_id,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Product> {
        self.state
            .read()
            .await
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| OrderError::ProductNotFound(product_id).into())
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| {
                let category_name = p
                    .category_id
                    .and_then(|id| state.categories.get(&id))
                    .map(|c| c.name.as_str());
                filter.matches(p, category_name)
            })
            .cloned()
            .collect())
    }

    async fn add_cart_line(
        &self,
        user: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<()> {
        validate_quantity(quantity)?;

        let mut state = self.state.write().await;
        let product = state
            .products
            .get(&product_id)
            .ok_or(OrderError::ProductNotFound(product_id))?;
        if product.stock < quantity {
            return Err(OrderError::InsufficientStock {
                product_name: product.name.clone(),
            }
            .into());
        }

        *state
            .carts
            .entry(user)
            .or_default()
            .entry(product_id)
            .or_insert(0) += quantity;
        Ok(())
    }

    async fn get_cart(&self, user: UserId) -> Result<Vec<CartEntry>> {
        let state = self.state.read().await;
        let Some(cart) = state.carts.get(&user) else {
            return Ok(Vec::new());
        };
        Ok(cart
            .iter()
            .filter_map(|(product_id, &quantity)| {
                state.products.get(product_id).map(|p| CartEntry {
                    product_id: *product_id,
                    product_name: p.name.clone(),
                    unit_price: p.unit_price,
                    quantity,
                })
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn checkout(&self, user: UserId) -> Result<Order> {
        let mut state = self.state.write().await;

        let lines: Vec<(ProductId, u32)> = state
            .carts
            .get(&user)
            .map(|cart| cart.iter().map(|(id, qty)| (*id, *qty)).collect())
            .unwrap_or_default();
        if lines.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }

        // Phase 1: validate every line so a late failure leaves no partial
        // decrement behind.
        for (product_id, quantity) in &lines {
            let product = state
                .products
                .get(product_id)
                .ok_or(OrderError::ProductNotFound(*product_id))?;
            if product.stock < *quantity {
                return Err(OrderError::InsufficientStock {
                    product_name: product.name.clone(),
                }
                .into());
            }
        }

        // Phase 2: reserve stock and snapshot prices.
        let now = Utc::now();
        let mut items = Vec::with_capacity(lines.len());
        let mut total = Money::zero();
        for (product_id, quantity) in &lines {
            let product = state
                .products
                .get_mut(product_id)
                .ok_or(OrderError::ProductNotFound(*product_id))?;
            product.stock -= quantity;
            product.updated_at = now;
            total += product.unit_price.multiply(*quantity);
            items.push(OrderItem {
                product_id: *product_id,
                quantity: *quantity,
                unit_price: product.unit_price,
            });
        }

        let order = Order {
            id: OrderId::new(),
            user_id: user,
            total,
            status: OrderStatus::PendingPayment,
            return_status: None,
            created_at: now,
            items,
        };
        state.orders.insert(order.id, order.clone());
        state.carts.remove(&user);

        tracing::info!(order_id = %order.id, total = %order.total, "checkout committed");
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn process_payment(
        &self,
        user: UserId,
        order_id: OrderId,
        method: &str,
    ) -> Result<Payment> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        if order.user_id != user {
            return Err(OrderError::Unauthorized.into());
        }
        order.check_settleable()?;
        let method = PaymentMethod::parse(method)?;

        order.status = OrderStatus::Completed;
        let payment = Payment {
            id: PaymentId::new(),
            order_id,
            amount: order.total,
            method,
            status: PaymentStatus::Completed,
            transaction_id: None,
            created_at: Utc::now(),
        };
        state.payments.push(payment.clone());

        tracing::info!(%order_id, amount = %payment.amount, "payment settled");
        Ok(payment)
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_order(&self, user: UserId, order_id: OrderId) -> Result<Order> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get(&order_id)
            .filter(|o| o.user_id == user)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        order.check_cancellable()?;
        let items = order.items.clone();

        for item in &items {
            // Products removed from the catalog are skipped; the release is
            // per-item best effort.
            if let Some(product) = state.products.get_mut(&item.product_id) {
                product.stock += item.quantity;
            }
        }
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        order.status = OrderStatus::Cancelled;

        tracing::info!(%order_id, "order cancelled, stock released");
        Ok(order.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn return_order(&self, user: UserId, order_id: OrderId) -> Result<Order> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get(&order_id)
            .filter(|o| o.user_id == user)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        order.check_returnable(Utc::now())?;
        let items = order.items.clone();

        for item in &items {
            if let Some(product) = state.products.get_mut(&item.product_id) {
                product.stock += item.quantity;
            }
        }
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        order.return_status = Some(ReturnStatus::Returned);

        tracing::info!(%order_id, "order returned, stock released");
        Ok(order.clone())
    }

    async fn get_order(&self, user: UserId, order_id: OrderId) -> Result<Order> {
        self.state
            .read()
            .await
            .orders
            .get(&order_id)
            .filter(|o| o.user_id == user)
            .cloned()
            .ok_or_else(|| OrderError::OrderNotFound(order_id).into())
    }

    async fn list_orders(&self, user: UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|o| o.user_id == user)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use chrono::Duration;

    async fn seed_product(store: &InMemoryCommerceStore, name: &str, cents: i64, stock: u32) -> ProductId {
        store
            .create_product(NewProduct {
                name: name.to_string(),
                description: None,
                unit_price: Money::from_cents(cents),
                stock,
                category_id: None,
            })
            .await
            .unwrap()
            .id
    }

    fn order_err(err: StoreError) -> OrderError {
        match err {
            StoreError::Order(e) => e,
            other => panic!("expected domain error, got {other}"),
        }
    }

    #[tokio::test]
    async fn checkout_snapshots_prices_and_clears_cart() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        let b = seed_product(&store, "B", 2000, 1).await;

        store.add_cart_line(user, a, 2).await.unwrap();
        store.add_cart_line(user, b, 1).await.unwrap();

        let order = store.checkout(user).await.unwrap();
        assert_eq!(order.total.cents(), 4000);
        assert_eq!(order.status, OrderStatus::PendingPayment);
        assert_eq!(order.items.len(), 2);
        assert_eq!(store.stock_of(a).await, Some(3));
        assert_eq!(store.stock_of(b).await, Some(0));
        assert!(store.get_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn checkout_is_all_or_nothing() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        let b = seed_product(&store, "B", 2000, 0).await;

        store.add_cart_line(user, a, 2).await.unwrap();
        // The advisory check would reject adding B at zero stock, so stage
        // the stale cart line directly; checkout is the enforcement point.
        {
            let mut state = store.state.write().await;
            state.carts.entry(user).or_default().insert(b, 1);
        }

        let err = order_err(store.checkout(user).await.unwrap_err());
        match err {
            OrderError::InsufficientStock { product_name } => assert_eq!(product_name, "B"),
            other => panic!("unexpected error: {other}"),
        }
        // No partial decrement and no order persisted.
        assert_eq!(store.stock_of(a).await, Some(5));
        assert!(store.list_orders(user).await.unwrap().is_empty());
        // Cart survives the failed attempt.
        assert_eq!(store.get_cart(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn checkout_with_empty_cart_fails() {
        let store = InMemoryCommerceStore::new();
        let err = order_err(store.checkout(UserId::new()).await.unwrap_err());
        assert!(matches!(err, OrderError::EmptyCart));
    }

    #[tokio::test]
    async fn concurrent_checkouts_cannot_oversell() {
        let store = InMemoryCommerceStore::new();
        let product = seed_product(&store, "Last one", 5000, 1).await;
        let alice = UserId::new();
        let bob = UserId::new();
        store.add_cart_line(alice, product, 1).await.unwrap();
        store.add_cart_line(bob, product, 1).await.unwrap();

        let (s1, s2) = (store.clone(), store.clone());
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { s1.checkout(alice).await }),
            tokio::spawn(async move { s2.checkout(bob).await }),
        );
        let results = [r1.unwrap(), r2.unwrap()];

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one checkout must win");
        let loss = results.into_iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            order_err(loss.unwrap_err()),
            OrderError::InsufficientStock { .. }
        ));
        assert_eq!(store.stock_of(product).await, Some(0));
    }

    #[tokio::test]
    async fn cart_add_merges_duplicate_products() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 10).await;

        store.add_cart_line(user, a, 2).await.unwrap();
        store.add_cart_line(user, a, 3).await.unwrap();

        let cart = store.get_cart(user).await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 5);
        // Advisory check only: stock untouched by cart adds.
        assert_eq!(store.stock_of(a).await, Some(10));
    }

    #[tokio::test]
    async fn cart_add_validates_quantity_and_stock() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 2).await;

        assert!(matches!(
            order_err(store.add_cart_line(user, a, 0).await.unwrap_err()),
            OrderError::InvalidQuantity { quantity: 0 }
        ));
        assert!(matches!(
            order_err(store.add_cart_line(user, a, 3).await.unwrap_err()),
            OrderError::InsufficientStock { .. }
        ));
        assert!(matches!(
            order_err(
                store
                    .add_cart_line(user, ProductId::new(), 1)
                    .await
                    .unwrap_err()
            ),
            OrderError::ProductNotFound(_)
        ));
    }

    #[tokio::test]
    async fn payment_settles_once() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        store.add_cart_line(user, a, 1).await.unwrap();
        let order = store.checkout(user).await.unwrap();

        let payment = store.process_payment(user, order.id, "card").await.unwrap();
        assert_eq!(payment.amount.cents(), 1000);
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(
            store.get_order(user, order.id).await.unwrap().status,
            OrderStatus::Completed
        );

        let err = order_err(
            store
                .process_payment(user, order.id, "card")
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, OrderError::PaymentAlreadyProcessed));
        assert_eq!(store.payment_count().await, 1);
        assert_eq!(
            store.get_order(user, order.id).await.unwrap().status,
            OrderStatus::Completed
        );
    }

    #[tokio::test]
    async fn payment_rejects_wrong_owner_and_bad_method() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        store.add_cart_line(user, a, 1).await.unwrap();
        let order = store.checkout(user).await.unwrap();

        assert!(matches!(
            order_err(
                store
                    .process_payment(UserId::new(), order.id, "card")
                    .await
                    .unwrap_err()
            ),
            OrderError::Unauthorized
        ));
        assert!(matches!(
            order_err(
                store
                    .process_payment(user, order.id, "bank_transfer")
                    .await
                    .unwrap_err()
            ),
            OrderError::UnsupportedPaymentMethod { .. }
        ));
        // Unsupported method left the order unchanged.
        assert_eq!(
            store.get_order(user, order.id).await.unwrap().status,
            OrderStatus::PendingPayment
        );
    }

    #[tokio::test]
    async fn status_check_runs_before_method_check() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        store.add_cart_line(user, a, 1).await.unwrap();
        let order = store.checkout(user).await.unwrap();
        store.process_payment(user, order.id, "card").await.unwrap();

        let err = order_err(
            store
                .process_payment(user, order.id, "bank_transfer")
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, OrderError::PaymentAlreadyProcessed));
    }

    #[tokio::test]
    async fn cancel_releases_stock_and_is_not_repeatable() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        store.add_cart_line(user, a, 2).await.unwrap();
        let order = store.checkout(user).await.unwrap();
        assert_eq!(store.stock_of(a).await, Some(3));

        let cancelled = store.cancel_order(user, order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(store.stock_of(a).await, Some(5));

        let err = order_err(store.cancel_order(user, order.id).await.unwrap_err());
        assert!(matches!(err, OrderError::InvalidTransition { .. }));
        // No double release.
        assert_eq!(store.stock_of(a).await, Some(5));
    }

    #[tokio::test]
    async fn cancel_works_after_payment_as_a_void() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        store.add_cart_line(user, a, 2).await.unwrap();
        let order = store.checkout(user).await.unwrap();
        store.process_payment(user, order.id, "card").await.unwrap();

        let cancelled = store.cancel_order(user, order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(store.stock_of(a).await, Some(5));
    }

    #[tokio::test]
    async fn cancel_is_owner_scoped() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        store.add_cart_line(user, a, 1).await.unwrap();
        let order = store.checkout(user).await.unwrap();

        let err = order_err(
            store
                .cancel_order(UserId::new(), order.id)
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, OrderError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn return_flow_releases_stock_but_keeps_status() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        store.add_cart_line(user, a, 2).await.unwrap();
        let order = store.checkout(user).await.unwrap();
        store.process_payment(user, order.id, "card").await.unwrap();

        let returned = store.return_order(user, order.id).await.unwrap();
        assert_eq!(returned.status, OrderStatus::Completed);
        assert_eq!(returned.return_status, Some(ReturnStatus::Returned));
        assert_eq!(store.stock_of(a).await, Some(5));

        let err = order_err(store.return_order(user, order.id).await.unwrap_err());
        assert!(matches!(err, OrderError::AlreadyReturned));
        assert_eq!(store.stock_of(a).await, Some(5));
    }

    #[tokio::test]
    async fn cancel_after_return_does_not_release_stock_twice() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        store.add_cart_line(user, a, 2).await.unwrap();
        let order = store.checkout(user).await.unwrap();
        store.process_payment(user, order.id, "card").await.unwrap();
        store.return_order(user, order.id).await.unwrap();
        assert_eq!(store.stock_of(a).await, Some(5));

        let err = order_err(store.cancel_order(user, order.id).await.unwrap_err());
        assert!(matches!(err, OrderError::InvalidTransition { .. }));
        // The return already restored these units; stock must not inflate.
        assert_eq!(store.stock_of(a).await, Some(5));
    }

    #[tokio::test]
    async fn return_requires_completed_order() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 5).await;
        store.add_cart_line(user, a, 1).await.unwrap();
        let order = store.checkout(user).await.unwrap();

        let err = order_err(store.return_order(user, order.id).await.unwrap_err());
        assert!(matches!(err, OrderError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn return_window_boundary() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let a = seed_product(&store, "A", 1000, 10).await;

        // 31 days old: expired.
        store.add_cart_line(user, a, 1).await.unwrap();
        let stale = store.checkout(user).await.unwrap();
        store.process_payment(user, stale.id, "card").await.unwrap();
        store
            .backdate_order(stale.id, Utc::now() - Duration::days(31))
            .await;
        let err = order_err(store.return_order(user, stale.id).await.unwrap_err());
        assert!(matches!(err, OrderError::ReturnWindowExpired));

        // Exactly 30 days old: still inside the window.
        store.add_cart_line(user, a, 1).await.unwrap();
        let fresh = store.checkout(user).await.unwrap();
        store.process_payment(user, fresh.id, "card").await.unwrap();
        store
            .backdate_order(fresh.id, Utc::now() - Duration::days(30))
            .await;
        assert!(store.return_order(user, fresh.id).await.is_ok());
    }

    #[tokio::test]
    async fn stock_never_goes_negative() {
        let store = InMemoryCommerceStore::new();
        let product = seed_product(&store, "Scarce", 100, 3).await;
        let users: Vec<UserId> = (0..5).map(|_| UserId::new()).collect();
        for user in &users {
            // Bypass the advisory check so checkout is the only gate.
            let mut state = store.state.write().await;
            state.carts.entry(*user).or_default().insert(product, 2);
        }

        let mut handles = Vec::new();
        for user in users {
            let s = store.clone();
            handles.push(tokio::spawn(async move { s.checkout(user).await }));
        }
        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                wins += 1;
            }
        }

        // 3 units, 2 per cart: one winner, one unit left, never negative.
        assert_eq!(wins, 1);
        assert_eq!(store.stock_of(product).await, Some(1));
    }

    #[tokio::test]
    async fn list_orders_is_owner_scoped_and_newest_first() {
        let store = InMemoryCommerceStore::new();
        let user = UserId::new();
        let other = UserId::new();
        let a = seed_product(&store, "A", 1000, 10).await;

        store.add_cart_line(user, a, 1).await.unwrap();
        let first = store.checkout(user).await.unwrap();
        store.backdate_order(first.id, Utc::now() - Duration::days(1)).await;
        store.add_cart_line(user, a, 1).await.unwrap();
        let second = store.checkout(user).await.unwrap();
        store.add_cart_line(other, a, 1).await.unwrap();
        store.checkout(other).await.unwrap();

        let orders = store.list_orders(user).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[1].id, first.id);
    }

    #[tokio::test]
    async fn product_listing_filters() {
        let store = InMemoryCommerceStore::new();
        let tools = store.create_category("tools").await.unwrap();
        store
            .create_product(NewProduct {
                name: "Hammer".to_string(),
                description: None,
                unit_price: Money::from_cents(1500),
                stock: 3,
                category_id: Some(tools.id),
            })
            .await
            .unwrap();
        seed_product(&store, "Teapot", 800, 1).await;

        let in_tools = store
            .list_products(ProductFilter {
                category: Some("tools".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_tools.len(), 1);
        assert_eq!(in_tools[0].name, "Hammer");

        let by_search = store
            .list_products(ProductFilter {
                search: Some("tea".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].name, "Teapot");
    }

    #[tokio::test]
    async fn create_product_rejects_unknown_category() {
        let store = InMemoryCommerceStore::new();
        let err = order_err(
            store
                .create_product(NewProduct {
                    name: "Orphan".to_string(),
                    description: None,
                    unit_price: Money::from_cents(1),
                    stock: 1,
                    category_id: Some(CategoryId::new()),
                })
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, OrderError::CategoryNotFound(_)));
    }
}

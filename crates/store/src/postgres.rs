//! PostgreSQL-backed commerce store.
//!
//! Every lifecycle operation runs inside one transaction. Stock is mutated
//! only under a `SELECT ... FOR UPDATE` row lock on the product, and cart
//! lines are read in ascending product-id order so overlapping checkouts
//! acquire locks in the same sequence. An early `return Err(...)` drops the
//! transaction, which rolls it back.

use chrono::Utc;
use common::{CategoryId, OrderId, PaymentId, ProductId, UserId};
use domain::{
    CartEntry, Category, Money, NewProduct, Order, OrderItem, OrderStatus, Payment, PaymentMethod,
    PaymentStatus, Product, ProductFilter, ReturnStatus, cart::validate_quantity,
    error::OrderError,
};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::store::CommerceStore;

/// PostgreSQL commerce store.
#[derive(Clone)]
pub struct PostgresCommerceStore {
    pool: PgPool,
}

impl PostgresCommerceStore {
    /// Creates a new store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the given database URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            stock: u32::try_from(row.try_get::<i32, _>("stock")?).unwrap_or(0),
            category_id: row
                .try_get::<Option<Uuid>, _>("category_id")?
                .map(CategoryId::from_uuid),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_order(row: &PgRow, items: Vec<OrderItem>) -> Result<Order> {
        let status_raw: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status_raw).ok_or(StoreError::Decode {
            column: "status",
            value: status_raw,
        })?;
        let return_status = match row.try_get::<Option<String>, _>("return_status")? {
            Some(raw) => Some(ReturnStatus::parse(&raw).ok_or(StoreError::Decode {
                column: "return_status",
                value: raw,
            })?),
            None => None,
        };

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            total: Money::from_cents(row.try_get("total_cents")?),
            status,
            return_status,
            created_at: row.try_get("created_at")?,
            items,
        })
    }

    async fn fetch_items(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
    ) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            "SELECT product_id, quantity, unit_price_cents \
             FROM order_items WHERE order_id = $1 ORDER BY product_id ASC",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&mut **tx)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(OrderItem {
                    product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
                    quantity: u32::try_from(row.try_get::<i32, _>("quantity")?).unwrap_or(0),
                    unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
                })
            })
            .collect()
    }

    /// Locks the order row for the rest of the transaction and loads the
    /// order with its items. Owner-scoped: an order belonging to someone
    /// else is indistinguishable from a missing one.
    async fn lock_order(
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        order_id: OrderId,
    ) -> Result<Order> {
        let row = sqlx::query(
            "SELECT id, user_id, total_cents, status, return_status, created_at \
             FROM orders WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(order_id.as_uuid())
        .bind(user.as_uuid())
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(OrderError::OrderNotFound(order_id))?;

        let items = Self::fetch_items(tx, order_id).await?;
        Self::row_to_order(&row, items)
    }

    /// Restores stock for each order item. Products that have left the
    /// catalog are skipped.
    async fn release_stock(tx: &mut Transaction<'_, Postgres>, items: &[OrderItem]) -> Result<()> {
        for item in items {
            sqlx::query("UPDATE products SET stock = stock + $2, updated_at = $3 WHERE id = $1")
                .bind(item.product_id.as_uuid())
                .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
                .bind(Utc::now())
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CommerceStore for PostgresCommerceStore {
    async fn create_category(&self, name: &str) -> Result<Category> {
        let id = CategoryId::new();
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
            .bind(id.as_uuid())
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| {
                Ok(Category {
                    id: CategoryId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product> {
        if let Some(category_id) = new.category_id {
            let exists = sqlx::query("SELECT 1 AS one FROM categories WHERE id = $1")
                .bind(category_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
            if exists.is_none() {
                return Err(OrderError::CategoryNotFound(category_id).into());
            }
        }

        let id = ProductId::new();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO products \
             (id, name, description, unit_price_cents, stock, category_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
        )
        .bind(id.as_uuid())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.unit_price.cents())
        .bind(i32::try_from(new.stock).unwrap_or(i32::MAX))
        .bind(new.category_id.map(|id| id.as_uuid()))
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id,
            name: new.name,
            description: new.description,
            unit_price: new.unit_price,
            stock: new.stock,
            category_id: new.category_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Product> {
        let row = sqlx::query(
            "SELECT id, name, description, unit_price_cents, stock, category_id, \
             created_at, updated_at FROM products WHERE id = $1",
        )
        .bind(product_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::ProductNotFound(product_id))?;

        Self::row_to_product(&row)
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        let mut sql = String::from(
            "SELECT p.id, p.name, p.description, p.unit_price_cents, p.stock, \
             p.category_id, p.created_at, p.updated_at \
             FROM products p LEFT JOIN categories c ON c.id = p.category_id WHERE 1=1",
        );
        let mut param_count = 0;

        if filter.category.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND c.name = ${param_count}"));
        }
        if filter.search.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND p.name ILIKE ${param_count}"));
        }
        sql.push_str(" ORDER BY p.name ASC");

        let mut query = sqlx::query(&sql);
        if let Some(ref category) = filter.category {
            query = query.bind(category.clone());
        }
        if let Some(ref search) = filter.search {
            query = query.bind(format!("%{search}%"));
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_product).collect()
    }

    async fn add_cart_line(
        &self,
        user: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<()> {
        validate_quantity(quantity)?;

        // Advisory check only: no lock and no decrement here. Checkout is
        // the enforcement point.
        let row = sqlx::query("SELECT name, stock FROM products WHERE id = $1")
            .bind(product_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OrderError::ProductNotFound(product_id))?;
        let stock = u32::try_from(row.try_get::<i32, _>("stock")?).unwrap_or(0);
        if stock < quantity {
            return Err(OrderError::InsufficientStock {
                product_name: row.try_get("name")?,
            }
            .into());
        }

        sqlx::query(
            "INSERT INTO cart_items (user_id, product_id, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, product_id) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(user.as_uuid())
        .bind(product_id.as_uuid())
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_cart(&self, user: UserId) -> Result<Vec<CartEntry>> {
        let rows = sqlx::query(
            "SELECT ci.product_id, ci.quantity, p.name, p.unit_price_cents \
             FROM cart_items ci JOIN products p ON p.id = ci.product_id \
             WHERE ci.user_id = $1 ORDER BY ci.product_id ASC",
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CartEntry {
                    product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
                    product_name: row.try_get("name")?,
                    unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
                    quantity: u32::try_from(row.try_get::<i32, _>("quantity")?).unwrap_or(0),
                })
            })
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn checkout(&self, user: UserId) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        // Ascending product-id order fixes the lock acquisition sequence
        // across concurrent checkouts that share products.
        let lines = sqlx::query(
            "SELECT product_id, quantity FROM cart_items \
             WHERE user_id = $1 ORDER BY product_id ASC",
        )
        .bind(user.as_uuid())
        .fetch_all(&mut *tx)
        .await?;
        if lines.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }

        let order_id = OrderId::new();
        let now = Utc::now();
        let mut items = Vec::with_capacity(lines.len());
        let mut total = Money::zero();

        for line in &lines {
            let product_id = ProductId::from_uuid(line.try_get::<Uuid, _>("product_id")?);
            let quantity: i32 = line.try_get("quantity")?;

            let product = sqlx::query(
                "SELECT name, unit_price_cents, stock FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(product_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(OrderError::ProductNotFound(product_id))?;

            let stock: i32 = product.try_get("stock")?;
            if stock < quantity {
                // Dropping the transaction rolls back every reservation made
                // so far in this attempt.
                return Err(OrderError::InsufficientStock {
                    product_name: product.try_get("name")?,
                }
                .into());
            }

            sqlx::query("UPDATE products SET stock = stock - $2, updated_at = $3 WHERE id = $1")
                .bind(product_id.as_uuid())
                .bind(quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?;

            let unit_price = Money::from_cents(product.try_get("unit_price_cents")?);
            total += unit_price.multiply(u32::try_from(quantity).unwrap_or(0));
            items.push(OrderItem {
                product_id,
                quantity: u32::try_from(quantity).unwrap_or(0),
                unit_price,
            });
        }

        sqlx::query(
            "INSERT INTO orders (id, user_id, total_cents, status, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order_id.as_uuid())
        .bind(user.as_uuid())
        .bind(total.cents())
        .bind(OrderStatus::PendingPayment.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price_cents) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(order_id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .bind(item.unit_price.cents())
            .execute(&mut *tx)
            .await?;
        }

        // The cart is cleared only inside the same transaction as the order
        // creation; a rollback keeps the cart intact.
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(%order_id, total = %total, "checkout committed");

        Ok(Order {
            id: order_id,
            user_id: user,
            total,
            status: OrderStatus::PendingPayment,
            return_status: None,
            created_at: now,
            items,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn process_payment(
        &self,
        user: UserId,
        order_id: OrderId,
        method: &str,
    ) -> Result<Payment> {
        let mut tx = self.pool.begin().await?;

        // The order row lock makes settlement and cancel/return mutually
        // exclusive on the same order.
        let row = sqlx::query(
            "SELECT id, user_id, total_cents, status, return_status, created_at \
             FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(OrderError::OrderNotFound(order_id))?;
        let order = Self::row_to_order(&row, Vec::new())?;

        if order.user_id != user {
            return Err(OrderError::Unauthorized.into());
        }
        order.check_settleable()?;
        let method = PaymentMethod::parse(method)?;

        let payment = Payment {
            id: PaymentId::new(),
            order_id,
            amount: order.total,
            method,
            status: PaymentStatus::Completed,
            transaction_id: None,
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO payments (id, order_id, amount_cents, method, status, transaction_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(payment.id.as_uuid())
        .bind(order_id.as_uuid())
        .bind(payment.amount.cents())
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(&payment.transaction_id)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order_id.as_uuid())
            .bind(OrderStatus::Completed.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(%order_id, amount = %payment.amount, "payment settled");
        Ok(payment)
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_order(&self, user: UserId, order_id: OrderId) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = Self::lock_order(&mut tx, user, order_id).await?;
        order.check_cancellable()?;

        Self::release_stock(&mut tx, &order.items).await?;
        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order_id.as_uuid())
            .bind(OrderStatus::Cancelled.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(%order_id, "order cancelled, stock released");

        order.status = OrderStatus::Cancelled;
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn return_order(&self, user: UserId, order_id: OrderId) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = Self::lock_order(&mut tx, user, order_id).await?;
        order.check_returnable(Utc::now())?;

        Self::release_stock(&mut tx, &order.items).await?;
        sqlx::query("UPDATE orders SET return_status = $2 WHERE id = $1")
            .bind(order_id.as_uuid())
            .bind(ReturnStatus::Returned.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(%order_id, "order returned, stock released");

        order.return_status = Some(ReturnStatus::Returned);
        Ok(order)
    }

    async fn get_order(&self, user: UserId, order_id: OrderId) -> Result<Order> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "SELECT id, user_id, total_cents, status, return_status, created_at \
             FROM orders WHERE id = $1 AND user_id = $2",
        )
        .bind(order_id.as_uuid())
        .bind(user.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(OrderError::OrderNotFound(order_id))?;
        let items = Self::fetch_items(&mut tx, order_id).await?;
        tx.commit().await?;
        Self::row_to_order(&row, items)
    }

    async fn list_orders(&self, user: UserId) -> Result<Vec<Order>> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            "SELECT id, user_id, total_cents, status, return_status, created_at \
             FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user.as_uuid())
        .fetch_all(&mut *tx)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let order_id = OrderId::from_uuid(row.try_get::<Uuid, _>("id")?);
            let items = Self::fetch_items(&mut tx, order_id).await?;
            orders.push(Self::row_to_order(row, items)?);
        }
        tx.commit().await?;
        Ok(orders)
    }
}

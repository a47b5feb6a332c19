//! Domain layer for the commerce backend.
//!
//! Pure types and rules, no I/O:
//! - entities mirroring the relational rows (products, carts, orders, payments)
//! - the order status state machine and the return-window rule
//! - the `OrderError` taxonomy shared by every storage backend

pub mod cart;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod product;

pub use cart::CartEntry;
pub use error::OrderError;
pub use money::Money;
pub use order::{Order, OrderItem, OrderStatus, ReturnStatus, RETURN_WINDOW_DAYS};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use product::{Category, NewProduct, Product, ProductFilter};

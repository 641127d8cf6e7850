//! Domain models for storefront.
//!
//! These are validated domain objects and response shapes, separate from the
//! database row types in [`crate::db`].

pub mod contact;
pub mod order;
pub mod product;
pub mod review;
pub mod session;

pub use contact::NewContactMessage;
pub use order::{
    NewOrder, NewOrderItem, Order, OrderItem, OrderTracking, PaymentDetails, PaymentInstructions,
};
pub use product::{CategoryEntry, NewProduct, ProductDetail};
pub use review::{NewReview, Review};
pub use session::CartView;

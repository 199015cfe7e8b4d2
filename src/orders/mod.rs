//! Checkout and order management.
//!
//! Checkout turns a user's cart into one or more `pending` orders inside a single
//! unit of work: stock is validated and decremented, order and order-item rows are
//! written, and the cart is deleted. Either all of it commits or none of it does.

pub mod checkout;
pub mod error;
pub mod order_number;
pub mod partition;
pub mod queries;
pub mod status;
pub mod stock;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{OrderEntity, VendorInfo};

pub use checkout::{checkout, checkout_multi_vendor};
pub use error::{OrderError, OrderResult};
pub use order_number::OrderNumberGenerator;
pub use status::{OrderStatus, update_order_status};

/// One cart item joined with its product's current price and stock, and the vendor
/// that owns the product (product owner user -> vendor owner user).
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub cart_item_id: i32,
    pub quantity: i32,
    pub product_id: i32,
    pub product_name: String,
    pub price: f64,
    pub stock: i32,
    pub vendor: Option<VendorInfo>,
}

/// Payment and shipping details supplied at checkout.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub shipping_city: String,
    #[serde(default)]
    pub shipping_state: String,
    #[serde(default, alias = "shipping_cep")]
    pub shipping_postal_code: String,
    pub buyers_id: Option<i32>,
}

impl CheckoutRequest {
    /// Every field but the buyer reference must be non-blank.
    pub fn validate(&self) -> OrderResult<()> {
        let required = [
            ("payment_method", &self.payment_method),
            ("shipping_address", &self.shipping_address),
            ("shipping_city", &self.shipping_city),
            ("shipping_state", &self.shipping_state),
            ("shipping_postal_code", &self.shipping_postal_code),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(OrderError::InvalidInput(format!("{field} is required"))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderWithVendor {
    #[serde(flatten)]
    pub order: OrderEntity,
    pub vendor: VendorInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MultiVendorCheckout {
    pub orders: Vec<OrderWithVendor>,
    pub total_orders: usize,
}

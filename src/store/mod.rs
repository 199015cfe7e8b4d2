//! Persistence seam for carts, products and orders.
//!
//! [`Store`] covers single-statement reads and writes. Anything that must be
//! atomic goes through a [`UnitOfWork`] obtained from [`Store::begin`], which is
//! only made durable by [`UnitOfWork::commit`].

#[cfg(test)]
pub mod memory;
pub mod pg;

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    models::{
        CartEntity, CartItemEntity, CreateCartEntity, CreateCartItemEntity, CreateOrderEntity,
        CreateOrderItemEntity, OrderEntity, OrderItemEntity, UpdateCartItemEntity, VendorInfo,
    },
    orders::{
        CartLine, OrderWithVendor,
        queries::{OrderItemDetail, VendorOrder},
    },
};

pub use pg::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Opens an atomic unit of work.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;

    /// Inserts a cart. Returns `None` when the user already owns a cart.
    async fn create_cart(&self, cart: CreateCartEntity) -> Result<Option<CartEntity>>;

    async fn find_cart(&self, cart_id: i32) -> Result<Option<CartEntity>>;

    async fn find_cart_by_user(&self, user_id: i32) -> Result<Option<CartEntity>>;

    async fn cart_items(&self, cart_id: i32) -> Result<Vec<CartItemEntity>>;

    /// Returns `false` when no such item exists.
    async fn delete_cart_item(&self, item_id: i32) -> Result<bool>;

    async fn find_order(&self, order_id: i32) -> Result<Option<OrderEntity>>;

    async fn find_vendor(&self, vendor_id: i32) -> Result<Option<VendorInfo>>;

    /// Items of an order joined with product name and SKU.
    async fn order_item_details(&self, order_id: i32) -> Result<Vec<OrderItemDetail>>;

    /// Newest first.
    async fn orders_for_user(&self, user_id: i32) -> Result<Vec<OrderEntity>>;

    /// Newest first, each joined with the selling vendor.
    async fn orders_for_user_with_vendor(&self, user_id: i32) -> Result<Vec<OrderWithVendor>>;

    /// Newest first, each joined with the purchasing user and buyer profile.
    async fn orders_for_vendor(&self, vendor_id: i32) -> Result<Vec<VendorOrder>>;

    async fn find_vendor_order(&self, vendor_id: i32, order_id: i32)
    -> Result<Option<VendorOrder>>;

    /// `(status, total)` of every order sold by the vendor.
    async fn vendor_order_totals(&self, vendor_id: i32) -> Result<Vec<(String, f64)>>;

    /// Sets the status of an order only if it belongs to `vendor_id`.
    async fn set_order_status(
        &self,
        order_id: i32,
        vendor_id: i32,
        status: &str,
    ) -> Result<Option<OrderEntity>>;
}

/// An open transaction. Dropping it without calling [`UnitOfWork::commit`] discards
/// every write made through it.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn find_cart(&mut self, cart_id: i32) -> Result<Option<CartEntity>>;

    async fn find_cart_by_user(&mut self, user_id: i32) -> Result<Option<CartEntity>>;

    /// Cart items joined with product price/stock and the owning vendor, if any.
    async fn load_cart_lines(&mut self, cart_id: i32) -> Result<Vec<CartLine>>;

    async fn product_stock(&mut self, product_id: i32) -> Result<Option<i32>>;

    async fn find_cart_item(&mut self, item_id: i32) -> Result<Option<CartItemEntity>>;

    async fn find_cart_item_by_product(
        &mut self,
        cart_id: i32,
        product_id: i32,
    ) -> Result<Option<CartItemEntity>>;

    async fn insert_cart_item(&mut self, item: CreateCartItemEntity) -> Result<CartItemEntity>;

    async fn update_cart_item(
        &mut self,
        item_id: i32,
        patch: UpdateCartItemEntity,
    ) -> Result<CartItemEntity>;

    async fn insert_order(&mut self, order: CreateOrderEntity) -> Result<OrderEntity>;

    async fn insert_order_item(&mut self, item: CreateOrderItemEntity) -> Result<OrderItemEntity>;

    /// Takes `quantity` off the product's stock unless that would go below zero.
    /// Returns `false` when the stock was not decremented.
    async fn decrement_stock(&mut self, product_id: i32, quantity: i32) -> Result<bool>;

    async fn delete_cart_items(&mut self, cart_id: i32) -> Result<usize>;

    async fn delete_cart(&mut self, cart_id: i32) -> Result<bool>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

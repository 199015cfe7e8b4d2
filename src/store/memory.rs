//! In-memory [`Store`] for tests.
//!
//! A unit of work operates on a private copy of the tables and publishes it back
//! on commit, which gives the all-or-nothing behaviour of a database transaction.
//! Every write bumps a version; a commit whose snapshot is older than the shared
//! tables fails instead of overwriting the writes made in between.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::Utc;

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

use super::{Store, UnitOfWork};

#[derive(Debug, Clone)]
struct UserRow {
    id: i32,
    name: String,
}

#[derive(Debug, Clone)]
struct VendorRow {
    info: VendorInfo,
    users_id: i32,
}

#[derive(Debug, Clone)]
struct BuyerRow {
    id: i32,
    phone: String,
}

#[derive(Debug, Clone)]
struct ProductRow {
    id: i32,
    sku: String,
    name: String,
    price: f64,
    stock: i32,
    users_id: i32,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    version: u64,
    next_id: i32,
    users: Vec<UserRow>,
    vendors: Vec<VendorRow>,
    buyers: Vec<BuyerRow>,
    products: Vec<ProductRow>,
    carts: Vec<CartEntity>,
    cart_items: Vec<CartItemEntity>,
    orders: Vec<OrderEntity>,
    order_items: Vec<OrderItemEntity>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Every vendor profile of the product's owner, like the SQL left join.
    fn vendors_of_product(&self, product: &ProductRow) -> Vec<Option<VendorInfo>> {
        let vendors: Vec<Option<VendorInfo>> = self
            .vendors
            .iter()
            .filter(|vendor| vendor.users_id == product.users_id)
            .map(|vendor| Some(vendor.info.clone()))
            .collect();
        if vendors.is_empty() { vec![None] } else { vendors }
    }

    fn vendor_order(&self, order: &OrderEntity) -> VendorOrder {
        let buyer_name = self
            .users
            .iter()
            .find(|user| user.id == order.users_id)
            .map(|user| user.name.clone())
            .unwrap_or_default();
        let buyer_phone = order
            .buyers_id
            .and_then(|id| self.buyers.iter().find(|buyer| buyer.id == id))
            .map(|buyer| buyer.phone.clone())
            .unwrap_or_default();

        VendorOrder {
            order: order.clone(),
            buyer_name,
            buyer_phone,
        }
    }

    fn newest_first(&self, keep: impl Fn(&OrderEntity) -> bool) -> Vec<OrderEntity> {
        let mut orders: Vec<OrderEntity> = self.orders.iter().filter(|o| keep(o)).cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        orders
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    failing_stock_update: Option<i32>,
    cart_already_deleted: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every stock decrement of `product_id` fail as a persistence error.
    pub fn failing_stock_update(mut self, product_id: i32) -> Self {
        self.failing_stock_update = Some(product_id);
        self
    }

    /// Makes every unit of work find its cart gone when it tries to delete it, as
    /// when a concurrent checkout of the same cart committed first.
    pub fn cart_already_deleted(mut self) -> Self {
        self.cart_already_deleted = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    fn write(&self) -> MutexGuard<'_, Tables> {
        let mut tables = self.lock();
        tables.version += 1;
        tables
    }

    pub fn add_user(&self, name: &str) -> i32 {
        let mut tables = self.write();
        let id = tables.next_id();
        tables.users.push(UserRow {
            id,
            name: name.into(),
        });
        id
    }

    pub fn add_vendor(&self, users_id: i32, name: &str) -> VendorInfo {
        let mut tables = self.write();
        let info = VendorInfo {
            id: tables.next_id(),
            name: name.into(),
            email: format!("contact@{}.example", name.to_lowercase()),
            phone: "+55 11 5555-0000".into(),
        };
        tables.vendors.push(VendorRow {
            info: info.clone(),
            users_id,
        });
        info
    }

    pub fn add_buyer(&self, phone: &str) -> i32 {
        let mut tables = self.write();
        let id = tables.next_id();
        tables.buyers.push(BuyerRow {
            id,
            phone: phone.into(),
        });
        id
    }

    pub fn add_product(&self, owner_user_id: i32, name: &str, price: f64, stock: i32) -> i32 {
        let mut tables = self.write();
        let id = tables.next_id();
        tables.products.push(ProductRow {
            id,
            sku: format!("SKU-{id}"),
            name: name.into(),
            price,
            stock,
            users_id: owner_user_id,
        });
        id
    }

    pub fn add_cart(&self, users_id: i32) -> CartEntity {
        let mut tables = self.write();
        let cart = CartEntity {
            id: tables.next_id(),
            code: "TESTCART1".into(),
            created_at: Utc::now(),
            users_id: Some(users_id),
        };
        tables.carts.push(cart.clone());
        cart
    }

    pub fn add_cart_item(&self, cart_id: i32, products_id: i32, quantity: i32) -> CartItemEntity {
        let mut tables = self.write();
        let item = CartItemEntity {
            id: tables.next_id(),
            quantity,
            cart_id,
            products_id,
        };
        tables.cart_items.push(item.clone());
        item
    }

    pub fn set_price(&self, product_id: i32, price: f64) {
        let mut tables = self.write();
        if let Some(product) = tables.products.iter_mut().find(|p| p.id == product_id) {
            product.price = price;
        }
    }

    pub fn stock(&self, product_id: i32) -> i32 {
        self.lock()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.stock)
            .unwrap()
    }

    pub fn all_orders(&self) -> Vec<OrderEntity> {
        self.lock().orders.clone()
    }

    pub fn all_order_items(&self) -> Vec<OrderItemEntity> {
        self.lock().order_items.clone()
    }

    pub fn all_carts(&self) -> Vec<CartEntity> {
        self.lock().carts.clone()
    }

    pub fn all_cart_items(&self) -> Vec<CartItemEntity> {
        self.lock().cart_items.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let working = self.lock().clone();
        Ok(Box::new(MemoryUnitOfWork {
            tables: Arc::clone(&self.tables),
            base_version: working.version,
            working,
            failing_stock_update: self.failing_stock_update,
            cart_already_deleted: self.cart_already_deleted,
        }))
    }

    async fn create_cart(&self, cart: CreateCartEntity) -> Result<Option<CartEntity>> {
        let mut tables = self.write();
        if cart.users_id.is_some() && tables.carts.iter().any(|c| c.users_id == cart.users_id) {
            return Ok(None);
        }
        let cart = CartEntity {
            id: tables.next_id(),
            code: cart.code,
            created_at: Utc::now(),
            users_id: cart.users_id,
        };
        tables.carts.push(cart.clone());
        Ok(Some(cart))
    }

    async fn find_cart(&self, cart_id: i32) -> Result<Option<CartEntity>> {
        Ok(self.lock().carts.iter().find(|c| c.id == cart_id).cloned())
    }

    async fn find_cart_by_user(&self, user_id: i32) -> Result<Option<CartEntity>> {
        Ok(self
            .lock()
            .carts
            .iter()
            .find(|c| c.users_id == Some(user_id))
            .cloned())
    }

    async fn cart_items(&self, cart_id: i32) -> Result<Vec<CartItemEntity>> {
        Ok(self
            .lock()
            .cart_items
            .iter()
            .filter(|item| item.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn delete_cart_item(&self, item_id: i32) -> Result<bool> {
        let mut tables = self.write();
        let before = tables.cart_items.len();
        tables.cart_items.retain(|item| item.id != item_id);
        Ok(tables.cart_items.len() != before)
    }

    async fn find_order(&self, order_id: i32) -> Result<Option<OrderEntity>> {
        Ok(self.lock().orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn find_vendor(&self, vendor_id: i32) -> Result<Option<VendorInfo>> {
        Ok(self
            .lock()
            .vendors
            .iter()
            .find(|v| v.info.id == vendor_id)
            .map(|v| v.info.clone()))
    }

    async fn order_item_details(&self, order_id: i32) -> Result<Vec<OrderItemDetail>> {
        let tables = self.lock();
        tables
            .order_items
            .iter()
            .filter(|item| item.orders_id == order_id)
            .map(|item| {
                let product = tables
                    .products
                    .iter()
                    .find(|p| p.id == item.products_id)
                    .ok_or_else(|| anyhow!("product {} missing", item.products_id))?;
                Ok(OrderItemDetail::new(
                    item.clone(),
                    product.name.clone(),
                    product.sku.clone(),
                ))
            })
            .collect()
    }

    async fn orders_for_user(&self, user_id: i32) -> Result<Vec<OrderEntity>> {
        Ok(self.lock().newest_first(|o| o.users_id == user_id))
    }

    async fn orders_for_user_with_vendor(&self, user_id: i32) -> Result<Vec<OrderWithVendor>> {
        let tables = self.lock();
        Ok(tables
            .newest_first(|o| o.users_id == user_id)
            .into_iter()
            .filter_map(|order| {
                let vendor = tables.vendors.iter().find(|v| v.info.id == order.vendors_id)?;
                Some(OrderWithVendor {
                    order,
                    vendor: vendor.info.clone(),
                })
            })
            .collect())
    }

    async fn orders_for_vendor(&self, vendor_id: i32) -> Result<Vec<VendorOrder>> {
        let tables = self.lock();
        Ok(tables
            .newest_first(|o| o.vendors_id == vendor_id)
            .iter()
            .map(|order| tables.vendor_order(order))
            .collect())
    }

    async fn find_vendor_order(
        &self,
        vendor_id: i32,
        order_id: i32,
    ) -> Result<Option<VendorOrder>> {
        let tables = self.lock();
        Ok(tables
            .orders
            .iter()
            .find(|o| o.id == order_id && o.vendors_id == vendor_id)
            .map(|order| tables.vendor_order(order)))
    }

    async fn vendor_order_totals(&self, vendor_id: i32) -> Result<Vec<(String, f64)>> {
        Ok(self
            .lock()
            .orders
            .iter()
            .filter(|o| o.vendors_id == vendor_id)
            .map(|o| (o.status.clone(), o.total))
            .collect())
    }

    async fn set_order_status(
        &self,
        order_id: i32,
        vendor_id: i32,
        status: &str,
    ) -> Result<Option<OrderEntity>> {
        let mut tables = self.write();
        Ok(tables
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && o.vendors_id == vendor_id)
            .map(|order| {
                order.status = status.into();
                order.clone()
            }))
    }
}

pub struct MemoryUnitOfWork {
    tables: Arc<Mutex<Tables>>,
    base_version: u64,
    working: Tables,
    failing_stock_update: Option<i32>,
    cart_already_deleted: bool,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_cart(&mut self, cart_id: i32) -> Result<Option<CartEntity>> {
        Ok(self.working.carts.iter().find(|c| c.id == cart_id).cloned())
    }

    async fn find_cart_by_user(&mut self, user_id: i32) -> Result<Option<CartEntity>> {
        Ok(self
            .working
            .carts
            .iter()
            .find(|c| c.users_id == Some(user_id))
            .cloned())
    }

    async fn load_cart_lines(&mut self, cart_id: i32) -> Result<Vec<CartLine>> {
        let tables = &self.working;
        tables
            .cart_items
            .iter()
            .filter(|item| item.cart_id == cart_id)
            .map(|item| {
                let product = tables
                    .products
                    .iter()
                    .find(|p| p.id == item.products_id)
                    .ok_or_else(|| anyhow!("product {} missing", item.products_id))?;
                Ok(tables
                    .vendors_of_product(product)
                    .into_iter()
                    .map(|vendor| CartLine {
                        cart_item_id: item.id,
                        quantity: item.quantity,
                        product_id: product.id,
                        product_name: product.name.clone(),
                        price: product.price,
                        stock: product.stock,
                        vendor,
                    })
                    .collect::<Vec<_>>())
            })
            .collect::<Result<Vec<_>>>()
            .map(|lines| lines.into_iter().flatten().collect())
    }

    async fn product_stock(&mut self, product_id: i32) -> Result<Option<i32>> {
        Ok(self
            .working
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.stock))
    }

    async fn find_cart_item(&mut self, item_id: i32) -> Result<Option<CartItemEntity>> {
        Ok(self
            .working
            .cart_items
            .iter()
            .find(|item| item.id == item_id)
            .cloned())
    }

    async fn find_cart_item_by_product(
        &mut self,
        cart_id: i32,
        product_id: i32,
    ) -> Result<Option<CartItemEntity>> {
        Ok(self
            .working
            .cart_items
            .iter()
            .find(|item| item.cart_id == cart_id && item.products_id == product_id)
            .cloned())
    }

    async fn insert_cart_item(&mut self, item: CreateCartItemEntity) -> Result<CartItemEntity> {
        let item = CartItemEntity {
            id: self.working.next_id(),
            quantity: item.quantity,
            cart_id: item.cart_id,
            products_id: item.products_id,
        };
        self.working.cart_items.push(item.clone());
        Ok(item)
    }

    async fn update_cart_item(
        &mut self,
        item_id: i32,
        patch: UpdateCartItemEntity,
    ) -> Result<CartItemEntity> {
        let item = self
            .working
            .cart_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| anyhow!("cart item {item_id} missing"))?;
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        Ok(item.clone())
    }

    async fn insert_order(&mut self, order: CreateOrderEntity) -> Result<OrderEntity> {
        if self
            .working
            .orders
            .iter()
            .any(|o| o.order_number == order.order_number)
        {
            bail!("duplicate order number {}", order.order_number);
        }
        let order = OrderEntity {
            id: self.working.next_id(),
            order_number: order.order_number,
            status: order.status,
            total: order.total,
            payment_method: order.payment_method,
            shipping_address: order.shipping_address,
            shipping_city: order.shipping_city,
            shipping_state: order.shipping_state,
            shipping_postal_code: order.shipping_postal_code,
            created_at: Utc::now(),
            users_id: order.users_id,
            vendors_id: order.vendors_id,
            buyers_id: order.buyers_id,
        };
        self.working.orders.push(order.clone());
        Ok(order)
    }

    async fn insert_order_item(&mut self, item: CreateOrderItemEntity) -> Result<OrderItemEntity> {
        let item = OrderItemEntity {
            id: self.working.next_id(),
            quantity: item.quantity,
            price: item.price,
            orders_id: item.orders_id,
            products_id: item.products_id,
        };
        self.working.order_items.push(item.clone());
        Ok(item)
    }

    async fn decrement_stock(&mut self, product_id: i32, quantity: i32) -> Result<bool> {
        if self.failing_stock_update == Some(product_id) {
            bail!("connection reset while updating product {product_id}");
        }
        match self
            .working
            .products
            .iter_mut()
            .find(|p| p.id == product_id && p.stock >= quantity)
        {
            Some(product) => {
                product.stock -= quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_cart_items(&mut self, cart_id: i32) -> Result<usize> {
        let before = self.working.cart_items.len();
        self.working.cart_items.retain(|item| item.cart_id != cart_id);
        Ok(before - self.working.cart_items.len())
    }

    async fn delete_cart(&mut self, cart_id: i32) -> Result<bool> {
        if self.cart_already_deleted {
            return Ok(false);
        }
        let before = self.working.carts.len();
        self.working.carts.retain(|cart| cart.id != cart_id);
        Ok(self.working.carts.len() != before)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if tables.version != self.base_version {
            bail!("tables changed since this unit of work began");
        }
        let mut working = self.working;
        working.version = self.base_version + 1;
        *tables = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stale_unit_of_work_cannot_overwrite_a_newer_commit() {
        let store = MemoryStore::new();
        let owner = store.add_user("Acme owner");
        store.add_vendor(owner, "Acme");
        let honey = store.add_product(owner, "Honey", 1.0, 10);

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        assert!(first.decrement_stock(honey, 3).await.unwrap());
        first.commit().await.unwrap();

        assert!(second.decrement_stock(honey, 5).await.unwrap());
        assert!(second.commit().await.is_err());

        assert_eq!(store.stock(honey), 7);
    }

    #[tokio::test]
    async fn direct_write_invalidates_an_open_unit_of_work() {
        let store = MemoryStore::new();
        let buyer = store.add_user("Ana");
        let cart = store.add_cart(buyer);

        let mut uow = store.begin().await.unwrap();
        assert!(uow.delete_cart(cart.id).await.unwrap());
        store.add_user("Bruno");

        assert!(uow.commit().await.is_err());
        assert_eq!(store.all_carts(), vec![cart]);
    }

    #[tokio::test]
    async fn commit_after_rollback_of_another_unit_still_succeeds() {
        let store = MemoryStore::new();
        let buyer = store.add_user("Ana");
        let cart = store.add_cart(buyer);

        let abandoned = store.begin().await.unwrap();
        let mut uow = store.begin().await.unwrap();
        abandoned.rollback().await.unwrap();

        assert!(uow.delete_cart(cart.id).await.unwrap());
        uow.commit().await.unwrap();
        assert!(store.all_carts().is_empty());
    }
}

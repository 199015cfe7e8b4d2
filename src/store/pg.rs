//! Postgres [`Store`] on a bb8 pool of `diesel-async` connections.

use anyhow::{Context, Result};
use async_trait::async_trait;
use diesel::{
    ExpressionMethods, JoinOnDsl, NullableExpressionMethods, OptionalExtension, QueryDsl,
    SelectableHelper,
    result::{DatabaseErrorKind, Error as DieselError},
};
use diesel_async::{
    AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager,
    pooled_connection::bb8::{Pool, PooledConnection},
};

use crate::{
    models::{
        CartEntity, CartItemEntity, CreateCartEntity, CreateCartItemEntity, CreateOrderEntity,
        CreateOrderItemEntity, OrderEntity, OrderItemEntity, ProductSnapshot,
        UpdateCartItemEntity, VendorInfo,
    },
    orders::{
        CartLine, OrderWithVendor,
        queries::{OrderItemDetail, VendorOrder},
    },
    schema::{buyers, cart, cart_items, order_items, orders, products, users, vendors},
};

use super::{Store, UnitOfWork};

pub type DbPool = Pool<AsyncPgConnection>;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Maps `(order, buyer name, buyer phone)` rows onto [`VendorOrder`].
fn vendor_order(
    (order, buyer_name, buyer_phone): (OrderEntity, String, Option<String>),
) -> VendorOrder {
    VendorOrder {
        order,
        buyer_name,
        buyer_phone: buyer_phone.unwrap_or_default(),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let mut conn = self
            .pool
            .get_owned()
            .await
            .context("Failed to obtain a DB connection pool")?;

        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .context("Failed to begin transaction")?;

        Ok(Box::new(PgUnitOfWork { conn }))
    }

    async fn create_cart(&self, new_cart: CreateCartEntity) -> Result<Option<CartEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let created = diesel::insert_into(cart::table)
            .values(new_cart)
            .returning(CartEntity::as_returning())
            .get_result(conn)
            .await;

        match created {
            Ok(cart) => Ok(Some(cart)),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Ok(None),
            Err(err) => Err(err).context("Failed to create cart"),
        }
    }

    async fn find_cart(&self, cart_id: i32) -> Result<Option<CartEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        cart::table
            .find(cart_id)
            .select(CartEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get cart")
    }

    async fn find_cart_by_user(&self, user_id: i32) -> Result<Option<CartEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        cart::table
            .filter(cart::users_id.eq(user_id))
            .select(CartEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get cart by user")
    }

    async fn cart_items(&self, cart_id: i32) -> Result<Vec<CartItemEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        cart_items::table
            .filter(cart_items::cart_id.eq(cart_id))
            .order_by(cart_items::id)
            .select(CartItemEntity::as_select())
            .get_results(conn)
            .await
            .context("Failed to get cart items")
    }

    async fn delete_cart_item(&self, item_id: i32) -> Result<bool> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let deleted = diesel::delete(cart_items::table.find(item_id))
            .execute(conn)
            .await
            .context("Failed to delete cart item")?;
        Ok(deleted > 0)
    }

    async fn find_order(&self, order_id: i32) -> Result<Option<OrderEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        orders::table
            .find(order_id)
            .select(OrderEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get order")
    }

    async fn find_vendor(&self, vendor_id: i32) -> Result<Option<VendorInfo>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        vendors::table
            .find(vendor_id)
            .select(VendorInfo::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get vendor")
    }

    async fn order_item_details(&self, order_id: i32) -> Result<Vec<OrderItemDetail>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let rows: Vec<(OrderItemEntity, String, String)> = order_items::table
            .inner_join(products::table)
            .filter(order_items::orders_id.eq(order_id))
            .order_by(order_items::id)
            .select((OrderItemEntity::as_select(), products::name, products::sku))
            .get_results(conn)
            .await
            .context("Failed to get order items")?;

        Ok(rows
            .into_iter()
            .map(|(item, name, sku)| OrderItemDetail::new(item, name, sku))
            .collect())
    }

    async fn orders_for_user(&self, user_id: i32) -> Result<Vec<OrderEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        orders::table
            .filter(orders::users_id.eq(user_id))
            .order_by((orders::created_at.desc(), orders::id.desc()))
            .select(OrderEntity::as_select())
            .get_results(conn)
            .await
            .context("Failed to get user orders")
    }

    async fn orders_for_user_with_vendor(&self, user_id: i32) -> Result<Vec<OrderWithVendor>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let rows: Vec<(OrderEntity, VendorInfo)> = orders::table
            .inner_join(vendors::table)
            .filter(orders::users_id.eq(user_id))
            .order_by((orders::created_at.desc(), orders::id.desc()))
            .select((OrderEntity::as_select(), VendorInfo::as_select()))
            .get_results(conn)
            .await
            .context("Failed to get user orders with vendors")?;

        Ok(rows
            .into_iter()
            .map(|(order, vendor)| OrderWithVendor { order, vendor })
            .collect())
    }

    async fn orders_for_vendor(&self, vendor_id: i32) -> Result<Vec<VendorOrder>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let rows: Vec<(OrderEntity, String, Option<String>)> = orders::table
            .inner_join(users::table)
            .left_join(buyers::table.on(buyers::id.nullable().eq(orders::buyers_id)))
            .filter(orders::vendors_id.eq(vendor_id))
            .order_by((orders::created_at.desc(), orders::id.desc()))
            .select((
                OrderEntity::as_select(),
                users::name,
                buyers::phone.nullable(),
            ))
            .get_results(conn)
            .await
            .context("Failed to get vendor orders")?;

        Ok(rows.into_iter().map(vendor_order).collect())
    }

    async fn find_vendor_order(
        &self,
        vendor_id: i32,
        order_id: i32,
    ) -> Result<Option<VendorOrder>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let row: Option<(OrderEntity, String, Option<String>)> = orders::table
            .inner_join(users::table)
            .left_join(buyers::table.on(buyers::id.nullable().eq(orders::buyers_id)))
            .filter(orders::id.eq(order_id))
            .filter(orders::vendors_id.eq(vendor_id))
            .select((
                OrderEntity::as_select(),
                users::name,
                buyers::phone.nullable(),
            ))
            .first(conn)
            .await
            .optional()
            .context("Failed to get vendor order")?;

        Ok(row.map(vendor_order))
    }

    async fn vendor_order_totals(&self, vendor_id: i32) -> Result<Vec<(String, f64)>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        orders::table
            .filter(orders::vendors_id.eq(vendor_id))
            .select((orders::status, orders::total))
            .get_results(conn)
            .await
            .context("Failed to get vendor order totals")
    }

    async fn set_order_status(
        &self,
        order_id: i32,
        vendor_id: i32,
        status: &str,
    ) -> Result<Option<OrderEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::update(
            orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::vendors_id.eq(vendor_id)),
        )
        .set(orders::status.eq(status))
        .returning(OrderEntity::as_returning())
        .get_result(conn)
        .await
        .optional()
        .context("Failed to update order status")
    }
}

/// A pooled connection with an open transaction.
///
/// If it is dropped without commit or rollback, the pool sees a connection with an
/// open transaction as broken and closes it, which rolls the transaction back.
pub struct PgUnitOfWork {
    conn: PooledConnection<'static, AsyncPgConnection>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_cart(&mut self, cart_id: i32) -> Result<Option<CartEntity>> {
        cart::table
            .find(cart_id)
            .select(CartEntity::as_select())
            .first(&mut *self.conn)
            .await
            .optional()
            .context("Failed to get cart")
    }

    async fn find_cart_by_user(&mut self, user_id: i32) -> Result<Option<CartEntity>> {
        cart::table
            .filter(cart::users_id.eq(user_id))
            .select(CartEntity::as_select())
            .first(&mut *self.conn)
            .await
            .optional()
            .context("Failed to get cart by user")
    }

    async fn load_cart_lines(&mut self, cart_id: i32) -> Result<Vec<CartLine>> {
        let rows: Vec<(CartItemEntity, ProductSnapshot, Option<VendorInfo>)> = cart_items::table
            .inner_join(products::table)
            .left_join(vendors::table.on(vendors::users_id.eq(products::users_id)))
            .filter(cart_items::cart_id.eq(cart_id))
            .order_by(cart_items::id)
            .select((
                CartItemEntity::as_select(),
                ProductSnapshot::as_select(),
                Option::<VendorInfo>::as_select(),
            ))
            .get_results(&mut *self.conn)
            .await
            .context("Failed to get cart lines")?;

        Ok(rows
            .into_iter()
            .map(|(item, product, vendor)| CartLine {
                cart_item_id: item.id,
                quantity: item.quantity,
                product_id: product.id,
                product_name: product.name,
                price: product.price,
                stock: product.stock,
                vendor,
            })
            .collect())
    }

    async fn product_stock(&mut self, product_id: i32) -> Result<Option<i32>> {
        products::table
            .find(product_id)
            .select(products::quantity)
            .first(&mut *self.conn)
            .await
            .optional()
            .context("Failed to get product stock")
    }

    async fn find_cart_item(&mut self, item_id: i32) -> Result<Option<CartItemEntity>> {
        cart_items::table
            .find(item_id)
            .select(CartItemEntity::as_select())
            .first(&mut *self.conn)
            .await
            .optional()
            .context("Failed to get cart item")
    }

    async fn find_cart_item_by_product(
        &mut self,
        cart_id: i32,
        product_id: i32,
    ) -> Result<Option<CartItemEntity>> {
        cart_items::table
            .filter(cart_items::cart_id.eq(cart_id))
            .filter(cart_items::products_id.eq(product_id))
            .select(CartItemEntity::as_select())
            .first(&mut *self.conn)
            .await
            .optional()
            .context("Failed to get cart item by product")
    }

    async fn insert_cart_item(&mut self, item: CreateCartItemEntity) -> Result<CartItemEntity> {
        diesel::insert_into(cart_items::table)
            .values(item)
            .returning(CartItemEntity::as_returning())
            .get_result(&mut *self.conn)
            .await
            .context("Failed to create cart item")
    }

    async fn update_cart_item(
        &mut self,
        item_id: i32,
        patch: UpdateCartItemEntity,
    ) -> Result<CartItemEntity> {
        diesel::update(cart_items::table.find(item_id))
            .set(&patch)
            .returning(CartItemEntity::as_returning())
            .get_result(&mut *self.conn)
            .await
            .context("Failed to update cart item")
    }

    async fn insert_order(&mut self, order: CreateOrderEntity) -> Result<OrderEntity> {
        diesel::insert_into(orders::table)
            .values(order)
            .returning(OrderEntity::as_returning())
            .get_result(&mut *self.conn)
            .await
            .context("Failed to create order")
    }

    async fn insert_order_item(&mut self, item: CreateOrderItemEntity) -> Result<OrderItemEntity> {
        diesel::insert_into(order_items::table)
            .values(item)
            .returning(OrderItemEntity::as_returning())
            .get_result(&mut *self.conn)
            .await
            .context("Failed to create order item")
    }

    async fn decrement_stock(&mut self, product_id: i32, quantity: i32) -> Result<bool> {
        let updated = diesel::update(
            products::table
                .filter(products::id.eq(product_id))
                .filter(products::quantity.ge(quantity)),
        )
        .set(products::quantity.eq(products::quantity - quantity))
        .execute(&mut *self.conn)
        .await
        .context("Failed to update product stock")?;

        Ok(updated == 1)
    }

    async fn delete_cart_items(&mut self, cart_id: i32) -> Result<usize> {
        diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart_id)))
            .execute(&mut *self.conn)
            .await
            .context("Failed to delete cart items")
    }

    async fn delete_cart(&mut self, cart_id: i32) -> Result<bool> {
        let deleted = diesel::delete(cart::table.find(cart_id))
            .execute(&mut *self.conn)
            .await
            .context("Failed to delete cart")?;
        Ok(deleted > 0)
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        AnsiTransactionManager::commit_transaction(&mut *self.conn)
            .await
            .context("Failed to commit transaction")
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .context("Failed to roll back transaction")
    }
}

use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{AsChangeset, Identifiable, Insertable, Queryable},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Carts

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, PartialEq, ToSchema)]
#[diesel(table_name = crate::schema::cart)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartEntity {
    pub id: i32,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub users_id: Option<i32>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, PartialEq, ToSchema)]
#[diesel(belongs_to(CartEntity, foreign_key = cart_id))]
#[diesel(table_name = crate::schema::cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemEntity {
    pub id: i32,
    pub quantity: i32,
    pub cart_id: i32,
    pub products_id: i32,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::cart)]
pub struct CreateCartEntity {
    pub code: String,
    pub users_id: Option<i32>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::cart_items)]
pub struct CreateCartItemEntity {
    pub quantity: i32,
    pub cart_id: i32,
    pub products_id: i32,
}

/// The only cart-item columns a client may change. `None` fields are left untouched.
#[derive(AsChangeset, Deserialize, Clone, Debug, Default, ToSchema)]
#[diesel(table_name = crate::schema::cart_items)]
pub struct UpdateCartItemEntity {
    pub quantity: Option<i32>,
}

// Products

/// Price and stock of a product as read inside a checkout transaction.
#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductSnapshot {
    pub id: i32,
    pub name: String,
    pub price: f64,
    #[diesel(column_name = quantity)]
    pub stock: i32,
}

// Vendors

#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq, ToSchema)]
#[diesel(table_name = crate::schema::vendors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VendorInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, PartialEq, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub order_number: String,
    pub status: String,
    pub total: f64,
    pub payment_method: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_postal_code: String,
    pub created_at: DateTime<Utc>,
    pub users_id: i32,
    pub vendors_id: i32,
    pub buyers_id: Option<i32>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderEntity {
    pub order_number: String,
    pub status: String,
    pub total: f64,
    pub payment_method: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_postal_code: String,
    pub users_id: i32,
    pub vendors_id: i32,
    pub buyers_id: Option<i32>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, PartialEq, ToSchema)]
#[diesel(belongs_to(OrderEntity, foreign_key = orders_id))]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemEntity {
    pub id: i32,
    pub quantity: i32,
    pub price: f64,
    pub orders_id: i32,
    pub products_id: i32,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::order_items)]
pub struct CreateOrderItemEntity {
    pub quantity: i32,
    pub price: f64,
    pub orders_id: i32,
    pub products_id: i32,
}

//! Read-side order projections. Nothing here writes or opens a unit of work.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{OrderEntity, OrderItemEntity, VendorInfo},
    store::Store,
};

use super::{
    OrderWithVendor,
    error::{OrderError, OrderResult},
    status::OrderStatus,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: OrderItemEntity,
    pub product_name: String,
    pub product_sku: String,
    pub subtotal: f64,
}

impl OrderItemDetail {
    pub fn new(item: OrderItemEntity, product_name: String, product_sku: String) -> Self {
        let subtotal = item.price * f64::from(item.quantity);
        Self {
            item,
            product_name,
            product_sku,
            subtotal,
        }
    }
}

/// An order as seen by the vendor that sold it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VendorOrder {
    #[serde(flatten)]
    pub order: OrderEntity,
    pub buyer_name: String,
    /// Empty when the order has no buyer profile.
    pub buyer_phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetails {
    pub order: OrderEntity,
    pub vendor: VendorInfo,
    pub items: Vec<OrderItemDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorOrderDetails {
    pub order: VendorOrder,
    pub items: Vec<OrderItemDetail>,
}

#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct VendorOrderStatistics {
    pub total_orders: usize,
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
    pub cancelled: usize,
    pub total_revenue: f64,
}

impl VendorOrderStatistics {
    /// Buckets `(status, total)` rows. Revenue sums every order regardless of status;
    /// rows with an unknown status still count toward the total.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        rows.into_iter()
            .fold(Self::default(), |mut stats, (status, total)| {
                stats.total_orders += 1;
                stats.total_revenue += total;
                match status.parse::<OrderStatus>() {
                    Ok(OrderStatus::Pending) => stats.pending += 1,
                    Ok(OrderStatus::Processing) => stats.processing += 1,
                    Ok(OrderStatus::Shipped) => stats.shipped += 1,
                    Ok(OrderStatus::Delivered) => stats.delivered += 1,
                    Ok(OrderStatus::Cancelled) => stats.cancelled += 1,
                    Err(_) => {}
                }
                stats
            })
    }
}

pub async fn get_order(store: &dyn Store, order_id: i32) -> OrderResult<OrderEntity> {
    store
        .find_order(order_id)
        .await?
        .ok_or(OrderError::NotFound("order"))
}

/// The order with its vendor's contact details and itemized lines.
pub async fn get_order_with_vendor_info(
    store: &dyn Store,
    order_id: i32,
) -> OrderResult<OrderDetails> {
    let order = get_order(store, order_id).await?;
    let vendor = store
        .find_vendor(order.vendors_id)
        .await?
        .ok_or(OrderError::NotFound("vendor"))?;
    let items = store.order_item_details(order.id).await?;

    Ok(OrderDetails {
        order,
        vendor,
        items,
    })
}

pub async fn get_orders_for_user(store: &dyn Store, user_id: i32) -> OrderResult<Vec<OrderEntity>> {
    Ok(store.orders_for_user(user_id).await?)
}

/// The user's orders keyed by vendor name, newest first within each vendor.
pub async fn get_orders_grouped_by_vendor(
    store: &dyn Store,
    user_id: i32,
) -> OrderResult<BTreeMap<String, Vec<OrderWithVendor>>> {
    let orders = store.orders_for_user_with_vendor(user_id).await?;
    Ok(group_by_vendor_name(orders))
}

pub fn group_by_vendor_name(
    orders: Vec<OrderWithVendor>,
) -> BTreeMap<String, Vec<OrderWithVendor>> {
    let mut grouped: BTreeMap<String, Vec<OrderWithVendor>> = BTreeMap::new();
    for order in orders {
        grouped
            .entry(order.vendor.name.clone())
            .or_default()
            .push(order);
    }
    grouped
}

pub async fn get_orders_for_vendor(
    store: &dyn Store,
    vendor_id: i32,
) -> OrderResult<Vec<VendorOrder>> {
    Ok(store.orders_for_vendor(vendor_id).await?)
}

/// One of the vendor's orders with buyer contact and itemized lines. Orders sold by
/// another vendor are reported as not found.
pub async fn get_vendor_order_details(
    store: &dyn Store,
    vendor_id: i32,
    order_id: i32,
) -> OrderResult<VendorOrderDetails> {
    let order = store
        .find_vendor_order(vendor_id, order_id)
        .await?
        .ok_or(OrderError::NotFound("order"))?;
    let items = store.order_item_details(order_id).await?;
    Ok(VendorOrderDetails { order, items })
}

pub async fn get_vendor_order_statistics(
    store: &dyn Store,
    vendor_id: i32,
) -> OrderResult<VendorOrderStatistics> {
    let rows = store.vendor_order_totals(vendor_id).await?;
    Ok(VendorOrderStatistics::from_rows(
        rows.iter().map(|(status, total)| (status.as_str(), *total)),
    ))
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::store::Store;

use super::error::{OrderError, OrderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                OrderError::InvalidInput(format!(
                    "invalid status {s:?}, use one of: pending, processing, shipped, delivered, cancelled"
                ))
            })
    }
}

/// Moves one of the vendor's own orders to `new_status`.
///
/// Any status may follow any other; only ownership and the status value are checked.
pub async fn update_order_status(
    store: &dyn Store,
    vendor_id: i32,
    order_id: i32,
    new_status: &str,
) -> OrderResult<OrderStatus> {
    let status: OrderStatus = new_status.parse()?;

    let order = store
        .find_order(order_id)
        .await?
        .ok_or(OrderError::NotFound("order"))?;
    if order.vendors_id != vendor_id {
        return Err(OrderError::Forbidden(format!(
            "order {order_id} does not belong to vendor {vendor_id}"
        )));
    }

    // The vendor filter on the update keeps a concurrent reassignment from slipping through.
    store
        .set_order_status(order_id, vendor_id, status.as_str())
        .await?
        .ok_or(OrderError::NotFound("order"))?;

    info!(
        order_id,
        vendor_id,
        from = %order.status,
        to = %status,
        "Order status updated"
    );
    Ok(status)
}

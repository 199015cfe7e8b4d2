use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    orders::{
        OrderStatus,
        queries::{self, VendorOrder, VendorOrderDetails, VendorOrderStatistics},
        update_order_status,
    },
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_vendor_orders))
        .routes(utoipa_axum::routes!(get_vendor_statistics))
        .routes(utoipa_axum::routes!(get_vendor_order))
        .routes(utoipa_axum::routes!(update_status))
}

/// Fetch every order sold by the vendor, newest first, with the buyer's name.
#[utoipa::path(
    get,
    path = "/vendors/{vendor_id}/orders",
    tags = ["Vendors"],
    params(
        ("vendor_id" = i32, Path, description = "Selling vendor")
    ),
    responses(
        (status = 200, description = "List vendor orders", body = StdResponse<Vec<VendorOrder>, String>)
    )
)]
async fn get_vendor_orders(
    Path(vendor_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let orders = queries::get_orders_for_vendor(state.store.as_ref(), vendor_id).await?;

    Ok(StdResponse {
        data: Some(orders),
        message: Some("Get vendor orders successfully"),
    })
}

#[utoipa::path(
    get,
    path = "/vendors/{vendor_id}/orders/statistics",
    tags = ["Vendors"],
    params(
        ("vendor_id" = i32, Path, description = "Selling vendor")
    ),
    responses(
        (status = 200, description = "Order counts per status and revenue", body = StdResponse<VendorOrderStatistics, String>)
    )
)]
async fn get_vendor_statistics(
    Path(vendor_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = queries::get_vendor_order_statistics(state.store.as_ref(), vendor_id).await?;

    Ok(StdResponse {
        data: Some(stats),
        message: Some("Get vendor order statistics successfully"),
    })
}

/// Fetch one of the vendor's orders with buyer contact and itemized lines.
#[utoipa::path(
    get,
    path = "/vendors/{vendor_id}/orders/{order_id}",
    tags = ["Vendors"],
    params(
        ("vendor_id" = i32, Path, description = "Selling vendor"),
        ("order_id" = i32, Path, description = "Order ID to fetch")
    ),
    responses(
        (status = 200, description = "Get vendor order successfully", body = StdResponse<VendorOrderDetails, String>),
        (status = 404, description = "Order not found for this vendor")
    )
)]
async fn get_vendor_order(
    Path((vendor_id, order_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let details =
        queries::get_vendor_order_details(state.store.as_ref(), vendor_id, order_id).await?;

    Ok(StdResponse {
        data: Some(details),
        message: Some("Get vendor order successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStatusReq {
    /// One of `pending`, `processing`, `shipped`, `delivered`, `cancelled`.
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct UpdateStatusRes {
    pub order_id: i32,
    pub status: OrderStatus,
}

#[utoipa::path(
    patch,
    path = "/vendors/{vendor_id}/orders/{order_id}/status",
    tags = ["Vendors"],
    params(
        ("vendor_id" = i32, Path, description = "Vendor that sold the order"),
        ("order_id" = i32, Path, description = "Order to update")
    ),
    request_body = UpdateStatusReq,
    responses(
        (status = 200, description = "Update order status successfully", body = StdResponse<UpdateStatusRes, String>),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Order belongs to another vendor"),
        (status = 404, description = "Order not found")
    )
)]
async fn update_status(
    Path((vendor_id, order_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    Json(body): Json<UpdateStatusReq>,
) -> Result<impl IntoResponse, AppError> {
    let status =
        update_order_status(state.store.as_ref(), vendor_id, order_id, &body.status).await?;

    Ok(StdResponse {
        data: Some(UpdateStatusRes { order_id, status }),
        message: Some("Update order status successfully"),
    })
}

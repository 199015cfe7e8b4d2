use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    models::OrderEntity,
    orders::{
        OrderWithVendor,
        queries::{self, OrderDetails},
    },
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_order))
        .routes(utoipa_axum::routes!(get_order_details))
        .routes(utoipa_axum::routes!(get_user_orders))
        .routes(utoipa_axum::routes!(get_user_orders_by_vendor))
}

/// Orders keyed by the name of the vendor that sold them.
#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrdersByVendor(pub BTreeMap<String, Vec<OrderWithVendor>>);

/// Fetch a specific order.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tags = ["Orders"],
    params(
        ("id" = i32, Path, description = "Order ID to fetch")
    ),
    responses(
        (status = 200, description = "Get order successfully", body = StdResponse<OrderEntity, String>),
        (status = 404, description = "Order not found")
    )
)]
async fn get_order(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let order = queries::get_order(state.store.as_ref(), id).await?;

    Ok(StdResponse {
        data: Some(order),
        message: Some("Get order successfully"),
    })
}

/// Fetch an order with its vendor's contact details and itemized lines.
#[utoipa::path(
    get,
    path = "/orders/{id}/details",
    tags = ["Orders"],
    params(
        ("id" = i32, Path, description = "Order ID to fetch")
    ),
    responses(
        (status = 200, description = "Get order details successfully", body = StdResponse<OrderDetails, String>),
        (status = 404, description = "Order not found")
    )
)]
async fn get_order_details(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let details = queries::get_order_with_vendor_info(state.store.as_ref(), id).await?;

    Ok(StdResponse {
        data: Some(details),
        message: Some("Get order details successfully"),
    })
}

/// Fetch all orders placed by a user, newest first.
#[utoipa::path(
    get,
    path = "/orders/user/{user_id}",
    tags = ["Orders"],
    params(
        ("user_id" = i32, Path, description = "User who placed the orders")
    ),
    responses(
        (status = 200, description = "List user orders", body = StdResponse<Vec<OrderEntity>, String>)
    )
)]
async fn get_user_orders(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let orders = queries::get_orders_for_user(state.store.as_ref(), user_id).await?;

    Ok(StdResponse {
        data: Some(orders),
        message: Some("Get user orders successfully"),
    })
}

#[utoipa::path(
    get,
    path = "/orders/user/{user_id}/by-vendor",
    tags = ["Orders"],
    params(
        ("user_id" = i32, Path, description = "User who placed the orders")
    ),
    responses(
        (status = 200, description = "User orders grouped by vendor name", body = StdResponse<OrdersByVendor, String>)
    )
)]
async fn get_user_orders_by_vendor(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let grouped = queries::get_orders_grouped_by_vendor(state.store.as_ref(), user_id).await?;

    Ok(StdResponse {
        data: Some(OrdersByVendor(grouped)),
        message: Some("Get user orders by vendor successfully"),
    })
}

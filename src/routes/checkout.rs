use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    models::OrderEntity,
    orders::{self, CheckoutRequest, MultiVendorCheckout},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(checkout))
        .routes(utoipa_axum::routes!(checkout_multi_vendor))
}

/// Turn the user's cart into a single order. Every item must be sold by the same vendor.
#[utoipa::path(
    post,
    path = "/checkout/{user_id}",
    tags = ["Checkout"],
    params(
        ("user_id" = i32, Path, description = "User checking out")
    ),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = StdResponse<OrderEntity, String>),
        (status = 400, description = "Missing payment or shipping field"),
        (status = 404, description = "User has no cart"),
        (status = 409, description = "Cart is empty or spans several vendors"),
        (status = 422, description = "Not enough stock for an item")
    )
)]
async fn checkout(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = orders::checkout(
        state.store.as_ref(),
        &state.order_numbers,
        user_id,
        body,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        StdResponse {
            data: Some(order),
            message: Some("Order placed successfully"),
        },
    ))
}

/// Turn the user's cart into one order per vendor, atomically.
#[utoipa::path(
    post,
    path = "/checkout-multi-vendor/{user_id}",
    tags = ["Checkout"],
    params(
        ("user_id" = i32, Path, description = "User checking out")
    ),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Orders placed", body = StdResponse<MultiVendorCheckout, String>),
        (status = 400, description = "Missing payment or shipping field"),
        (status = 404, description = "User has no cart"),
        (status = 409, description = "Cart is empty or has a product without a vendor"),
        (status = 422, description = "Not enough stock for an item")
    )
)]
async fn checkout_multi_vendor(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let placed = orders::checkout_multi_vendor(
        state.store.as_ref(),
        &state.order_numbers,
        user_id,
        body,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        StdResponse {
            data: Some(placed),
            message: Some("Orders placed successfully"),
        },
    ))
}

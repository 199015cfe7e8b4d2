use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    carts::{self, CartWithItems},
    models::{CartEntity, CartItemEntity, UpdateCartItemEntity},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(create_cart))
        .routes(utoipa_axum::routes!(get_cart, delete_cart))
        .routes(utoipa_axum::routes!(get_cart_with_items, add_cart_item))
        .routes(utoipa_axum::routes!(get_cart_by_user))
        .routes(utoipa_axum::routes!(update_cart_item, delete_cart_item))
}

#[derive(Deserialize, ToSchema)]
pub struct CreateCartReq {
    pub users_id: Option<i32>,
}

/// Create a cart, optionally owned by a user. A user may hold one cart at a time.
#[utoipa::path(
    post,
    path = "/carts",
    tags = ["Carts"],
    request_body = CreateCartReq,
    responses(
        (status = 201, description = "Cart created", body = StdResponse<CartEntity, String>),
        (status = 409, description = "User already has a cart")
    )
)]
async fn create_cart(
    State(state): State<AppState>,
    Json(body): Json<CreateCartReq>,
) -> Result<impl IntoResponse, AppError> {
    let cart = carts::create_cart(state.store.as_ref(), body.users_id).await?;

    Ok((
        StatusCode::CREATED,
        StdResponse {
            data: Some(cart),
            message: Some("Create cart successfully"),
        },
    ))
}

#[utoipa::path(
    get,
    path = "/carts/{id}",
    tags = ["Carts"],
    params(
        ("id" = i32, Path, description = "Cart ID to fetch")
    ),
    responses(
        (status = 200, description = "Get cart successfully", body = StdResponse<CartEntity, String>),
        (status = 404, description = "Cart not found")
    )
)]
async fn get_cart(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let cart = carts::get_cart(state.store.as_ref(), id).await?;

    Ok(StdResponse {
        data: Some(cart),
        message: Some("Get cart successfully"),
    })
}

/// Delete a cart and all of its items.
#[utoipa::path(
    delete,
    path = "/carts/{id}",
    tags = ["Carts"],
    params(
        ("id" = i32, Path, description = "Cart ID to delete")
    ),
    responses(
        (status = 200, description = "Delete cart successfully"),
        (status = 404, description = "Cart not found")
    )
)]
async fn delete_cart(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    carts::delete_cart(state.store.as_ref(), id).await?;

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Delete cart successfully"),
    })
}

#[utoipa::path(
    get,
    path = "/carts/{id}/items",
    tags = ["Carts"],
    params(
        ("id" = i32, Path, description = "Cart ID to fetch")
    ),
    responses(
        (status = 200, description = "Get cart with items successfully", body = StdResponse<CartWithItems, String>),
        (status = 404, description = "Cart not found")
    )
)]
async fn get_cart_with_items(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let cart = carts::get_cart_with_items(state.store.as_ref(), id).await?;

    Ok(StdResponse {
        data: Some(cart),
        message: Some("Get cart with items successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
pub struct AddCartItemReq {
    pub products_id: i32,
    pub quantity: i32,
}

/// Add a product to the cart. Adding a product already in the cart raises its quantity.
#[utoipa::path(
    post,
    path = "/carts/{id}/items",
    tags = ["Carts"],
    params(
        ("id" = i32, Path, description = "Cart ID")
    ),
    request_body = AddCartItemReq,
    responses(
        (status = 201, description = "Item added", body = StdResponse<CartItemEntity, String>),
        (status = 400, description = "Invalid quantity or not enough stock"),
        (status = 404, description = "Cart or product not found")
    )
)]
async fn add_cart_item(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<AddCartItemReq>,
) -> Result<impl IntoResponse, AppError> {
    let item =
        carts::add_cart_item(state.store.as_ref(), id, body.products_id, body.quantity).await?;

    Ok((
        StatusCode::CREATED,
        StdResponse {
            data: Some(item),
            message: Some("Add cart item successfully"),
        },
    ))
}

#[utoipa::path(
    get,
    path = "/carts/user/{user_id}",
    tags = ["Carts"],
    params(
        ("user_id" = i32, Path, description = "Owner of the cart")
    ),
    responses(
        (status = 200, description = "Get cart successfully", body = StdResponse<CartEntity, String>),
        (status = 404, description = "User has no cart")
    )
)]
async fn get_cart_by_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let cart = carts::get_cart_by_user(state.store.as_ref(), user_id).await?;

    Ok(StdResponse {
        data: Some(cart),
        message: Some("Get cart successfully"),
    })
}

#[utoipa::path(
    patch,
    path = "/carts/items/{item_id}",
    tags = ["Carts"],
    params(
        ("item_id" = i32, Path, description = "Cart item ID")
    ),
    request_body = UpdateCartItemEntity,
    responses(
        (status = 200, description = "Update cart item successfully", body = StdResponse<CartItemEntity, String>),
        (status = 400, description = "Invalid quantity or not enough stock"),
        (status = 404, description = "Cart item not found")
    )
)]
async fn update_cart_item(
    Path(item_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<UpdateCartItemEntity>,
) -> Result<impl IntoResponse, AppError> {
    let item = carts::update_cart_item(state.store.as_ref(), item_id, body).await?;

    Ok(StdResponse {
        data: Some(item),
        message: Some("Update cart item successfully"),
    })
}

#[utoipa::path(
    delete,
    path = "/carts/items/{item_id}",
    tags = ["Carts"],
    params(
        ("item_id" = i32, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Delete cart item successfully"),
        (status = 404, description = "Cart item not found")
    )
)]
async fn delete_cart_item(
    Path(item_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    carts::delete_cart_item(state.store.as_ref(), item_id).await?;

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Delete cart item successfully"),
    })
}

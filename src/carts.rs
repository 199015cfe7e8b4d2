//! Shopping carts: the input side of checkout.

use rand::Rng;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    models::{
        CartEntity, CartItemEntity, CreateCartEntity, CreateCartItemEntity, UpdateCartItemEntity,
    },
    orders::{OrderError, OrderResult, checkout::finish},
    store::{Store, UnitOfWork},
};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 9;

/// Random shareable cart code, e.g. `Q7M2ZK0AB`.
pub fn generate_cart_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
        .collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartWithItems {
    #[serde(flatten)]
    pub cart: CartEntity,
    pub items: Vec<CartItemEntity>,
}

pub async fn create_cart(store: &dyn Store, users_id: Option<i32>) -> OrderResult<CartEntity> {
    let cart = store
        .create_cart(CreateCartEntity {
            code: generate_cart_code(),
            users_id,
        })
        .await?
        .ok_or_else(|| OrderError::InvalidState("user already has an open cart".into()))?;

    info!(cart_id = cart.id, code = %cart.code, ?users_id, "Cart created");
    Ok(cart)
}

pub async fn get_cart(store: &dyn Store, cart_id: i32) -> OrderResult<CartEntity> {
    store
        .find_cart(cart_id)
        .await?
        .ok_or(OrderError::NotFound("cart"))
}

pub async fn get_cart_by_user(store: &dyn Store, user_id: i32) -> OrderResult<CartEntity> {
    store
        .find_cart_by_user(user_id)
        .await?
        .ok_or(OrderError::NotFound("cart"))
}

pub async fn get_cart_with_items(store: &dyn Store, cart_id: i32) -> OrderResult<CartWithItems> {
    let cart = get_cart(store, cart_id).await?;
    let items = store.cart_items(cart.id).await?;
    Ok(CartWithItems { cart, items })
}

/// Puts `quantity` of a product in the cart. Adding a product that is already in
/// the cart raises that line's quantity instead of creating a second line.
pub async fn add_cart_item(
    store: &dyn Store,
    cart_id: i32,
    product_id: i32,
    quantity: i32,
) -> OrderResult<CartItemEntity> {
    if quantity <= 0 {
        return Err(OrderError::InvalidInput("quantity must be positive".into()));
    }

    let mut uow = store.begin().await?;
    let outcome = async {
        uow.find_cart(cart_id)
            .await?
            .ok_or(OrderError::NotFound("cart"))?;
        let stock = product_stock(uow.as_mut(), product_id).await?;

        match uow.find_cart_item_by_product(cart_id, product_id).await? {
            Some(existing) => {
                let total = existing.quantity.saturating_add(quantity);
                ensure_in_stock(total, stock)?;
                Ok(uow
                    .update_cart_item(
                        existing.id,
                        UpdateCartItemEntity {
                            quantity: Some(total),
                        },
                    )
                    .await?)
            }
            None => {
                ensure_in_stock(quantity, stock)?;
                Ok::<CartItemEntity, OrderError>(
                    uow.insert_cart_item(CreateCartItemEntity {
                        quantity,
                        cart_id,
                        products_id: product_id,
                    })
                    .await?,
                )
            }
        }
    }
    .await;

    finish(uow, outcome).await
}

/// Applies a cart item patch. Only the fields of [`UpdateCartItemEntity`] can change.
pub async fn update_cart_item(
    store: &dyn Store,
    item_id: i32,
    patch: UpdateCartItemEntity,
) -> OrderResult<CartItemEntity> {
    if matches!(patch.quantity, Some(quantity) if quantity <= 0) {
        return Err(OrderError::InvalidInput("quantity must be positive".into()));
    }

    let mut uow = store.begin().await?;
    let outcome = async {
        let item = uow
            .find_cart_item(item_id)
            .await?
            .ok_or(OrderError::NotFound("cart item"))?;

        let Some(quantity) = patch.quantity else {
            return Ok(item);
        };
        if quantity != item.quantity {
            let stock = product_stock(uow.as_mut(), item.products_id).await?;
            ensure_in_stock(quantity, stock)?;
        }

        Ok::<CartItemEntity, OrderError>(uow.update_cart_item(item_id, patch).await?)
    }
    .await;

    finish(uow, outcome).await
}

pub async fn delete_cart_item(store: &dyn Store, item_id: i32) -> OrderResult<()> {
    if !store.delete_cart_item(item_id).await? {
        return Err(OrderError::NotFound("cart item"));
    }
    Ok(())
}

/// Removes the cart together with its items.
pub async fn delete_cart(store: &dyn Store, cart_id: i32) -> OrderResult<()> {
    let mut uow = store.begin().await?;
    let outcome = async {
        uow.delete_cart_items(cart_id).await?;
        if !uow.delete_cart(cart_id).await? {
            return Err(OrderError::NotFound("cart"));
        }
        Ok::<(), OrderError>(())
    }
    .await;

    finish(uow, outcome).await
}

async fn product_stock(uow: &mut dyn UnitOfWork, product_id: i32) -> OrderResult<i32> {
    uow.product_stock(product_id)
        .await?
        .ok_or(OrderError::NotFound("product"))
}

fn ensure_in_stock(requested: i32, stock: i32) -> OrderResult<()> {
    if requested > stock {
        return Err(OrderError::InvalidInput(format!(
            "requested quantity {requested} exceeds available stock {stock}"
        )));
    }
    Ok(())
}

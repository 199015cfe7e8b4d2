use tracing::{error, info, warn};

use crate::{
    models::{CartEntity, CreateOrderEntity, CreateOrderItemEntity, OrderEntity},
    store::{Store, UnitOfWork},
};

use super::{
    CartLine, CheckoutRequest, MultiVendorCheckout, OrderWithVendor,
    error::{OrderError, OrderResult},
    order_number::OrderNumberGenerator,
    partition::{self, VendorGroup},
    status::OrderStatus,
    stock,
};

/// Converts the user's cart into a single order. All cart lines must be sold by the
/// same vendor.
pub async fn checkout(
    store: &dyn Store,
    order_numbers: &OrderNumberGenerator,
    user_id: i32,
    request: CheckoutRequest,
) -> OrderResult<OrderEntity> {
    request.validate()?;

    let mut uow = store.begin().await?;
    let outcome = async {
        let (cart, lines) = load_checkout_lines(uow.as_mut(), user_id).await?;
        let group = partition::single_group(lines)?;
        let order = write_group(uow.as_mut(), order_numbers, user_id, &request, &group).await?;
        clear_cart(uow.as_mut(), &cart).await?;
        Ok::<OrderEntity, OrderError>(order)
    }
    .await;

    let order = finish(uow, outcome).await.inspect_err(|err| log_rejection(user_id, err))?;
    info!(
        user_id,
        order_number = %order.order_number,
        total = order.total,
        "Checkout completed"
    );
    Ok(order)
}

/// Splits the user's cart into one order per vendor and creates all of them
/// atomically.
pub async fn checkout_multi_vendor(
    store: &dyn Store,
    order_numbers: &OrderNumberGenerator,
    user_id: i32,
    request: CheckoutRequest,
) -> OrderResult<MultiVendorCheckout> {
    request.validate()?;

    let mut uow = store.begin().await?;
    let outcome = async {
        let (cart, lines) = load_checkout_lines(uow.as_mut(), user_id).await?;
        let groups = partition::partition_by_vendor(lines)?;

        let mut orders = Vec::with_capacity(groups.len());
        for group in groups {
            let order =
                write_group(uow.as_mut(), order_numbers, user_id, &request, &group).await?;
            orders.push(OrderWithVendor {
                order,
                vendor: group.vendor,
            });
        }

        clear_cart(uow.as_mut(), &cart).await?;
        Ok::<Vec<OrderWithVendor>, OrderError>(orders)
    }
    .await;

    let orders = finish(uow, outcome).await.inspect_err(|err| log_rejection(user_id, err))?;
    let order_numbers: Vec<&str> = orders.iter().map(|o| o.order.order_number.as_str()).collect();
    info!(
        user_id,
        total_orders = orders.len(),
        ?order_numbers,
        "Multi-vendor checkout completed"
    );

    Ok(MultiVendorCheckout {
        total_orders: orders.len(),
        orders,
    })
}

/// Commits on success, rolls back on failure. A failed rollback is logged and the
/// original error is returned.
pub(crate) async fn finish<T>(uow: Box<dyn UnitOfWork>, outcome: OrderResult<T>) -> OrderResult<T> {
    match outcome {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                error!(error = ?rollback_err, "Failed to roll back unit of work");
            }
            Err(err)
        }
    }
}

async fn load_checkout_lines(
    uow: &mut dyn UnitOfWork,
    user_id: i32,
) -> OrderResult<(CartEntity, Vec<CartLine>)> {
    let cart = uow
        .find_cart_by_user(user_id)
        .await?
        .ok_or(OrderError::NotFound("cart"))?;

    let lines = uow.load_cart_lines(cart.id).await?;
    if lines.is_empty() {
        return Err(OrderError::InvalidState("empty cart".into()));
    }

    stock::check_all(&lines)?;
    Ok((cart, lines))
}

/// Writes one pending order for the group, snapshots each line's unit price into
/// an order item and takes the ordered quantity off the product's stock.
async fn write_group(
    uow: &mut dyn UnitOfWork,
    order_numbers: &OrderNumberGenerator,
    user_id: i32,
    request: &CheckoutRequest,
    group: &VendorGroup,
) -> OrderResult<OrderEntity> {
    let order = uow
        .insert_order(CreateOrderEntity {
            order_number: order_numbers.next(),
            status: OrderStatus::Pending.as_str().into(),
            total: group.total(),
            payment_method: request.payment_method.clone(),
            shipping_address: request.shipping_address.clone(),
            shipping_city: request.shipping_city.clone(),
            shipping_state: request.shipping_state.clone(),
            shipping_postal_code: request.shipping_postal_code.clone(),
            users_id: user_id,
            vendors_id: group.vendor.id,
            buyers_id: request.buyers_id,
        })
        .await?;

    for line in &group.lines {
        uow.insert_order_item(CreateOrderItemEntity {
            quantity: line.quantity,
            price: line.price,
            orders_id: order.id,
            products_id: line.product_id,
        })
        .await?;

        // Stock may have moved since it was read.
        if !uow.decrement_stock(line.product_id, line.quantity).await? {
            return Err(OrderError::InsufficientStock(line.product_name.clone()));
        }
    }

    Ok(order)
}

/// Fails when the cart is already gone, i.e. another checkout of it committed first.
async fn clear_cart(uow: &mut dyn UnitOfWork, cart: &CartEntity) -> OrderResult<()> {
    uow.delete_cart_items(cart.id).await?;
    if !uow.delete_cart(cart.id).await? {
        return Err(OrderError::InvalidState(format!(
            "cart {} was already checked out",
            cart.id
        )));
    }
    Ok(())
}

/// Internal failures are logged where they turn into a response.
fn log_rejection(user_id: i32, err: &OrderError) {
    if !matches!(err, OrderError::Internal(_)) {
        warn!(user_id, reason = %err, "Checkout rejected");
    }
}

use super::{
    CartLine,
    error::{OrderError, OrderResult},
};

/// Checks one cart line against the stock read in the same transaction.
///
/// Lines are checked independently: two lines for the same product are not
/// summed here. The conditional decrement at write time still refuses to take
/// stock below zero.
pub fn check_line(line: &CartLine) -> OrderResult<()> {
    if line.quantity > line.stock {
        return Err(OrderError::InsufficientStock(line.product_name.clone()));
    }
    Ok(())
}

/// Stops at the first line that cannot be served.
pub fn check_all(lines: &[CartLine]) -> OrderResult<()> {
    lines.iter().try_for_each(check_line)
}

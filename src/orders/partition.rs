use std::collections::{BTreeMap, HashSet};

use crate::models::VendorInfo;

use super::{
    CartLine,
    error::{OrderError, OrderResult},
};

/// Cart lines that will become one vendor's order.
#[derive(Debug, Clone)]
pub struct VendorGroup {
    pub vendor: VendorInfo,
    pub lines: Vec<CartLine>,
}

impl VendorGroup {
    /// Sum of unit price times quantity over the group.
    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|line| line.price * f64::from(line.quantity))
            .sum()
    }
}

/// Groups lines by the vendor resolved from each product's owner.
///
/// Every line lands in exactly one group. A line whose product owner has no
/// vendor profile fails the whole partition instead of being dropped, so the
/// groups always cover the full cart. A cart item that resolves to more than
/// one vendor fails it too. Groups come out ordered by vendor id.
pub fn partition_by_vendor(lines: Vec<CartLine>) -> OrderResult<Vec<VendorGroup>> {
    let mut groups: BTreeMap<i32, VendorGroup> = BTreeMap::new();
    let mut seen = HashSet::with_capacity(lines.len());

    for mut line in lines {
        if !seen.insert(line.cart_item_id) {
            return Err(OrderError::InvalidState(format!(
                "product {} resolves to more than one vendor",
                line.product_name
            )));
        }

        let Some(vendor) = line.vendor.take() else {
            return Err(OrderError::InvalidState(format!(
                "product {} has no vendor",
                line.product_name
            )));
        };

        groups
            .entry(vendor.id)
            .or_insert_with(|| VendorGroup {
                vendor: vendor.clone(),
                lines: Vec::new(),
            })
            .lines
            .push(CartLine {
                vendor: Some(vendor),
                ..line
            });
    }

    Ok(groups.into_values().collect())
}

/// Treats the whole cart as one group. All lines must resolve to the same vendor.
pub fn single_group(lines: Vec<CartLine>) -> OrderResult<VendorGroup> {
    let mut groups = partition_by_vendor(lines)?;
    if groups.len() > 1 {
        return Err(OrderError::InvalidState(
            "cart spans multiple vendors, use multi-vendor checkout".into(),
        ));
    }
    groups
        .pop()
        .ok_or_else(|| OrderError::InvalidState("empty cart".into()))
}

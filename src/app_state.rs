use std::sync::Arc;

use crate::{orders::OrderNumberGenerator, store::Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Shared by every checkout so numbers stay unique across requests.
    pub order_numbers: Arc<OrderNumberGenerator>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            order_numbers: Arc::new(OrderNumberGenerator::new()),
        }
    }
}

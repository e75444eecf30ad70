//! Test context wiring the orchestrator to in-memory storage and mocked gateways.

use std::sync::Arc;

use crate::{
    domain::{carts::CartsOrchestrator, shipping::ThresholdShipping},
    gateways::{pricing::MockPricingGateway, promotions::MockPromotionGateway},
};

use super::memory::MemoryCartStore;

pub(crate) struct TestContext {
    pub store: MemoryCartStore,
    pub carts: CartsOrchestrator<MemoryCartStore>,
}

impl TestContext {
    pub(crate) fn new(pricing: MockPricingGateway, promotions: MockPromotionGateway) -> Self {
        let store = MemoryCartStore::default();

        Self {
            carts: CartsOrchestrator::new(
                store.clone(),
                Arc::new(pricing),
                Arc::new(promotions),
                Arc::new(ThresholdShipping::default()),
            ),
            store,
        }
    }
}

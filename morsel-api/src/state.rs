use std::sync::Arc;

use morsel_catalog::PricingEngine;
use morsel_order::{LoyaltyCalculator, OrderQueryService, OrderStateMachine};
use morsel_store::app_config::BusinessRules;
use morsel_store::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub machine: Arc<OrderStateMachine>,
    pub queries: Arc<OrderQueryService>,
}

impl AppState {
    pub fn new(rules: &BusinessRules) -> Self {
        let store = Arc::new(MemoryStore::new());
        let pricing = PricingEngine::new(rules.into());
        let loyalty = LoyaltyCalculator::new(rules.loyalty_euros_per_point);
        let machine = Arc::new(OrderStateMachine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            pricing,
            loyalty,
        ));
        let queries = Arc::new(OrderQueryService::new(store.clone()));
        Self {
            store,
            machine,
            queries,
        }
    }
}

//! Wiring of the lending service onto the configured store.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use library_backend::domain::LendingService;
use library_backend::domain::ports::{LendingMetrics, LendingStore};
use library_backend::inbound::http::state::HttpState;
use library_backend::outbound::memory::InMemoryLendingStore;
use library_backend::outbound::persistence::DieselLendingStore;

use super::ServerConfig;

fn state_for<S>(store: S, config: &ServerConfig, metrics: Arc<dyn LendingMetrics>) -> HttpState
where
    S: LendingStore + 'static,
{
    let service = Arc::new(
        LendingService::new(Arc::new(store), config.policy, Arc::new(DefaultClock))
            .with_metrics(metrics),
    );
    HttpState::new(service.clone(), service)
}

/// PostgreSQL when a pool is configured, otherwise an empty in-memory store.
pub(super) fn build_http_state(
    config: &ServerConfig,
    metrics: Arc<dyn LendingMetrics>,
) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => {
            info!(
                borrow_limit = config.policy.borrow_limit(),
                late_after_days = config.policy.late_after_days(),
                penalty_duration = %config.policy.penalty_duration(),
                "serving lending from PostgreSQL"
            );
            state_for(DieselLendingStore::new(pool.clone()), config, metrics)
        }
        None => {
            warn!("no database configured; lending state is in memory and lost on restart");
            state_for(InMemoryLendingStore::new(), config, metrics)
        }
    };
    web::Data::new(state)
}

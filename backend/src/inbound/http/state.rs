//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and only see the driving
//! ports, so they can be tested with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{LendingCommand, LibraryQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Borrow and return.
    pub lending: Arc<dyn LendingCommand>,
    /// Book and member listings.
    pub library: Arc<dyn LibraryQuery>,
}

impl HttpState {
    /// Bundle the driving ports. One service usually implements both.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use library_backend::domain::{LendingPolicy, LendingService};
    /// use library_backend::inbound::http::state::HttpState;
    /// use library_backend::outbound::memory::InMemoryLendingStore;
    /// use mockable::DefaultClock;
    ///
    /// let service = Arc::new(LendingService::new(
    ///     Arc::new(InMemoryLendingStore::new()),
    ///     LendingPolicy::default(),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(service.clone(), service);
    /// # drop(state);
    /// ```
    #[must_use]
    pub const fn new(lending: Arc<dyn LendingCommand>, library: Arc<dyn LibraryQuery>) -> Self {
        Self { lending, library }
    }
}

//! Service configuration loaded via OrthoConfig.
//!
//! Every field can come from CLI flags, `LIBRARY_*` environment variables or
//! a configuration file. Accessors apply defaults so callers never see an
//! unset value.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    DEFAULT_BORROW_LIMIT, DEFAULT_LATE_AFTER_DAYS, LendingPolicy, LendingPolicyError,
    PenaltyDuration,
};
use crate::outbound::persistence::{DEFAULT_POOL_MAX_SIZE, PoolConfig};

/// Listen address used when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Fallback consulted when `LIBRARY_DATABASE_URL` is unset.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// A configured value that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not `host:port`.
    #[error("bind address {value:?} is not a socket address")]
    InvalidBindAddr {
        /// Value as configured.
        value: String,
    },
    /// The lending rules are out of range.
    #[error(transparent)]
    Policy(#[from] LendingPolicyError),
}

/// Runtime settings for the lending service and its tools.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LIBRARY")]
pub struct LibrarySettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Maximum simultaneous active loans per member.
    pub borrow_limit: Option<u32>,
    /// Loans held longer than this many whole days are late.
    pub late_after_days: Option<u32>,
    /// Penalty for a late return: a number of days or `permanent`.
    pub penalty_duration: Option<String>,
    /// Leave the schema alone at startup.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
}

impl LibrarySettings {
    /// Configured listen address, else [`DEFAULT_BIND_ADDR`].
    ///
    /// # Errors
    /// [`SettingsError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    /// Configured URL, else `DATABASE_URL`. Blank values count as unset.
    #[must_use]
    pub fn database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| std::env::var(DATABASE_URL_ENV).ok())
            .filter(|url| !url.trim().is_empty())
    }

    /// Pool settings when a database URL is available.
    #[must_use]
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url().map(|url| {
            PoolConfig::new(url).with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE))
        })
    }

    /// Lending rules with unset values filled from the defaults.
    ///
    /// # Errors
    /// [`SettingsError::Policy`] for a zero borrow limit or a penalty
    /// duration that is neither `permanent` nor an accepted day count.
    pub fn lending_policy(&self) -> Result<LendingPolicy, SettingsError> {
        let penalty_duration = self
            .penalty_duration
            .as_deref()
            .map_or_else(|| Ok(PenaltyDuration::default()), str::parse::<PenaltyDuration>)?;
        Ok(LendingPolicy::new(
            self.borrow_limit.unwrap_or(DEFAULT_BORROW_LIMIT),
            self.late_after_days.unwrap_or(DEFAULT_LATE_AFTER_DAYS),
            penalty_duration,
        )?)
    }
}

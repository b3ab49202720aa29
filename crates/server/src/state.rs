//! Application state shared across handlers.

use std::sync::Arc;

use argon2::Argon2;

use crate::config::AcademyConfig;
use crate::db::Repositories;
use crate::services::auth::build_hasher;
use crate::services::{EventBus, RosterProjection};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the storage backend, the password hasher and the event bus.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AcademyConfig,
    repos: Repositories,
    argon2: Argon2<'static>,
    events: EventBus,
}

impl AppState {
    /// Create a new application state and register the projections.
    ///
    /// # Errors
    ///
    /// Returns `argon2::Error` if the password hashing parameters are invalid.
    pub fn new(config: AcademyConfig, repos: Repositories) -> Result<Self, argon2::Error> {
        let argon2 = build_hasher(&config.password_hashing)?;
        let events = EventBus::new(vec![Arc::new(RosterProjection::new(
            Arc::clone(&repos.users),
            Arc::clone(&repos.students),
        ))]);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                repos,
                argon2,
                events,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AcademyConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn repos(&self) -> &Repositories {
        &self.inner.repos
    }

    /// The argon2 hasher configured with the academy's work factor.
    #[must_use]
    pub fn argon2(&self) -> &Argon2<'static> {
        &self.inner.argon2
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }
}

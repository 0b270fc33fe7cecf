//! Service contains the identity and session logic of the portal.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use std::{sync::Arc, time::Duration};

use common::{Clock, DateTime, SystemClock};
use derive_more::Debug;

#[cfg(doc)]
use domain::user::Session;
#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key used to sign [`Session`] tokens.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// Lifetime of a [`Session`] since its creation.
    pub session_ttl: Duration,
}

impl Config {
    /// Default lifetime of a [`Session`].
    pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);
}

/// Domain service.
///
/// Owns its [`Database`], so every [`Service`] is an isolated identity store:
/// registered users and the active [`Session`] are never shared between two
/// independently created instances.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Clock`] this [`Service`] reads the current time from.
    clock: Arc<dyn Clock>,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self {
            config,
            database,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the [`SystemClock`] of this [`Service`] with the given
    /// [`Clock`].
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns the current [`DateTime`] according to the [`Clock`] of this
    /// [`Service`].
    #[must_use]
    pub fn now(&self) -> DateTime {
        self.clock.now()
    }
}

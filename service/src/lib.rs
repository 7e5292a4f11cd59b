//! Service contains the business logic of the application.
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

use infra::payment;
#[cfg(doc)]
use infra::Storage;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// [`payment::Gateway`] configuration.
    pub payment: payment::Config,

    /// Price suggestion [`Policy`].
    ///
    /// [`Policy`]: query::report::pricing::Policy
    pub pricing: query::report::pricing::Policy,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Storage`] of this [`Service`].
    store: Db,

    /// Payment [`Gateway`] of this [`Service`].
    ///
    /// [`Gateway`]: payment::Gateway
    payments: payment::Gateway,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, store: Db) -> Self {
        let payments = payment::Gateway::new(&config.payment);
        Self {
            config,
            store,
            payments,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Storage`] of this [`Service`].
    #[must_use]
    pub fn store(&self) -> &Db {
        &self.store
    }

    /// Returns the payment [`Gateway`] of this [`Service`].
    ///
    /// [`Gateway`]: payment::Gateway
    #[must_use]
    pub fn payments(&self) -> &payment::Gateway {
        &self.payments
    }
}

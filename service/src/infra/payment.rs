//! Mock payment gateway.

use std::time::Duration;

use common::{DateTime, Money};
use smart_default::SmartDefault;
use tracing as log;

/// Mock payment [`Gateway`] configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Time the [`Gateway`] takes to capture a payment.
    #[default(Duration::from_millis(1500))]
    pub latency: Duration,

    /// Time to wait for the [`Gateway`] before giving up on a payment.
    #[default(Duration::from_secs(30))]
    pub timeout: Duration,
}

/// Mock payment gateway, always capturing successfully after a configured
/// latency.
#[derive(Clone, Copy, Debug)]
pub struct Gateway {
    /// Time this [`Gateway`] takes to capture a payment.
    latency: Duration,
}

impl Gateway {
    /// Creates a new [`Gateway`] out of the provided [`Config`].
    #[must_use]
    pub fn new(conf: &Config) -> Self {
        Self {
            latency: conf.latency,
        }
    }

    /// Captures the provided `amount`, returning a [`Receipt`] once done.
    pub async fn capture(&self, amount: Money) -> Receipt {
        tokio::time::sleep(self.latency).await;

        let receipt = Receipt {
            amount,
            captured_at: DateTime::now(),
        };
        log::debug!(%amount, "payment captured");
        receipt
    }
}

/// Receipt of a captured payment.
#[derive(Clone, Copy, Debug)]
pub struct Receipt {
    /// Captured amount.
    pub amount: Money,

    /// [`DateTime`] when the payment was captured.
    pub captured_at: DateTime,
}

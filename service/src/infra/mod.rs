//! Infrastructure layer.

pub mod payment;
pub mod store;

pub use self::store::{Storage, Store};

//! Report [`Query`] definitions.
//!
//! [`Query`]: crate::Query

pub mod performance;
pub mod pricing;

pub use self::{performance::Performance, pricing::SuggestedPrice};

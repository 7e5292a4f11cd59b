//! [`Query`] collection related to the multiple [`Review`]s.

use common::operations::By;

use crate::domain::{space, Review};
#[cfg(doc)]
use crate::Query;

use super::StoreQuery;

/// Queries the [`Review`]s of a [`Space`] by its [`space::Id`].
///
/// [`Space`]: crate::domain::Space
pub type OfSpace = StoreQuery<By<Vec<Review>, space::Id>>;

//! [`Query`] collection related to a single [`Space`].

use common::operations::By;

use crate::domain::{space, Space};
#[cfg(doc)]
use crate::Query;

use super::StoreQuery;

/// Queries a [`Space`] by its [`space::Id`].
pub type ById = StoreQuery<By<Option<Space>, space::Id>>;

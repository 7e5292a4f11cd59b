//! [`Query`] collection related to the multiple [`Space`]s.

use common::operations::By;

use crate::{domain::Space, read};
#[cfg(doc)]
use crate::Query;

use super::StoreQuery;

/// Queries a list of [`Space`]s passing a [`Filter`].
///
/// [`Filter`]: read::space::list::Filter
pub type List = StoreQuery<By<Vec<Space>, read::space::list::Filter>>;

//! [`Query`] collection related to the multiple [`Reservation`]s.

use common::operations::By;

use crate::{domain::Reservation, read};
#[cfg(doc)]
use crate::Query;

use super::StoreQuery;

/// Queries a list of [`Reservation`]s passing a [`Filter`].
///
/// [`Filter`]: read::reservation::list::Filter
pub type List =
    StoreQuery<By<Vec<Reservation>, read::reservation::list::Filter>>;

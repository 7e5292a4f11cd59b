//! [`User`] definitions.

use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

/// Registered user of the marketplace, either hosting or renting [`Space`]s.
///
/// Only its [`Id`] is tracked here, as a foreign reference on [`Space`]s,
/// [`Reservation`]s and [`Review`]s.
///
/// [`Reservation`]: crate::domain::Reservation
/// [`Review`]: crate::domain::Review
/// [`Space`]: crate::domain::Space
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(i64);

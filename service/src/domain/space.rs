//! [`Space`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::user;

/// Rentable storage space listed by a host.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Space {
    /// ID of this [`Space`].
    pub id: Id,

    /// [`Name`] of this [`Space`].
    pub name: Name,

    /// [`Location`] of this [`Space`].
    pub location: Location,

    /// [`Description`] of this [`Space`].
    pub description: Description,

    /// [`Kind`] of this [`Space`].
    pub kind: Kind,

    /// Daily rate of this [`Space`].
    ///
    /// Listings label it a monthly base rate, but every price computation
    /// multiplies it by billable days.
    pub price: Money,

    /// Aggregate [`Rating`] of this [`Space`].
    ///
    /// Derived from reviews, never written directly.
    pub rating: Rating,

    /// [`Feature`]s of this [`Space`].
    pub features: Vec<Feature>,

    /// Size of this [`Space`] in square meters.
    pub size: SquareMeters,

    /// [`Status`] of this [`Space`].
    pub status: Status,

    /// ID of the [`User`] hosting this [`Space`].
    ///
    /// Not validated against a user registry.
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,

    /// [`DateTime`] when this [`Space`] was created.
    #[serde(with = "common::datetime::serde::unix_timestamp")]
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Space`] was delisted, if it was.
    #[serde(
        default,
        with = "common::datetime::serde::unix_timestamp::opt"
    )]
    pub deleted_at: Option<DeletionDateTime>,
}

impl Space {
    /// Indicates whether this [`Space`] is still listed (not soft-deleted).
    #[must_use]
    pub fn is_listed(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// ID of a [`Space`].
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

/// Name of a [`Space`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(forward)]
#[serde(into = "String", try_from = "String")]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

impl TryFrom<String> for Name {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

/// Location of a [`Space`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(forward)]
#[serde(into = "String", try_from = "String")]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        location.trim() == location
            && !location.is_empty()
            && location.len() <= 512
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

impl TryFrom<String> for Location {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.0
    }
}

/// Description of a [`Space`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(forward)]
#[serde(into = "String", try_from = "String")]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description && description.len() <= 4096
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

impl TryFrom<String> for Description {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

impl From<Description> for String {
    fn from(description: Description) -> Self {
        description.0
    }
}

/// Single amenity of a [`Space`] (security camera, climate control, etc).
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(forward)]
#[serde(into = "String", try_from = "String")]
pub struct Feature(String);

impl Feature {
    /// Creates a new [`Feature`] if the given `feature` is valid.
    #[must_use]
    pub fn new(feature: impl Into<String>) -> Option<Self> {
        let feature = feature.into();
        Self::check(&feature).then_some(Self(feature))
    }

    /// Checks whether the given `feature` is a valid [`Feature`].
    fn check(feature: impl AsRef<str>) -> bool {
        let feature = feature.as_ref();
        feature.trim() == feature && !feature.is_empty() && feature.len() <= 128
    }
}

impl FromStr for Feature {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Feature`")
    }
}

impl TryFrom<String> for Feature {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Feature`")
    }
}

impl From<Feature> for String {
    fn from(feature: Feature) -> Self {
        feature.0
    }
}

/// Size of a [`Space`] in square meters.
pub type SquareMeters = u32;

/// Aggregate rating of a [`Space`], in `[0, 5]`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Into,
    PartialEq,
    Serialize,
)]
#[serde(into = "Decimal", try_from = "Decimal")]
pub struct Rating(Decimal);

impl Rating {
    /// A [`Rating`] of a [`Space`] no one has reviewed yet.
    #[must_use]
    pub const fn unrated() -> Self {
        Self(Decimal::ZERO)
    }

    /// Creates a new [`Rating`] if the given `value` is within `[0, 5]`.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (value >= Decimal::ZERO && value <= Decimal::new(5, 0))
            .then_some(Self(value))
    }
}

impl TryFrom<Decimal> for Rating {
    type Error = &'static str;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("`Rating` out of `[0, 5]` range")
    }
}

define_kind! {
    #[doc = "Kind of a [`Space`]."]
    enum Kind {
        #[doc = "A garage for vehicles."]
        Garage = 1,

        #[doc = "A warehouse or storage unit."]
        Warehouse = 2,
    }
}

define_kind! {
    #[doc = "Status of a [`Space`] listing."]
    enum Status {
        #[doc = "Listed and accepting reservations."]
        Active = 1,

        #[doc = "Temporarily hidden by the host."]
        Inactive = 2,
    }
}

/// [`DateTime`] when a [`Space`] was created.
pub type CreationDateTime = DateTimeOf<(Space, unit::Creation)>;

/// [`DateTime`] when a [`Space`] was deleted.
pub type DeletionDateTime = DateTimeOf<(Space, unit::Deletion)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Name, Rating};

    #[test]
    fn name_rejects_blank_and_padded_input() {
        assert!(Name::new("Garage Premium Centro").is_some());
        assert!(Name::new("").is_none());
        assert!(Name::new(" padded ").is_none());
    }

    #[test]
    fn rating_is_bounded() {
        assert!(Rating::new(Decimal::ZERO).is_some());
        assert!(Rating::new(Decimal::new(5, 0)).is_some());
        assert!(Rating::new(Decimal::new(51, 1)).is_none());
        assert!(Rating::new(Decimal::new(-1, 0)).is_none());
    }
}

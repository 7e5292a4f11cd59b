//! [`Review`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{space, user};

/// Tenant feedback left for a [`Space`].
///
/// [`Space`]: space::Space
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Review {
    /// ID of this [`Review`].
    pub id: Id,

    /// ID of the reviewed [`Space`].
    ///
    /// [`Space`]: space::Space
    pub space_id: space::Id,

    /// ID of the [`User`] who left this [`Review`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// [`Score`] given by this [`Review`].
    pub score: Score,

    /// Free-form [`Comment`] of this [`Review`].
    pub comment: Comment,

    /// [`DateTime`] when this [`Review`] was submitted.
    #[serde(with = "common::datetime::serde::unix_timestamp")]
    pub created_at: CreationDateTime,
}

/// ID of a [`Review`].
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

/// Score given by a [`Review`], in `[1, 5]`.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Into, PartialEq, Serialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub struct Score(u8);

impl Score {
    /// Creates a new [`Score`] if the given `value` is within `[1, 5]`.
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Self(value))
    }
}

impl TryFrom<u8> for Score {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("`Score` out of `[1, 5]` range")
    }
}

/// Free-form comment of a [`Review`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(forward)]
#[serde(into = "String", try_from = "String")]
pub struct Comment(String);

impl Comment {
    /// Creates a new [`Comment`] if the given `comment` is valid.
    #[must_use]
    pub fn new(comment: impl Into<String>) -> Option<Self> {
        let comment = comment.into();
        Self::check(&comment).then_some(Self(comment))
    }

    /// Checks whether the given `comment` is a valid [`Comment`].
    fn check(comment: impl AsRef<str>) -> bool {
        comment.as_ref().len() <= 4096
    }
}

impl FromStr for Comment {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Comment`")
    }
}

impl TryFrom<String> for Comment {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Comment`")
    }
}

impl From<Comment> for String {
    fn from(comment: Comment) -> Self {
        comment.0
    }
}

/// [`DateTime`] when a [`Review`] was submitted.
pub type CreationDateTime = DateTimeOf<(Review, unit::Creation)>;

/// Averages the provided [`Review`]s into a [`Space`]'s [`Rating`].
///
/// [`None`] is returned if there are no [`Review`]s to average.
///
/// [`Rating`]: space::Rating
/// [`Space`]: space::Space
#[must_use]
pub fn average_rating(reviews: &[Review]) -> Option<space::Rating> {
    if reviews.is_empty() {
        return None;
    }

    let sum = reviews
        .iter()
        .map(|r| Decimal::from(u8::from(r.score)))
        .sum::<Decimal>();
    space::Rating::new(sum / Decimal::from(reviews.len()))
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rust_decimal::Decimal;

    use super::{average_rating, Review, Score};

    fn review(score: u8) -> Review {
        Review {
            id: 1.into(),
            space_id: 1.into(),
            user_id: 1.into(),
            score: Score::new(score).unwrap(),
            comment: "Clean and easy to access".parse().unwrap(),
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn score_is_bounded() {
        assert!(Score::new(0).is_none());
        assert!(Score::new(1).is_some());
        assert!(Score::new(5).is_some());
        assert!(Score::new(6).is_none());
    }

    #[test]
    fn averages_scores_exactly() {
        let reviews = [review(5), review(4), review(3)];

        let rating = average_rating(&reviews).unwrap();

        assert_eq!(Decimal::from(rating), Decimal::new(4, 0));
    }

    #[test]
    fn no_reviews_means_no_rating() {
        assert_eq!(average_rating(&[]), None);
    }
}

//! [`Reservation`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money, Percent};
use derive_more::{Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{space, user};

/// Seconds in a single billable day.
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Share of the base price charged as a service fee.
fn service_fee_rate() -> Percent {
    Percent::new(Decimal::TEN).expect("infallible")
}

/// Booking of a [`Space`] for a [`Period`] of time.
///
/// [`Space`]: space::Space
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Reservation {
    /// ID of this [`Reservation`].
    pub id: Id,

    /// ID of the reserved [`Space`].
    ///
    /// [`Space`]: space::Space
    pub space_id: space::Id,

    /// ID of the [`User`] who reserved the [`Space`].
    ///
    /// [`Space`]: space::Space
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// [`Period`] this [`Reservation`] occupies.
    #[serde(flatten)]
    pub period: Period,

    /// Full price charged for this [`Reservation`], fees included.
    pub total_price: Money,

    /// [`Status`] of this [`Reservation`].
    pub status: Status,

    /// [`DateTime`] when this [`Reservation`] was created.
    #[serde(with = "common::datetime::serde::unix_timestamp")]
    pub created_at: CreationDateTime,
}

/// ID of a [`Reservation`].
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

/// Time interval occupied by a [`Reservation`].
///
/// Boundaries are inclusive on both ends, so two [`Period`]s sharing only an
/// endpoint still [overlap].
///
/// [overlap]: Period::overlaps
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Period {
    /// [`DateTime`] this [`Period`] starts at.
    #[serde(with = "common::datetime::serde::unix_timestamp")]
    starts_at: StartDateTime,

    /// [`DateTime`] this [`Period`] ends at.
    #[serde(with = "common::datetime::serde::unix_timestamp")]
    ends_at: EndDateTime,
}

impl Period {
    /// Creates a new [`Period`] if `starts_at` is strictly before `ends_at`.
    #[must_use]
    pub fn new(starts_at: StartDateTime, ends_at: EndDateTime) -> Option<Self> {
        (starts_at.coerce::<()>() < ends_at.coerce::<()>())
            .then_some(Self { starts_at, ends_at })
    }

    /// Returns the [`DateTime`] this [`Period`] starts at.
    #[must_use]
    pub fn starts_at(&self) -> StartDateTime {
        self.starts_at
    }

    /// Returns the [`DateTime`] this [`Period`] ends at.
    #[must_use]
    pub fn ends_at(&self) -> EndDateTime {
        self.ends_at
    }

    /// Indicates whether this [`Period`] overlaps with the `other` one.
    ///
    /// Endpoints are inclusive: a [`Period`] starting exactly when another one
    /// ends does overlap with it.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.starts_at.coerce::<()>() <= other.ends_at.coerce()
            && self.ends_at.coerce::<()>() >= other.starts_at.coerce()
    }

    /// Returns the number of billable days covered by this [`Period`].
    ///
    /// Any partial day at the end counts as a whole one.
    #[expect(clippy::missing_panics_doc, reason = "invariant")]
    #[must_use]
    pub fn billable_days(&self) -> u32 {
        let span = self.ends_at.coerce::<()>() - self.starts_at.coerce();
        let mut days = span.as_secs() / SECS_PER_DAY;
        if span.as_secs() % SECS_PER_DAY != 0 || span.subsec_nanos() != 0 {
            days += 1;
        }
        days.try_into().expect("`Period` spans less than `u32::MAX` days")
    }
}

/// Price breakdown of reserving a [`Space`] for some [`Period`].
///
/// [`Space`]: space::Space
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Quote {
    /// Number of billable days in the quoted [`Period`].
    pub days: u32,

    /// Daily rate multiplied by the number of billable days.
    pub base_price: Money,

    /// Service fee added on top of the [`base_price`].
    ///
    /// [`base_price`]: Quote::base_price
    pub service_fee: Money,

    /// Final amount to charge.
    pub total: Money,
}

impl Quote {
    /// Prices the provided [`Period`] at the provided daily rate.
    #[must_use]
    pub fn for_period(price: Money, period: &Period) -> Self {
        let days = period.billable_days();
        let base = price.amount * Decimal::from(days);
        let fee = service_fee_rate().of(base);
        Self {
            days,
            base_price: Money {
                amount: base,
                currency: price.currency,
            },
            service_fee: Money {
                amount: fee,
                currency: price.currency,
            },
            total: Money {
                amount: base + fee,
                currency: price.currency,
            },
        }
    }
}

define_kind! {
    #[doc = "Status of a [`Reservation`]."]
    enum Status {
        #[doc = "Awaiting payment confirmation."]
        Pending = 1,

        #[doc = "Paid and occupying its [`Period`]."]
        Confirmed = 2,

        #[doc = "Past its [`Period`]."]
        Completed = 3,

        #[doc = "Cancelled by the tenant."]
        Cancelled = 4,
    }
}

/// [`DateTime`] when a [`Period`] starts.
pub type StartDateTime = DateTimeOf<(Period, unit::Start)>;

/// [`DateTime`] when a [`Period`] ends.
pub type EndDateTime = DateTimeOf<(Period, unit::End)>;

/// [`DateTime`] when a [`Reservation`] was created.
pub type CreationDateTime = DateTimeOf<(Reservation, unit::Creation)>;

//! [`SuggestedPrice`] report definition.

use std::time::Duration;

use common::{
    operations::{By, Select},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::{Decimal, RoundingStrategy};
use smart_default::SmartDefault;
use tracerr::Traced;

use crate::{
    domain::{space, Reservation, Space},
    infra::{store, Storage},
    read, Query, Service,
};

/// Price suggestion policy.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Policy {
    /// Multiplier applied over the high season (June to September).
    #[default(Decimal::from_parts(13, 0, 0, false, 1))]
    pub summer: Decimal,

    /// Multiplier applied over the low season.
    #[default(Decimal::from_parts(9, 0, 0, false, 1))]
    pub winter: Decimal,

    /// Multiplier applied over holiday months (December and July).
    #[default(Decimal::from_parts(15, 0, 0, false, 1))]
    pub holidays: Decimal,
}

impl Policy {
    /// Returns the seasonal multiplier of this [`Policy`] at the provided
    /// moment.
    ///
    /// Holiday months take precedence over the high season.
    #[must_use]
    pub fn seasonal_multiplier(&self, at: DateTime) -> Decimal {
        match at.month() {
            12 | 7 => self.holidays,
            6..=9 => self.summer,
            _ => self.winter,
        }
    }
}

/// Window of recent [`Reservation`]s driving the demand multiplier.
const DEMAND_WINDOW: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Calculates the demand multiplier out of the [`Reservation`]s starting
/// within the last 30 days (or later), clamped to `[0.8, 1.5]`.
#[must_use]
pub fn demand_multiplier(reservations: &[Reservation], now: DateTime) -> Decimal {
    let cutoff = now - DEMAND_WINDOW;
    let recent = reservations
        .iter()
        .filter(|r| r.period.starts_at().coerce::<()>() >= cutoff)
        .count();

    let factor = Decimal::from(recent) / Decimal::from(30);
    (Decimal::ONE + factor * Decimal::from_parts(2, 0, 0, false, 1)).clamp(
        Decimal::from_parts(8, 0, 0, false, 1),
        Decimal::from_parts(15, 0, 0, false, 1),
    )
}

/// [`Query`] suggesting a daily rate for a [`Space`] out of season and
/// demand.
#[derive(Clone, Copy, Debug)]
pub struct SuggestedPrice {
    /// ID of the [`Space`] to suggest a rate for.
    pub space_id: space::Id,
}

/// Output of the [`SuggestedPrice`] [`Query`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Output {
    /// Current daily rate of the [`Space`].
    ///
    /// [`Space`]: crate::domain::Space
    pub base: Money,

    /// Seasonal multiplier applied.
    pub seasonal: Decimal,

    /// Demand multiplier applied.
    pub demand: Decimal,

    /// Suggested daily rate, rounded to a whole amount.
    pub suggested: Money,
}

impl Output {
    /// Calculates the [`Output`] for the provided [`Space`] at the provided
    /// moment.
    #[must_use]
    pub fn calculate(
        policy: &Policy,
        space: &Space,
        reservations: &[Reservation],
        now: DateTime,
    ) -> Self {
        let seasonal = policy.seasonal_multiplier(now);
        let demand = demand_multiplier(reservations, now);
        let suggested = (space.price.amount * seasonal * demand)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Self {
            base: space.price,
            seasonal,
            demand,
            suggested: Money {
                amount: suggested,
                currency: space.price.currency,
            },
        }
    }
}

impl<Db> Query<SuggestedPrice> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Space>, space::Id>>,
            Ok = Option<Space>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<Vec<Reservation>, read::reservation::list::Filter>>,
            Ok = Vec<Reservation>,
            Err = Traced<store::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: SuggestedPrice,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let space = self
            .store()
            .execute(Select(By::<Option<Space>, _>::new(query.space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SpaceNotFound(query.space_id))
            .map_err(tracerr::wrap!())?;

        // Demand is marketplace-wide, not per `Space`.
        let reservations = self
            .store()
            .execute(Select(By::<Vec<Reservation>, _>::new(
                read::reservation::list::Filter::default(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output::calculate(
            &self.config().pricing,
            &space,
            &reservations,
            DateTime::now(),
        ))
    }
}

/// Error of [`SuggestedPrice`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Store(store::Error),

    /// [`Space`] with the provided ID does not exist.
    #[display("`Space(id: {_0})` does not exist")]
    SpaceNotFound(#[error(not(source))] space::Id),
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rust_decimal::Decimal;

    use crate::domain::{reservation, space, Reservation, Space};

    use super::{demand_multiplier, Output, Policy};

    fn space(price: &str) -> Space {
        Space {
            id: 1.into(),
            name: "Garage Centro".parse().unwrap(),
            location: "Madrid".parse().unwrap(),
            description: "".parse().unwrap(),
            kind: space::Kind::Garage,
            price: price.parse().unwrap(),
            rating: space::Rating::unrated(),
            features: vec![],
            size: 20,
            status: space::Status::Active,
            owner_id: 1.into(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    fn reservation(starts_at: &str) -> Reservation {
        let starts_at = DateTime::from_rfc3339(starts_at).unwrap();
        Reservation {
            id: 1.into(),
            space_id: 1.into(),
            user_id: 7.into(),
            period: reservation::Period::new(
                starts_at.coerce(),
                (starts_at + std::time::Duration::from_secs(86_400)).coerce(),
            )
            .unwrap(),
            total_price: "110EUR".parse().unwrap(),
            status: reservation::Status::Confirmed,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn holidays_take_precedence_over_high_season() {
        let policy = Policy::default();

        let july = DateTime::from_rfc3339("2024-07-15T00:00:00Z").unwrap();
        assert_eq!(policy.seasonal_multiplier(july), policy.holidays);

        let august = DateTime::from_rfc3339("2024-08-15T00:00:00Z").unwrap();
        assert_eq!(policy.seasonal_multiplier(august), policy.summer);

        let december = DateTime::from_rfc3339("2024-12-15T00:00:00Z").unwrap();
        assert_eq!(policy.seasonal_multiplier(december), policy.holidays);

        let february = DateTime::from_rfc3339("2024-02-15T00:00:00Z").unwrap();
        assert_eq!(policy.seasonal_multiplier(february), policy.winter);
    }

    #[test]
    fn demand_counts_only_recent_reservations() {
        let now = DateTime::from_rfc3339("2024-08-15T00:00:00Z").unwrap();

        assert_eq!(demand_multiplier(&[], now), Decimal::ONE);

        let stale = vec![reservation("2024-01-01T00:00:00Z")];
        assert_eq!(demand_multiplier(&stale, now), Decimal::ONE);

        // 1 + 3/30 * 0.2 = 1.02
        let recent = vec![
            reservation("2024-08-01T00:00:00Z"),
            reservation("2024-08-05T00:00:00Z"),
            reservation("2024-08-10T00:00:00Z"),
        ];
        assert_eq!(
            demand_multiplier(&recent, now),
            Decimal::from_parts(102, 0, 0, false, 2),
        );
    }

    #[test]
    fn demand_is_clamped() {
        let now = DateTime::from_rfc3339("2024-08-15T00:00:00Z").unwrap();

        // 1 + 90/30 * 0.2 = 1.6, clamped to 1.5.
        let busy: Vec<_> = (0..90)
            .map(|_| reservation("2024-08-01T00:00:00Z"))
            .collect();
        assert_eq!(
            demand_multiplier(&busy, now),
            Decimal::from_parts(15, 0, 0, false, 1),
        );
    }

    #[test]
    fn suggested_rate_is_rounded_to_a_whole_amount() {
        let now = DateTime::from_rfc3339("2024-02-15T00:00:00Z").unwrap();

        let output =
            Output::calculate(&Policy::default(), &space("15EUR"), &[], now);

        // 15 * 0.9 * 1 = 13.5, rounded half away from zero.
        assert_eq!(output.seasonal, Decimal::from_parts(9, 0, 0, false, 1));
        assert_eq!(output.demand, Decimal::ONE);
        assert_eq!(output.suggested.amount, Decimal::new(14, 0));
    }
}

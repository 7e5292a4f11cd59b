//! [`Performance`] report definition.

use common::operations::{By, Select};
use itertools::Itertools as _;
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{space, Reservation, Space},
    infra::{store, Storage},
    read, Query, Service,
};

/// [`Query`] aggregating marketplace performance across all [`Space`]s.
#[derive(Clone, Copy, Debug)]
pub struct Performance;

/// Output of the [`Performance`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Income per calendar [`Month`].
    pub monthly_income: Vec<MonthlyIncome>,

    /// Occupancy rate per [`Space`].
    pub occupancy: Vec<Occupancy>,

    /// Income per [`space::Kind`].
    pub income_by_kind: Vec<KindIncome>,

    /// Number of [`Reservation`]s per calendar [`Month`].
    pub monthly_bookings: Vec<MonthlyBookings>,
}

impl Output {
    /// Builds an [`Output`] out of the provided collections.
    ///
    /// Folds are order-independent: rows come out sorted regardless of the
    /// input ordering. Placeholder rows are produced when either collection
    /// is empty.
    #[must_use]
    pub fn new(spaces: &[Space], reservations: &[Reservation]) -> Self {
        if spaces.is_empty() || reservations.is_empty() {
            return Self::placeholder();
        }
        Self {
            monthly_income: monthly_income(reservations),
            occupancy: occupancy(spaces, reservations),
            income_by_kind: income_by_kind(spaces, reservations),
            monthly_bookings: monthly_bookings(reservations),
        }
    }

    /// Returns the [`Output`] reported when there is nothing to aggregate.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            monthly_income: vec![MonthlyIncome {
                month: Month::PLACEHOLDER,
                total: Decimal::ZERO,
            }],
            occupancy: vec![Occupancy {
                space_id: space::Id::default(),
                rate: Decimal::ZERO,
            }],
            income_by_kind: vec![KindIncome {
                kind: space::Kind::Garage,
                income: Decimal::ZERO,
            }],
            monthly_bookings: vec![MonthlyBookings {
                month: Month::PLACEHOLDER,
                bookings: 0,
            }],
        }
    }
}

/// Calendar month a [`Reservation`] starts in.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Month {
    /// Calendar year.
    pub year: i32,

    /// Calendar month, 1-based.
    pub month: u8,
}

impl Month {
    /// [`Month`] reported when there is nothing to aggregate.
    pub const PLACEHOLDER: Self = Self {
        year: 2024,
        month: 1,
    };

    /// Returns the [`Month`] the provided [`Reservation`] starts in.
    #[must_use]
    pub fn of(reservation: &Reservation) -> Self {
        let starts_at = reservation.period.starts_at();
        Self {
            year: starts_at.year(),
            month: starts_at.month(),
        }
    }
}

/// Income aggregated over a single [`Month`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MonthlyIncome {
    /// [`Month`] the income was earned in.
    pub month: Month,

    /// Total income of the [`Month`].
    pub total: Decimal,
}

/// Occupancy rate of a single [`Space`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Occupancy {
    /// ID of the [`Space`].
    pub space_id: space::Id,

    /// Percentage of the year the [`Space`] is reserved for, capped at 100.
    pub rate: Decimal,
}

/// Income aggregated over a single [`space::Kind`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KindIncome {
    /// [`space::Kind`] the income belongs to.
    pub kind: space::Kind,

    /// Total income of the [`space::Kind`], rounded to cents.
    pub income: Decimal,
}

/// Number of [`Reservation`]s made over a single [`Month`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MonthlyBookings {
    /// [`Month`] the [`Reservation`]s start in.
    pub month: Month,

    /// Number of [`Reservation`]s starting in the [`Month`].
    pub bookings: u32,
}

/// Sums [`Reservation`] totals per the [`Month`] they start in.
#[must_use]
pub fn monthly_income(reservations: &[Reservation]) -> Vec<MonthlyIncome> {
    reservations
        .iter()
        .map(|r| (Month::of(r), r.total_price.amount))
        .into_grouping_map()
        .sum()
        .into_iter()
        .sorted_by_key(|(month, _)| *month)
        .map(|(month, total)| MonthlyIncome { month, total })
        .collect()
}

/// Calculates the share of the year every [`Space`] is reserved for.
#[must_use]
pub fn occupancy(
    spaces: &[Space],
    reservations: &[Reservation],
) -> Vec<Occupancy> {
    spaces
        .iter()
        .map(|space| {
            let days: u32 = reservations
                .iter()
                .filter(|r| r.space_id == space.id)
                .map(|r| r.period.billable_days())
                .sum();
            Occupancy {
                space_id: space.id,
                rate: (Decimal::from(days) * Decimal::ONE_HUNDRED
                    / Decimal::from(DAYS_PER_YEAR))
                .min(Decimal::ONE_HUNDRED),
            }
        })
        .sorted_by_key(|o| o.space_id)
        .collect()
}

/// Sums [`Reservation`] totals per the [`space::Kind`] of the reserved
/// [`Space`].
#[must_use]
pub fn income_by_kind(
    spaces: &[Space],
    reservations: &[Reservation],
) -> Vec<KindIncome> {
    spaces
        .iter()
        .map(|space| {
            let income: Decimal = reservations
                .iter()
                .filter(|r| r.space_id == space.id)
                .map(|r| r.total_price.amount)
                .sum();
            (space.kind, income)
        })
        .into_grouping_map()
        .sum()
        .into_iter()
        .sorted_by_key(|(kind, _)| *kind)
        .map(|(kind, income)| KindIncome {
            kind,
            income: income.round_dp(2),
        })
        .collect()
}

/// Counts [`Reservation`]s per the [`Month`] they start in.
#[must_use]
pub fn monthly_bookings(reservations: &[Reservation]) -> Vec<MonthlyBookings> {
    reservations
        .iter()
        .map(|r| (Month::of(r), 1_u32))
        .into_grouping_map()
        .sum()
        .into_iter()
        .sorted_by_key(|(month, _)| *month)
        .map(|(month, bookings)| MonthlyBookings { month, bookings })
        .collect()
}

/// Days a year is assumed to have when calculating [`Occupancy`].
const DAYS_PER_YEAR: u32 = 365;

impl<Db> Query<Performance> for Service<Db>
where
    Db: Storage<
            Select<By<Vec<Space>, read::space::list::Filter>>,
            Ok = Vec<Space>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<Vec<Reservation>, read::reservation::list::Filter>>,
            Ok = Vec<Reservation>,
            Err = Traced<store::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<store::Error>;

    async fn execute(&self, _: Performance) -> Result<Self::Ok, Self::Err> {
        let spaces = self
            .store()
            .execute(Select(By::<Vec<Space>, _>::new(
                read::space::list::Filter::default(),
            )))
            .await
            .map_err(tracerr::wrap!())?;
        let reservations = self
            .store()
            .execute(Select(By::<Vec<Reservation>, _>::new(
                read::reservation::list::Filter::default(),
            )))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Output::new(&spaces, &reservations))
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rust_decimal::Decimal;

    use crate::domain::{reservation, space, Reservation, Space};

    use super::{Month, Output};

    fn space(id: i64, kind: space::Kind) -> Space {
        Space {
            id: id.into(),
            name: "Garage Centro".parse().unwrap(),
            location: "Madrid".parse().unwrap(),
            description: "".parse().unwrap(),
            kind,
            price: "100EUR".parse().unwrap(),
            rating: space::Rating::unrated(),
            features: vec![],
            size: 20,
            status: space::Status::Active,
            owner_id: 1.into(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    fn reservation(
        id: i64,
        space_id: i64,
        starts_at: &str,
        ends_at: &str,
        total: &str,
    ) -> Reservation {
        Reservation {
            id: id.into(),
            space_id: space_id.into(),
            user_id: 7.into(),
            period: reservation::Period::new(
                DateTime::from_rfc3339(starts_at).unwrap().coerce(),
                DateTime::from_rfc3339(ends_at).unwrap().coerce(),
            )
            .unwrap(),
            total_price: total.parse().unwrap(),
            status: reservation::Status::Confirmed,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn folds_are_order_independent() {
        let spaces =
            [space(1, space::Kind::Garage), space(2, space::Kind::Warehouse)];
        let mut reservations = vec![
            reservation(
                1,
                1,
                "2024-03-01T00:00:00Z",
                "2024-03-06T00:00:00Z",
                "550EUR",
            ),
            reservation(
                2,
                2,
                "2024-03-10T00:00:00Z",
                "2024-03-12T00:00:00Z",
                "220EUR",
            ),
            reservation(
                3,
                1,
                "2024-04-01T00:00:00Z",
                "2024-04-03T00:00:00Z",
                "220EUR",
            ),
        ];

        let straight = Output::new(&spaces, &reservations);
        reservations.reverse();
        let reversed = Output::new(&spaces, &reservations);

        assert_eq!(straight, reversed);
    }

    #[test]
    fn aggregates_income_and_bookings_by_start_month() {
        let spaces = [space(1, space::Kind::Garage)];
        let reservations = [
            reservation(
                1,
                1,
                "2024-03-01T00:00:00Z",
                "2024-03-06T00:00:00Z",
                "550EUR",
            ),
            reservation(
                2,
                1,
                "2024-03-10T00:00:00Z",
                "2024-03-12T00:00:00Z",
                "220EUR",
            ),
            reservation(
                3,
                1,
                "2024-04-01T00:00:00Z",
                "2024-04-03T00:00:00Z",
                "220EUR",
            ),
        ];

        let output = Output::new(&spaces, &reservations);

        assert_eq!(output.monthly_income.len(), 2);
        assert_eq!(
            output.monthly_income[0].month,
            Month {
                year: 2024,
                month: 3,
            },
        );
        assert_eq!(output.monthly_income[0].total, Decimal::new(770, 0));
        assert_eq!(output.monthly_bookings[0].bookings, 2);
        assert_eq!(output.monthly_bookings[1].bookings, 1);
    }

    #[test]
    fn occupancy_is_capped_at_one_hundred() {
        let spaces = [space(1, space::Kind::Garage)];
        let reservations = [
            reservation(
                1,
                1,
                "2024-01-01T00:00:00Z",
                "2024-12-31T00:00:00Z",
                "100EUR",
            ),
            reservation(
                2,
                1,
                "2025-01-01T00:00:00Z",
                "2025-12-31T00:00:00Z",
                "100EUR",
            ),
        ];

        let output = Output::new(&spaces, &reservations);

        assert_eq!(output.occupancy.len(), 1);
        assert_eq!(output.occupancy[0].rate, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn groups_income_by_space_kind() {
        let spaces =
            [space(1, space::Kind::Garage), space(2, space::Kind::Warehouse)];
        let reservations = [
            reservation(
                1,
                1,
                "2024-03-01T00:00:00Z",
                "2024-03-06T00:00:00Z",
                "550EUR",
            ),
            reservation(
                2,
                2,
                "2024-03-10T00:00:00Z",
                "2024-03-12T00:00:00Z",
                "220EUR",
            ),
        ];

        let output = Output::new(&spaces, &reservations);

        assert_eq!(output.income_by_kind.len(), 2);
        assert_eq!(output.income_by_kind[0].kind, space::Kind::Garage);
        assert_eq!(output.income_by_kind[0].income, Decimal::new(550, 0));
        assert_eq!(output.income_by_kind[1].income, Decimal::new(220, 0));
    }

    #[test]
    fn empty_input_produces_placeholder_rows() {
        let output = Output::new(&[], &[]);

        assert_eq!(output, Output::placeholder());
        assert_eq!(output.monthly_income[0].month, Month::PLACEHOLDER);
        assert_eq!(output.monthly_income[0].total, Decimal::ZERO);

        let spaces = [space(1, space::Kind::Garage)];
        assert_eq!(Output::new(&spaces, &[]), Output::placeholder());
    }
}

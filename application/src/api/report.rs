//! Report-related REST API handlers.

use axum::{extract::Path, Extension, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use service::{
    domain::space,
    query::report::{
        performance, pricing, Performance, SuggestedPrice,
    },
    Query as _,
};

use crate::{define_error, AsError as _, Error, Service};

/// Response of the [`performance`] handler.
#[derive(Clone, Debug, Serialize)]
pub struct PerformanceResponse {
    /// Income per calendar month.
    pub monthly_income: Vec<MonthlyIncomeRow>,

    /// Occupancy rate per [`Space`].
    ///
    /// [`Space`]: service::domain::Space
    pub occupancy: Vec<OccupancyRow>,

    /// Income per [`space::Kind`].
    pub income_by_kind: Vec<KindIncomeRow>,

    /// Number of [`Reservation`]s per calendar month.
    ///
    /// [`Reservation`]: service::domain::Reservation
    pub monthly_bookings: Vec<MonthlyBookingsRow>,
}

impl From<performance::Output> for PerformanceResponse {
    fn from(output: performance::Output) -> Self {
        let performance::Output {
            monthly_income,
            occupancy,
            income_by_kind,
            monthly_bookings,
        } = output;

        Self {
            monthly_income: monthly_income
                .into_iter()
                .map(|row| MonthlyIncomeRow {
                    year: row.month.year,
                    month: row.month.month,
                    total: row.total,
                })
                .collect(),
            occupancy: occupancy
                .into_iter()
                .map(|row| OccupancyRow {
                    space_id: row.space_id,
                    rate: row.rate,
                })
                .collect(),
            income_by_kind: income_by_kind
                .into_iter()
                .map(|row| KindIncomeRow {
                    kind: row.kind,
                    income: row.income,
                })
                .collect(),
            monthly_bookings: monthly_bookings
                .into_iter()
                .map(|row| MonthlyBookingsRow {
                    year: row.month.year,
                    month: row.month.month,
                    bookings: row.bookings,
                })
                .collect(),
        }
    }
}

/// Income aggregated over a single calendar month.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct MonthlyIncomeRow {
    /// Calendar year.
    pub year: i32,

    /// Calendar month, 1-based.
    pub month: u8,

    /// Total income of the month.
    pub total: Decimal,
}

/// Occupancy rate of a single [`Space`].
///
/// [`Space`]: service::domain::Space
#[derive(Clone, Copy, Debug, Serialize)]
pub struct OccupancyRow {
    /// ID of the [`Space`].
    ///
    /// [`Space`]: service::domain::Space
    pub space_id: space::Id,

    /// Percentage of the year the [`Space`] is reserved for, capped at 100.
    ///
    /// [`Space`]: service::domain::Space
    pub rate: Decimal,
}

/// Income aggregated over a single [`space::Kind`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct KindIncomeRow {
    /// [`space::Kind`] the income belongs to.
    pub kind: space::Kind,

    /// Total income of the [`space::Kind`], rounded to cents.
    pub income: Decimal,
}

/// Number of [`Reservation`]s made over a single calendar month.
///
/// [`Reservation`]: service::domain::Reservation
#[derive(Clone, Copy, Debug, Serialize)]
pub struct MonthlyBookingsRow {
    /// Calendar year.
    pub year: i32,

    /// Calendar month, 1-based.
    pub month: u8,

    /// Number of [`Reservation`]s starting in the month.
    ///
    /// [`Reservation`]: service::domain::Reservation
    pub bookings: u32,
}

/// Aggregates marketplace-wide performance metrics.
pub async fn performance(
    Extension(service): Extension<Service>,
) -> Result<Json<PerformanceResponse>, Error> {
    service
        .execute(Performance)
        .await
        .map(|output| Json(output.into()))
        .map_err(|e| e.into_error())
}

/// Response of the [`suggested_price`] handler.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SuggestedPriceResponse {
    /// Current daily rate of the [`Space`].
    ///
    /// [`Space`]: service::domain::Space
    pub base: common::Money,

    /// Seasonal multiplier applied.
    pub seasonal: Decimal,

    /// Demand multiplier applied.
    pub demand: Decimal,

    /// Suggested daily rate, rounded to a whole amount.
    pub suggested: common::Money,
}

/// Suggests a daily rate for the [`Space`] with the provided ID.
///
/// [`Space`]: service::domain::Space
pub async fn suggested_price(
    Extension(service): Extension<Service>,
    Path(space_id): Path<space::Id>,
) -> Result<Json<SuggestedPriceResponse>, Error> {
    service
        .execute(SuggestedPrice { space_id })
        .await
        .map(|output| {
            Json(SuggestedPriceResponse {
                base: output.base,
                seasonal: output.seasonal,
                demand: output.demand,
                suggested: output.suggested,
            })
        })
        .map_err(|e| e.into_error())
}

impl crate::AsError for pricing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SPACE_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Space` with the provided ID does not exist"]
                NotFound,
            }
        }

        match self {
            Self::Store(e) => e.try_as_error(),
            Self::SpaceNotFound(_) => Some(Error::NotFound.into()),
        }
    }
}

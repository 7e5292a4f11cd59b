//! [`Reservation`]-related REST API handlers.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, CancelReservation, ReserveSpace},
    domain::{
        reservation::{self, Quote},
        space, user, Reservation,
    },
    query::{self, availability::CheckAvailability, quote::PriceQuote},
    read, Command as _,
};

use crate::{api, define_error, AsError as _, Error, Service};

/// Parameters of the [`list`] handler.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// ID of the [`Space`] to filter by.
    ///
    /// [`Space`]: service::domain::Space
    pub space_id: Option<space::Id>,

    /// ID of the [`User`] to filter by.
    ///
    /// [`User`]: service::domain::User
    pub user_id: Option<user::Id>,

    /// [`reservation::Status`] to filter by.
    pub status: Option<reservation::Status>,
}

/// Lists [`Reservation`]s matching the provided [`ListParams`].
pub async fn list(
    Extension(service): Extension<Service>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Reservation>>, Error> {
    let ListParams {
        space_id,
        user_id,
        status,
    } = params;

    service
        .execute(query::reservations::List::by(
            read::reservation::list::Filter {
                space_id,
                user_id,
                status,
            },
        ))
        .await
        .map(Json)
        .map_err(|e| e.into_error())
}

/// Body of the [`create`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct ReserveSpaceRequest {
    /// ID of the [`Space`] to reserve.
    ///
    /// [`Space`]: service::domain::Space
    pub space_id: space::Id,

    /// ID of the [`User`] reserving the [`Space`].
    ///
    /// [`Space`]: service::domain::Space
    /// [`User`]: service::domain::User
    pub tenant_id: user::Id,

    /// [RFC 3339] date and time the [`reservation::Period`] starts at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub starts_at: String,

    /// [RFC 3339] date and time the [`reservation::Period`] ends at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub ends_at: String,
}

/// Reserves a [`Space`] over the requested [`reservation::Period`].
///
/// [`Space`]: service::domain::Space
pub async fn create(
    Extension(service): Extension<Service>,
    Json(body): Json<ReserveSpaceRequest>,
) -> Result<(http::StatusCode, Json<Reservation>), Error> {
    let ReserveSpaceRequest {
        space_id,
        tenant_id,
        starts_at,
        ends_at,
    } = body;

    service
        .execute(ReserveSpace {
            space_id,
            tenant_id,
            starts_at: api::parse_datetime(&starts_at)?,
            ends_at: api::parse_datetime(&ends_at)?,
        })
        .await
        .map(|reservation| (http::StatusCode::CREATED, Json(reservation)))
        .map_err(|e| e.into_error())
}

/// Cancels the [`Reservation`] with the provided ID.
pub async fn cancel(
    Extension(service): Extension<Service>,
    Path(id): Path<reservation::Id>,
) -> Result<Json<Reservation>, Error> {
    service
        .execute(CancelReservation { id })
        .await
        .map(Json)
        .map_err(|e| e.into_error())
}

/// Parameters describing a requested [`reservation::Period`].
#[derive(Clone, Debug, Deserialize)]
pub struct PeriodParams {
    /// [RFC 3339] date and time the [`reservation::Period`] starts at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub starts_at: String,

    /// [RFC 3339] date and time the [`reservation::Period`] ends at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub ends_at: String,
}

/// Response of the [`availability`] handler.
#[derive(Clone, Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Indicator whether the requested [`reservation::Period`] is free.
    pub available: bool,

    /// First found [`Reservation`] overlapping with the requested
    /// [`reservation::Period`], if any.
    pub conflict: Option<Reservation>,
}

/// Checks whether the [`Space`] with the provided ID is free over the
/// requested [`reservation::Period`].
///
/// [`Space`]: service::domain::Space
pub async fn availability(
    Extension(service): Extension<Service>,
    Path(space_id): Path<space::Id>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<AvailabilityResponse>, Error> {
    let PeriodParams { starts_at, ends_at } = params;

    service
        .execute(CheckAvailability {
            space_id,
            starts_at: api::parse_datetime(&starts_at)?,
            ends_at: api::parse_datetime(&ends_at)?,
        })
        .await
        .map(|availability| {
            Json(AvailabilityResponse {
                available: availability.is_available(),
                conflict: availability.conflict,
            })
        })
        .map_err(|e| e.into_error())
}

/// Prices the requested [`reservation::Period`] of the [`Space`] with the
/// provided ID.
///
/// [`Space`]: service::domain::Space
pub async fn quote(
    Extension(service): Extension<Service>,
    Path(space_id): Path<space::Id>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<Quote>, Error> {
    let PeriodParams { starts_at, ends_at } = params;

    service
        .execute(PriceQuote {
            space_id,
            starts_at: api::parse_datetime(&starts_at)?,
            ends_at: api::parse_datetime(&ends_at)?,
        })
        .await
        .map(Json)
        .map_err(|e| e.into_error())
}

impl crate::AsError for command::reserve_space::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SPACE_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Space` with the provided ID does not exist"]
                NotFound,

                #[code = "INVALID_DATE_RANGE"]
                #[status = BAD_REQUEST]
                #[message = "`Period` must start strictly before it ends"]
                InvalidDateRange,

                #[code = "DATE_CONFLICT"]
                #[status = CONFLICT]
                #[message = "`Space` is already reserved over the requested \
                             `Period`"]
                DateConflict,

                #[code = "PAYMENT_TIMED_OUT"]
                #[status = GATEWAY_TIMEOUT]
                #[message = "Payment wasn't captured in time"]
                PaymentTimedOut,
            }
        }

        match self {
            Self::Store(e) => e.try_as_error(),
            Self::SpaceNotFound(_) => Some(Error::NotFound.into()),
            Self::InvalidDateRange => Some(Error::InvalidDateRange.into()),
            Self::DateConflict(_) => Some(Error::DateConflict.into()),
            Self::PaymentTimedOut => Some(Error::PaymentTimedOut.into()),
        }
    }
}

impl crate::AsError for command::cancel_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "RESERVATION_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Reservation` with the provided ID does not \
                             exist"]
                NotFound,
            }
        }

        match self {
            Self::Store(e) => e.try_as_error(),
            Self::ReservationNotFound(_) => Some(Error::NotFound.into()),
        }
    }
}

impl crate::AsError for query::availability::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SPACE_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Space` with the provided ID does not exist"]
                NotFound,

                #[code = "INVALID_DATE_RANGE"]
                #[status = BAD_REQUEST]
                #[message = "`Period` must start strictly before it ends"]
                InvalidDateRange,
            }
        }

        match self {
            Self::Store(e) => e.try_as_error(),
            Self::SpaceNotFound(_) => Some(Error::NotFound.into()),
            Self::InvalidDateRange => Some(Error::InvalidDateRange.into()),
        }
    }
}

impl crate::AsError for query::quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SPACE_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Space` with the provided ID does not exist"]
                NotFound,

                #[code = "INVALID_DATE_RANGE"]
                #[status = BAD_REQUEST]
                #[message = "`Period` must start strictly before it ends"]
                InvalidDateRange,
            }
        }

        match self {
            Self::Store(e) => e.try_as_error(),
            Self::SpaceNotFound(_) => Some(Error::NotFound.into()),
            Self::InvalidDateRange => Some(Error::InvalidDateRange.into()),
        }
    }
}

//! REST API definitions.

pub mod report;
pub mod reservation;
pub mod space;

use axum::{
    routing::{get, post},
    Router,
};
use common::datetime::DateTimeOf;

use crate::{define_error, Error};

/// Assembles the [`Router`] of the whole REST API.
pub fn router() -> Router {
    Router::new()
        .route("/spaces", get(space::list).post(space::create))
        .route(
            "/spaces/:id",
            get(space::find).patch(space::update).delete(space::delete),
        )
        .route("/spaces/:id/availability", get(reservation::availability))
        .route("/spaces/:id/quote", get(reservation::quote))
        .route(
            "/spaces/:id/reviews",
            get(space::reviews).post(space::submit_review),
        )
        .route("/spaces/:id/suggested-price", get(report::suggested_price))
        .route(
            "/reservations",
            get(reservation::list).post(reservation::create),
        )
        .route("/reservations/:id/cancel", post(reservation::cancel))
        .route("/reports/performance", get(report::performance))
}

define_error! {
    enum DateTimeError {
        #[code = "INVALID_DATETIME"]
        #[status = BAD_REQUEST]
        #[message = "Date and time must be a valid RFC 3339 string"]
        Invalid,
    }
}

/// Parses the provided [RFC 3339] string into a [`DateTimeOf`].
///
/// # Errors
///
/// Returns a `BAD_REQUEST` [`Error`] if the string is malformed.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
pub(crate) fn parse_datetime<Of: ?Sized>(
    input: &str,
) -> Result<DateTimeOf<Of>, Error> {
    DateTimeOf::from_rfc3339(input).map_err(|_| DateTimeError::Invalid.into())
}

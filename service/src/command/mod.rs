//! [`Command`] definition.

pub mod cancel_reservation;
pub mod create_space;
pub mod delete_space;
pub mod reserve_space;
pub mod submit_review;
pub mod update_space;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_reservation::CancelReservation, create_space::CreateSpace,
    delete_space::DeleteSpace, reserve_space::ReserveSpace,
    submit_review::SubmitReview, update_space::UpdateSpace,
};

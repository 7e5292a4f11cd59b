//! In-memory state of a [`Store`].
//!
//! [`Store`]: super::Store

use serde::{Deserialize, Serialize};
use tracerr::Traced;

use crate::{
    domain::{reservation, space, Reservation, Review, Space},
    read,
};

use super::Error;

/// Complete collection state of a [`Store`], as persisted on disk.
///
/// [`Store`]: super::Store
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Snapshot {
    /// All the known [`Space`]s, soft-deleted ones included.
    #[serde(default)]
    pub spaces: Vec<Space>,

    /// All the known [`Reservation`]s, in any [`reservation::Status`].
    #[serde(default)]
    pub reservations: Vec<Reservation>,

    /// All the known [`Review`]s.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Snapshot {
    /// Returns the listed [`Space`]s passing the provided [`Filter`].
    ///
    /// [`Filter`]: read::space::list::Filter
    pub(super) fn spaces(
        &self,
        filter: &read::space::list::Filter,
    ) -> Vec<Space> {
        self.spaces
            .iter()
            .filter(|s| s.is_listed() && filter.matches(s))
            .cloned()
            .collect()
    }

    /// Returns the listed [`Space`] with the provided ID, if any.
    pub(super) fn space(&self, id: space::Id) -> Option<Space> {
        self.spaces
            .iter()
            .find(|s| s.id == id && s.is_listed())
            .cloned()
    }

    /// Returns all the [`Reservation`]s of the [`Space`] with the provided
    /// ID, in any [`reservation::Status`].
    pub(super) fn reservations_of(
        &self,
        space_id: space::Id,
    ) -> Vec<Reservation> {
        self.reservations
            .iter()
            .filter(|r| r.space_id == space_id)
            .cloned()
            .collect()
    }

    /// Returns the [`Reservation`]s passing the provided [`Filter`].
    ///
    /// [`Filter`]: read::reservation::list::Filter
    pub(super) fn reservations(
        &self,
        filter: read::reservation::list::Filter,
    ) -> Vec<Reservation> {
        self.reservations
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// Returns the [`Reservation`] with the provided ID, if any.
    pub(super) fn reservation(
        &self,
        id: reservation::Id,
    ) -> Option<Reservation> {
        self.reservations.iter().find(|r| r.id == id).cloned()
    }

    /// Returns all the [`Review`]s of the [`Space`] with the provided ID.
    pub(super) fn reviews_of(&self, space_id: space::Id) -> Vec<Review> {
        self.reviews
            .iter()
            .filter(|r| r.space_id == space_id)
            .cloned()
            .collect()
    }

    /// Applies the provided [`Change`] to this [`Snapshot`].
    ///
    /// # Errors
    ///
    /// If the [`Change`] updates a row this [`Snapshot`] doesn't contain.
    pub(super) fn apply(&mut self, change: Change) -> Result<(), Traced<Error>> {
        match change {
            Change::InsertSpace(space) => self.spaces.push(space),
            Change::UpdateSpace(space) => {
                let row = self
                    .spaces
                    .iter_mut()
                    .find(|s| s.id == space.id)
                    .ok_or(Error::MissingRow("Space"))
                    .map_err(tracerr::wrap!())?;
                *row = space;
            }
            Change::InsertReservation(reservation) => {
                self.reservations.push(reservation);
            }
            Change::UpdateReservation(reservation) => {
                let row = self
                    .reservations
                    .iter_mut()
                    .find(|r| r.id == reservation.id)
                    .ok_or(Error::MissingRow("Reservation"))
                    .map_err(tracerr::wrap!())?;
                *row = reservation;
            }
            Change::InsertReview(review) => self.reviews.push(review),
        }
        Ok(())
    }
}

/// Single staged mutation of a [`Snapshot`].
#[derive(Clone, Debug)]
pub(super) enum Change {
    /// Insertion of a new [`Space`].
    InsertSpace(Space),

    /// Update of an existing [`Space`].
    UpdateSpace(Space),

    /// Insertion of a new [`Reservation`].
    InsertReservation(Reservation),

    /// Update of an existing [`Reservation`].
    UpdateReservation(Reservation),

    /// Insertion of a new [`Review`].
    InsertReview(Review),
}

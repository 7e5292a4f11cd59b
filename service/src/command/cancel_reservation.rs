//! [`Command`] for cancelling a [`Reservation`].

use common::operations::{By, Commit, Lock, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{reservation, space, Reservation, Space},
    infra::{store, Storage},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Reservation`].
///
/// Cancelling keeps the [`Reservation`] row, only flipping its
/// [`reservation::Status`], so the [`Period`] it occupies stays blocked for
/// new [`Reservation`]s.
///
/// [`Period`]: reservation::Period
#[derive(Clone, Copy, Debug)]
pub struct CancelReservation {
    /// ID of the [`Reservation`] to cancel.
    pub id: reservation::Id,
}

impl<Db> Command<CancelReservation> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<store::Error>>
        + Storage<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<store::Error>,
        >,
    Transacted<Db>: Storage<
            Lock<By<Space, space::Id>>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<store::Error>,
        > + Storage<Update<Reservation>, Err = Traced<store::Error>>
        + Storage<Commit, Err = Traced<store::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let reservation = self
            .store()
            .execute(Select(By::<Option<Reservation>, _>::new(cmd.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotFound(cmd.id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .store()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize with `ReserveSpace` executions upon the same `Space`.
        tx.execute(Lock(By::new(reservation.space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut reservation = tx
            .execute(Select(By::<Option<Reservation>, _>::new(cmd.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotFound(cmd.id))
            .map_err(tracerr::wrap!())?;

        reservation.status = reservation::Status::Cancelled;
        tx.execute(Update(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(reservation)
    }
}

/// Error of [`CancelReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Store(store::Error),

    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotFound(#[error(not(source))] reservation::Id),
}

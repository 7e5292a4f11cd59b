//! [`Command`] for submitting a [`Review`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted, Update},
    unit, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{review, space, user, Review, Space},
    infra::{store, Storage},
    Service,
};

use super::Command;

/// [`Command`] for submitting a [`Review`] of a [`Space`].
///
/// The [`Space`]'s aggregate rating is recalculated in the same transaction,
/// so it never drifts from the stored [`Review`]s.
#[derive(Clone, Debug)]
pub struct SubmitReview {
    /// ID of the [`Space`] to review.
    pub space_id: space::Id,

    /// ID of the [`User`] leaving the [`Review`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// [`review::Score`] given to the [`Space`].
    pub score: review::Score,

    /// Free-form comment of the [`Review`].
    pub comment: review::Comment,
}

impl<Db> Command<SubmitReview> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<store::Error>>,
    Transacted<Db>: Storage<
            Lock<By<Space, space::Id>>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<Option<Space>, space::Id>>,
            Ok = Option<Space>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<Vec<Review>, space::Id>>,
            Ok = Vec<Review>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<review::Id, unit::NextId>>,
            Ok = review::Id,
            Err = Traced<store::Error>,
        > + Storage<Insert<Review>, Err = Traced<store::Error>>
        + Storage<Update<Space>, Err = Traced<store::Error>>
        + Storage<Commit, Err = Traced<store::Error>>,
{
    type Ok = Review;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SubmitReview) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitReview {
            space_id,
            user_id,
            score,
            comment,
        } = cmd;

        let tx = self
            .store()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize rating recalculations upon the same `Space`.
        tx.execute(Lock(By::new(space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut space = tx
            .execute(Select(By::<Option<Space>, _>::new(space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SpaceNotFound(space_id))
            .map_err(tracerr::wrap!())?;

        let id = tx
            .execute(Select(By::<review::Id, _>::new(unit::NextId)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let review = Review {
            id,
            space_id,
            user_id,
            score,
            comment,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(review.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let reviews = tx
            .execute(Select(By::<Vec<Review>, _>::new(space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(rating) = review::average_rating(&reviews) {
            space.rating = rating;
            tx.execute(Update(space))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(review)
    }
}

/// Error of [`SubmitReview`] [`Command`] execution.
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

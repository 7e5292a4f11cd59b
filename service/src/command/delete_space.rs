//! [`Command`] for delisting a [`Space`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{space, Space},
    infra::{store, Storage},
    Service,
};

use super::Command;

/// [`Command`] for delisting a [`Space`].
///
/// The [`Space`] row is kept and only marked as deleted, so its existing
/// [`Reservation`]s and [`Review`]s stay intact.
///
/// [`Reservation`]: crate::domain::Reservation
/// [`Review`]: crate::domain::Review
#[derive(Clone, Copy, Debug)]
pub struct DeleteSpace {
    /// ID of the [`Space`] to delist.
    pub id: space::Id,
}

impl<Db> Command<DeleteSpace> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<store::Error>>,
    Transacted<Db>: Storage<
            Lock<By<Space, space::Id>>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<Option<Space>, space::Id>>,
            Ok = Option<Space>,
            Err = Traced<store::Error>,
        > + Storage<Update<Space>, Err = Traced<store::Error>>
        + Storage<Commit, Err = Traced<store::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteSpace) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .store()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize with other edits upon the same `Space`.
        tx.execute(Lock(By::new(cmd.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut space = tx
            .execute(Select(By::<Option<Space>, _>::new(cmd.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SpaceNotFound(cmd.id))
            .map_err(tracerr::wrap!())?;

        space.deleted_at = Some(DateTime::now().coerce());
        tx.execute(Update(space))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(())
    }
}

/// Error of [`DeleteSpace`] [`Command`] execution.
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
    use common::operations::{By, Select};

    use crate::{
        command::{Command as _, CreateSpace},
        domain::{space, Space},
        infra::Store,
        Config, Service,
    };

    use super::{DeleteSpace, ExecutionError};

    #[tokio::test]
    async fn delisted_space_disappears_from_selects() {
        let service = Service::new(Config::default(), Store::in_memory());
        let space = service
            .execute(CreateSpace {
                name: "Garage Centro".parse().unwrap(),
                location: "Madrid".parse().unwrap(),
                description: "".parse().unwrap(),
                kind: space::Kind::Garage,
                price: "15EUR".parse().unwrap(),
                features: vec![],
                size: 20,
                owner_id: 1.into(),
            })
            .await
            .unwrap();

        service.execute(DeleteSpace { id: space.id }).await.unwrap();

        let found = service
            .store()
            .execute(Select(By::<Option<Space>, _>::new(space.id)))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn unknown_space_is_reported() {
        let service = Service::new(Config::default(), Store::in_memory());

        let err = service
            .execute(DeleteSpace { id: 99.into() })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::SpaceNotFound(_)));
    }
}

//! [`Command`] for listing a new [`Space`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    unit, DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{space, user, Space},
    infra::{store, Storage},
    Service,
};

use super::Command;

/// [`Command`] for listing a new [`Space`].
#[derive(Clone, Debug)]
pub struct CreateSpace {
    /// Name of a new [`Space`].
    pub name: space::Name,

    /// Location of a new [`Space`].
    pub location: space::Location,

    /// Description of a new [`Space`].
    pub description: space::Description,

    /// Kind of a new [`Space`].
    pub kind: space::Kind,

    /// Daily rate of a new [`Space`].
    pub price: Money,

    /// Features of a new [`Space`].
    pub features: Vec<space::Feature>,

    /// Size of a new [`Space`] in square meters.
    pub size: space::SquareMeters,

    /// ID of the [`User`] hosting a new [`Space`].
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,
}

impl<Db> Command<CreateSpace> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<store::Error>>,
    Transacted<Db>: Storage<
            Select<By<space::Id, unit::NextId>>,
            Ok = space::Id,
            Err = Traced<store::Error>,
        > + Storage<Insert<Space>, Err = Traced<store::Error>>
        + Storage<Commit, Err = Traced<store::Error>>,
{
    type Ok = Space;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateSpace) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateSpace {
            name,
            location,
            description,
            kind,
            price,
            features,
            size,
            owner_id,
        } = cmd;

        if !price.is_positive() {
            return Err(tracerr::new!(E::InvalidPrice(price)));
        }

        let tx = self
            .store()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let id = tx
            .execute(Select(By::<space::Id, _>::new(unit::NextId)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let space = Space {
            id,
            name,
            location,
            description,
            kind,
            price,
            rating: space::Rating::unrated(),
            features,
            size,
            status: space::Status::Active,
            owner_id,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };
        tx.execute(Insert(space.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(space)
    }
}

/// Error of [`CreateSpace`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Store(store::Error),

    /// Provided price is not strictly positive.
    #[display("price `{_0}` is not strictly positive")]
    InvalidPrice(#[error(not(source))] Money),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        command::Command as _,
        domain::{space, Space},
        infra::{Storage as _, Store},
        read, Config, Service,
    };

    use super::{CreateSpace, ExecutionError};

    fn cmd(price: &str) -> CreateSpace {
        CreateSpace {
            name: "Garage Centro".parse().unwrap(),
            location: "Madrid".parse().unwrap(),
            description: "Secure underground parking".parse().unwrap(),
            kind: space::Kind::Garage,
            price: price.parse().unwrap(),
            features: vec!["24/7 access".parse().unwrap()],
            size: 20,
            owner_id: 1.into(),
        }
    }

    #[tokio::test]
    async fn lists_a_new_active_unrated_space() {
        let service = Service::new(Config::default(), Store::in_memory());

        let space = service.execute(cmd("15EUR")).await.unwrap();

        assert_eq!(space.status, space::Status::Active);
        assert_eq!(space.rating, space::Rating::unrated());

        let stored = service
            .store()
            .execute(Select(By::<Vec<Space>, _>::new(
                read::space::list::Filter::default(),
            )))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, space.id);
    }

    #[tokio::test]
    async fn rejects_non_positive_price() {
        let service = Service::new(Config::default(), Store::in_memory());

        let err = service.execute(cmd("0EUR")).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidPrice(_)));

        let err = service.execute(cmd("-5EUR")).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidPrice(_)));
    }
}

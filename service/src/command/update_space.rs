//! [`Command`] for editing a listed [`Space`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{space, Space},
    infra::{store, Storage},
    Service,
};

use super::Command;

/// [`Command`] for editing a listed [`Space`].
///
/// Only the provided fields are changed. The [`Space`]'s rating is derived
/// from reviews and cannot be edited.
#[derive(Clone, Debug, Default)]
pub struct UpdateSpace {
    /// ID of the [`Space`] to edit.
    pub id: space::Id,

    /// New name of the [`Space`], if changed.
    pub name: Option<space::Name>,

    /// New location of the [`Space`], if changed.
    pub location: Option<space::Location>,

    /// New description of the [`Space`], if changed.
    pub description: Option<space::Description>,

    /// New daily rate of the [`Space`], if changed.
    pub price: Option<Money>,

    /// New features of the [`Space`], if changed.
    pub features: Option<Vec<space::Feature>>,

    /// New size of the [`Space`] in square meters, if changed.
    pub size: Option<space::SquareMeters>,

    /// New status of the [`Space`], if changed.
    pub status: Option<space::Status>,
}

impl<Db> Command<UpdateSpace> for Service<Db>
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
    type Ok = Space;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateSpace) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateSpace {
            id,
            name,
            location,
            description,
            price,
            features,
            size,
            status,
        } = cmd;

        if let Some(price) = price {
            if !price.is_positive() {
                return Err(tracerr::new!(E::InvalidPrice(price)));
            }
        }

        let tx = self
            .store()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize with other edits upon the same `Space`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut space = tx
            .execute(Select(By::<Option<Space>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SpaceNotFound(id))
            .map_err(tracerr::wrap!())?;

        if let Some(name) = name {
            space.name = name;
        }
        if let Some(location) = location {
            space.location = location;
        }
        if let Some(description) = description {
            space.description = description;
        }
        if let Some(price) = price {
            space.price = price;
        }
        if let Some(features) = features {
            space.features = features;
        }
        if let Some(size) = size {
            space.size = size;
        }
        if let Some(status) = status {
            space.status = status;
        }

        tx.execute(Update(space.clone()))
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

/// Error of [`UpdateSpace`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Store(store::Error),

    /// [`Space`] with the provided ID does not exist.
    #[display("`Space(id: {_0})` does not exist")]
    SpaceNotFound(#[error(not(source))] space::Id),

    /// Provided price is not strictly positive.
    #[display("price `{_0}` is not strictly positive")]
    InvalidPrice(#[error(not(source))] Money),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{Command as _, CreateSpace},
        domain::space,
        infra::Store,
        Config, Service,
    };

    use super::{ExecutionError, UpdateSpace};

    async fn service_with_space() -> (Service<Store>, space::Id) {
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
        (service, space.id)
    }

    #[tokio::test]
    async fn changes_only_the_provided_fields() {
        let (service, id) = service_with_space().await;

        let updated = service
            .execute(UpdateSpace {
                id,
                price: Some("20EUR".parse().unwrap()),
                status: Some(space::Status::Inactive),
                ..UpdateSpace::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.price, "20EUR".parse().unwrap());
        assert_eq!(updated.status, space::Status::Inactive);
        assert_eq!(updated.name, "Garage Centro".parse().unwrap());
    }

    #[tokio::test]
    async fn unknown_space_is_reported() {
        let (service, _) = service_with_space().await;

        let err = service
            .execute(UpdateSpace {
                id: 99.into(),
                ..UpdateSpace::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::SpaceNotFound(_)));
    }

    #[tokio::test]
    async fn rejects_non_positive_price() {
        let (service, id) = service_with_space().await;

        let err = service
            .execute(UpdateSpace {
                id,
                price: Some("0EUR".parse().unwrap()),
                ..UpdateSpace::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidPrice(_)));
    }
}

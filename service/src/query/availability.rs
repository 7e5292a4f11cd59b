//! [`Query`] checking whether a [`Space`] is free over a [`Period`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        reservation::{self, Period},
        space, Reservation, Space,
    },
    infra::{store, Storage},
    Query, Service,
};

/// [`Query`] checking whether a [`Space`] is free over a [`Period`].
#[derive(Clone, Copy, Debug)]
pub struct CheckAvailability {
    /// ID of the [`Space`] to check.
    pub space_id: space::Id,

    /// [`DateTime`] the checked [`Period`] starts at.
    ///
    /// [`DateTime`]: common::DateTime
    pub starts_at: reservation::StartDateTime,

    /// [`DateTime`] the checked [`Period`] ends at.
    ///
    /// [`DateTime`]: common::DateTime
    pub ends_at: reservation::EndDateTime,
}

/// Output of the [`CheckAvailability`] [`Query`].
#[derive(Clone, Debug)]
pub struct Availability {
    /// First found [`Reservation`] overlapping with the checked [`Period`],
    /// if any.
    pub conflict: Option<Reservation>,
}

impl Availability {
    /// Indicates whether the checked [`Period`] is free.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.conflict.is_none()
    }
}

impl<Db> Query<CheckAvailability> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Space>, space::Id>>,
            Ok = Option<Space>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<Vec<Reservation>, space::Id>>,
            Ok = Vec<Reservation>,
            Err = Traced<store::Error>,
        >,
{
    type Ok = Availability;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: CheckAvailability,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let period = Period::new(query.starts_at, query.ends_at)
            .ok_or(E::InvalidDateRange)
            .map_err(tracerr::wrap!())?;

        self.store()
            .execute(Select(By::<Option<Space>, _>::new(query.space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SpaceNotFound(query.space_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let conflict = self
            .store()
            .execute(Select(By::<Vec<Reservation>, _>::new(query.space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .find(|r| r.period.overlaps(&period));

        Ok(Availability { conflict })
    }
}

/// Error of [`CheckAvailability`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Store(store::Error),

    /// [`Space`] with the provided ID does not exist.
    #[display("`Space(id: {_0})` does not exist")]
    SpaceNotFound(#[error(not(source))] space::Id),

    /// Provided [`Period`] doesn't start strictly before it ends.
    #[display("`Period` must start strictly before it ends")]
    InvalidDateRange,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{Commit, Insert, Transact},
        DateTime,
    };

    use crate::{
        command::{Command as _, ReserveSpace},
        domain::{space, Space},
        infra::{payment, Store},
        Config, Service,
    };

    use super::{CheckAvailability, ExecutionError};

    async fn service_with_reserved_space() -> Service<Store> {
        let store = Store::in_memory();
        let tx = store.execute(Transact).await.unwrap();
        tx.execute(Insert(Space {
            id: 1.into(),
            name: "Garage Centro".parse().unwrap(),
            location: "Madrid".parse().unwrap(),
            description: "".parse().unwrap(),
            kind: space::Kind::Garage,
            price: "100EUR".parse().unwrap(),
            rating: space::Rating::unrated(),
            features: vec![],
            size: 20,
            status: space::Status::Active,
            owner_id: 1.into(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }))
        .await
        .unwrap();
        tx.execute(Commit).await.unwrap();

        let service = Service::new(
            Config {
                payment: payment::Config {
                    latency: Duration::ZERO,
                    timeout: Duration::from_secs(5),
                },
                ..Config::default()
            },
            store,
        );
        drop(
            service
                .execute(ReserveSpace {
                    space_id: 1.into(),
                    tenant_id: 7.into(),
                    starts_at: DateTime::from_rfc3339("2024-06-01T00:00:00Z")
                        .unwrap()
                        .coerce(),
                    ends_at: DateTime::from_rfc3339("2024-06-05T00:00:00Z")
                        .unwrap()
                        .coerce(),
                })
                .await
                .unwrap(),
        );
        service
    }

    fn query(starts_at: &str, ends_at: &str) -> CheckAvailability {
        CheckAvailability {
            space_id: 1.into(),
            starts_at: DateTime::from_rfc3339(starts_at).unwrap().coerce(),
            ends_at: DateTime::from_rfc3339(ends_at).unwrap().coerce(),
        }
    }

    #[tokio::test]
    async fn reports_conflicts_without_mutating() {
        let service = service_with_reserved_space().await;

        let busy = service
            .execute(query("2024-06-03T00:00:00Z", "2024-06-08T00:00:00Z"))
            .await
            .unwrap();
        assert!(!busy.is_available());
        assert_eq!(
            busy.conflict.map(|r| r.space_id),
            Some(space::Id::from(1)),
        );

        let free = service
            .execute(query("2024-06-10T00:00:00Z", "2024-06-15T00:00:00Z"))
            .await
            .unwrap();
        assert!(free.is_available());
    }

    #[tokio::test]
    async fn rejects_inverted_date_range() {
        let service = service_with_reserved_space().await;

        let err = service
            .execute(query("2024-06-10T00:00:00Z", "2024-06-01T00:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidDateRange
        ));
    }
}

//! [`Command`] for reserving a [`Space`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    unit, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        reservation::{self, Period, Quote},
        space, user, Reservation, Space,
    },
    infra::{store, Storage},
    Service,
};

use super::Command;

/// [`Command`] for reserving a [`Space`] over some [`Period`].
#[derive(Clone, Copy, Debug)]
pub struct ReserveSpace {
    /// ID of the [`Space`] to reserve.
    pub space_id: space::Id,

    /// ID of the [`User`] reserving the [`Space`].
    ///
    /// [`User`]: crate::domain::User
    pub tenant_id: user::Id,

    /// [`DateTime`] the [`Reservation`] starts at.
    pub starts_at: reservation::StartDateTime,

    /// [`DateTime`] the [`Reservation`] ends at.
    pub ends_at: reservation::EndDateTime,
}

impl<Db> Command<ReserveSpace> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<store::Error>>
        + Storage<
            Select<By<Option<Space>, space::Id>>,
            Ok = Option<Space>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<Vec<Reservation>, space::Id>>,
            Ok = Vec<Reservation>,
            Err = Traced<store::Error>,
        >,
    Transacted<Db>: Storage<
            Lock<By<Space, space::Id>>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<Vec<Reservation>, space::Id>>,
            Ok = Vec<Reservation>,
            Err = Traced<store::Error>,
        > + Storage<
            Select<By<reservation::Id, unit::NextId>>,
            Ok = reservation::Id,
            Err = Traced<store::Error>,
        > + Storage<Insert<Reservation>, Err = Traced<store::Error>>
        + Storage<Commit, Err = Traced<store::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ReserveSpace) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReserveSpace {
            space_id,
            tenant_id,
            starts_at,
            ends_at,
        } = cmd;

        let period = Period::new(starts_at, ends_at)
            .ok_or(E::InvalidDateRange)
            .map_err(tracerr::wrap!())?;

        let space = self
            .store()
            .execute(Select(By::<Option<Space>, _>::new(space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SpaceNotFound(space_id))
            .map_err(tracerr::wrap!())?;

        let quote = Quote::for_period(space.price, &period);

        // Early conflict detection, before charging the tenant. The
        // authoritative check happens under the lock below.
        let existing = self
            .store()
            .execute(Select(By::<Vec<Reservation>, _>::new(space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(conflict) =
            existing.into_iter().find(|r| r.period.overlaps(&period))
        {
            return Err(tracerr::new!(E::DateConflict(Box::new(conflict))));
        }

        tokio::time::timeout(
            self.config().payment.timeout,
            self.payments().capture(quote.total),
        )
        .await
        .map_err(|_| E::PaymentTimedOut)
        .map_err(tracerr::wrap!())
        .map(drop)?;

        let tx = self
            .store()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize `ReserveSpace` executions upon the same `Space`.
        tx.execute(Lock(By::new(space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Vec<Reservation>, _>::new(space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(conflict) =
            existing.into_iter().find(|r| r.period.overlaps(&period))
        {
            return Err(tracerr::new!(E::DateConflict(Box::new(conflict))));
        }

        let id = tx
            .execute(Select(By::<reservation::Id, _>::new(unit::NextId)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let reservation = Reservation {
            id,
            space_id,
            user_id: tenant_id,
            period,
            total_price: quote.total,
            status: reservation::Status::Confirmed,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(reservation.clone()))
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

/// Error of [`ReserveSpace`] [`Command`] execution.
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

    /// Provided [`Period`] overlaps with an existing [`Reservation`].
    #[display(
        "`Space(id: {})` is already reserved over the requested `Period`",
        _0.space_id
    )]
    DateConflict(#[error(not(source))] Box<Reservation>),

    /// Payment wasn't captured in time.
    #[display("payment wasn't captured in time")]
    PaymentTimedOut,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Commit, Insert, Select, Transact},
        DateTime,
    };
    use rust_decimal::Decimal;

    use crate::{
        command::Command as _,
        domain::{reservation, space, Reservation, Space},
        infra::{payment, Store},
        Config, Service,
    };

    use super::{ExecutionError, ReserveSpace};

    fn config() -> Config {
        Config {
            payment: payment::Config {
                latency: Duration::ZERO,
                timeout: Duration::from_secs(5),
            },
            ..Config::default()
        }
    }

    fn space(id: space::Id) -> Space {
        Space {
            id,
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
        }
    }

    async fn service_with_space(id: space::Id) -> Service<Store> {
        let store = Store::in_memory();
        let tx = store.execute(Transact).await.unwrap();
        tx.execute(Insert(space(id))).await.unwrap();
        tx.execute(Commit).await.unwrap();
        Service::new(config(), store)
    }

    fn cmd(space_id: space::Id, starts_at: &str, ends_at: &str) -> ReserveSpace {
        ReserveSpace {
            space_id,
            tenant_id: 7.into(),
            starts_at: DateTime::from_rfc3339(starts_at).unwrap().coerce(),
            ends_at: DateTime::from_rfc3339(ends_at).unwrap().coerce(),
        }
    }

    #[tokio::test]
    async fn reserves_a_free_period() {
        let service = service_with_space(1.into()).await;

        let reservation = service
            .execute(cmd(
                1.into(),
                "2024-06-01T00:00:00Z",
                "2024-06-06T00:00:00Z",
            ))
            .await
            .unwrap();

        assert_eq!(reservation.status, reservation::Status::Confirmed);
        // 5 days at 100 plus a 10% fee.
        assert_eq!(reservation.total_price.amount, Decimal::new(550, 0));

        let stored = service
            .store()
            .execute(Select(By::<Vec<Reservation>, _>::new(space::Id::from(
                1,
            ))))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn rejects_overlapping_period() {
        let service = service_with_space(1.into()).await;

        drop(
            service
                .execute(cmd(
                    1.into(),
                    "2024-06-01T00:00:00Z",
                    "2024-06-10T00:00:00Z",
                ))
                .await
                .unwrap(),
        );

        let err = service
            .execute(cmd(
                1.into(),
                "2024-06-05T00:00:00Z",
                "2024-06-15T00:00:00Z",
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::DateConflict(_)
        ));
    }

    #[tokio::test]
    async fn touching_endpoints_conflict() {
        let service = service_with_space(1.into()).await;

        drop(
            service
                .execute(cmd(
                    1.into(),
                    "2024-06-01T00:00:00Z",
                    "2024-06-05T00:00:00Z",
                ))
                .await
                .unwrap(),
        );

        let err = service
            .execute(cmd(
                1.into(),
                "2024-06-05T00:00:00Z",
                "2024-06-09T00:00:00Z",
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::DateConflict(_)
        ));
    }

    #[tokio::test]
    async fn cancelled_reservations_still_conflict() {
        let service = service_with_space(1.into()).await;

        let reservation = service
            .execute(cmd(
                1.into(),
                "2024-06-01T00:00:00Z",
                "2024-06-05T00:00:00Z",
            ))
            .await
            .unwrap();

        let tx = service.store().execute(Transact).await.unwrap();
        let mut cancelled = reservation;
        cancelled.status = reservation::Status::Cancelled;
        tx.execute(common::operations::Update(cancelled)).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let err = service
            .execute(cmd(
                1.into(),
                "2024-06-02T00:00:00Z",
                "2024-06-03T00:00:00Z",
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::DateConflict(_)
        ));
    }

    #[tokio::test]
    async fn rejects_inverted_date_range_without_persisting() {
        let service = service_with_space(1.into()).await;

        let err = service
            .execute(cmd(
                1.into(),
                "2024-06-10T00:00:00Z",
                "2024-06-01T00:00:00Z",
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidDateRange
        ));

        let stored = service
            .store()
            .execute(Select(By::<Vec<Reservation>, _>::new(space::Id::from(
                1,
            ))))
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn unknown_space_is_reported() {
        let service = service_with_space(1.into()).await;

        let err = service
            .execute(cmd(
                99.into(),
                "2024-06-01T00:00:00Z",
                "2024-06-05T00:00:00Z",
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::SpaceNotFound(_)
        ));
    }

    #[tokio::test]
    async fn slow_payment_times_out_without_persisting() {
        let store = Store::in_memory();
        let tx = store.execute(Transact).await.unwrap();
        tx.execute(Insert(space(1.into()))).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let service = Service::new(
            Config {
                payment: payment::Config {
                    latency: Duration::from_secs(60),
                    timeout: Duration::from_millis(10),
                },
                ..Config::default()
            },
            store,
        );

        let err = service
            .execute(cmd(
                1.into(),
                "2024-06-01T00:00:00Z",
                "2024-06-05T00:00:00Z",
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::PaymentTimedOut
        ));

        let stored = service
            .store()
            .execute(Select(By::<Vec<Reservation>, _>::new(space::Id::from(
                1,
            ))))
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn racing_reservations_commit_exactly_one() {
        let service = service_with_space(1.into()).await;

        let tasks = (0..10_u8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .execute(cmd(
                            1.into(),
                            &format!("2024-03-0{}T00:00:00Z", i % 9 + 1),
                            "2024-03-15T00:00:00Z",
                        ))
                        .await
                })
            })
            .collect::<Vec<_>>();

        let mut won = 0;
        for task in tasks {
            won += usize::from(task.await.unwrap().is_ok());
        }
        assert_eq!(won, 1, "only one of the racing reservations may commit");

        let stored = service
            .store()
            .execute(Select(By::<Vec<Reservation>, _>::new(space::Id::from(
                1,
            ))))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_reservations_cannot_double_book() {
        let service = service_with_space(1.into()).await;

        let first = service.execute(cmd(
            1.into(),
            "2024-06-01T00:00:00Z",
            "2024-06-05T00:00:00Z",
        ));
        let second = service.execute(cmd(
            1.into(),
            "2024-06-03T00:00:00Z",
            "2024-06-08T00:00:00Z",
        ));

        let (first, second) = tokio::join!(first, second);
        assert!(
            first.is_ok() != second.is_ok(),
            "exactly one of the two overlapping reservations must win",
        );

        let stored = service
            .store()
            .execute(Select(By::<Vec<Reservation>, _>::new(space::Id::from(
                1,
            ))))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }
}

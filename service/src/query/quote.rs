//! [`Query`] pricing a [`Period`] without reserving it.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        reservation::{self, Period, Quote},
        space, Space,
    },
    infra::{store, Storage},
    Query, Service,
};

/// [`Query`] pricing a [`Period`] of a [`Space`] without reserving it.
///
/// Produces exactly the [`Quote`] that [`ReserveSpace`] would charge for the
/// same [`Period`].
///
/// [`ReserveSpace`]: crate::command::ReserveSpace
#[derive(Clone, Copy, Debug)]
pub struct PriceQuote {
    /// ID of the [`Space`] to price.
    pub space_id: space::Id,

    /// [`DateTime`] the priced [`Period`] starts at.
    ///
    /// [`DateTime`]: common::DateTime
    pub starts_at: reservation::StartDateTime,

    /// [`DateTime`] the priced [`Period`] ends at.
    ///
    /// [`DateTime`]: common::DateTime
    pub ends_at: reservation::EndDateTime,
}

impl<Db> Query<PriceQuote> for Service<Db>
where
    Db: Storage<
        Select<By<Option<Space>, space::Id>>,
        Ok = Option<Space>,
        Err = Traced<store::Error>,
    >,
{
    type Ok = Quote;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: PriceQuote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let period = Period::new(query.starts_at, query.ends_at)
            .ok_or(E::InvalidDateRange)
            .map_err(tracerr::wrap!())?;

        let space = self
            .store()
            .execute(Select(By::<Option<Space>, _>::new(query.space_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SpaceNotFound(query.space_id))
            .map_err(tracerr::wrap!())?;

        Ok(Quote::for_period(space.price, &period))
    }
}

/// Error of [`PriceQuote`] [`Query`] execution.
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
    use common::{
        operations::{Commit, Insert, Transact},
        DateTime,
    };
    use rust_decimal::Decimal;

    use crate::{
        domain::{space, Space},
        infra::Store,
        Config, Query as _, Service,
    };

    use super::{ExecutionError, PriceQuote};

    async fn service() -> Service<Store> {
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
        Service::new(Config::default(), store)
    }

    #[tokio::test]
    async fn prices_with_ceiled_days_and_fee() {
        let service = service().await;

        let quote = service
            .execute(PriceQuote {
                space_id: 1.into(),
                starts_at: DateTime::from_rfc3339("2024-01-01T00:00:00Z")
                    .unwrap()
                    .coerce(),
                ends_at: DateTime::from_rfc3339("2024-01-02T12:00:00Z")
                    .unwrap()
                    .coerce(),
            })
            .await
            .unwrap();

        assert_eq!(quote.days, 2);
        assert_eq!(quote.base_price.amount, Decimal::new(200, 0));
        assert_eq!(quote.service_fee.amount, Decimal::new(20, 0));
        assert_eq!(quote.total.amount, Decimal::new(220, 0));
    }

    #[tokio::test]
    async fn unknown_space_is_reported() {
        let service = service().await;

        let err = service
            .execute(PriceQuote {
                space_id: 99.into(),
                starts_at: DateTime::from_rfc3339("2024-01-01T00:00:00Z")
                    .unwrap()
                    .coerce(),
                ends_at: DateTime::from_rfc3339("2024-01-02T00:00:00Z")
                    .unwrap()
                    .coerce(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::SpaceNotFound(_)));
    }
}

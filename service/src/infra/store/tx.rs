//! [`Tx`] client definitions.

use common::{
    operations::{By, Commit, Insert, Lock, Select, Update},
    unit,
};
use tokio::{
    fs,
    sync::{Mutex, OwnedMutexGuard},
};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{reservation, review, space, Reservation, Review, Space},
    read,
};

use super::{snapshot::Change, Error, Snapshot, Storage, Store};

/// Transactional [`Store`] client.
///
/// Stages its changes in memory, making them visible to other readers only
/// once [`Commit`]ted. Dropping a [`Tx`] without committing discards its
/// changes and releases any held locks.
#[derive(Debug)]
pub struct Tx {
    /// [`Store`] this [`Tx`] operates upon.
    store: Store,

    /// [`Change`]s staged by this [`Tx`], in application order.
    staged: Mutex<Vec<Change>>,

    /// Per-[`Space`] lock guards held by this [`Tx`].
    guards: Mutex<Vec<OwnedMutexGuard<()>>>,
}

impl Tx {
    /// Creates a new [`Tx`] upon the provided [`Store`].
    pub(super) fn new(store: Store) -> Self {
        Self {
            store,
            staged: Mutex::new(Vec::new()),
            guards: Mutex::new(Vec::new()),
        }
    }

    /// Returns the committed [`Snapshot`] with this [`Tx`]'s staged
    /// [`Change`]s applied on top.
    async fn overlay(&self) -> Result<Snapshot, Traced<Error>> {
        let mut snapshot = self.store.inner.state.read().await.clone();
        for change in self.staged.lock().await.iter() {
            snapshot.apply(change.clone()).map_err(tracerr::wrap!())?;
        }
        Ok(snapshot)
    }

    /// Stages the provided [`Change`] in this [`Tx`].
    async fn stage(&self, change: Change) {
        self.staged.lock().await.push(change);
    }
}

impl Storage<Select<By<Vec<Space>, read::space::list::Filter>>> for Tx {
    type Ok = Vec<Space>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Space>, read::space::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        Ok(self.overlay().await.map_err(tracerr::wrap!())?.spaces(&filter))
    }
}

impl Storage<Select<By<Option<Space>, space::Id>>> for Tx {
    type Ok = Option<Space>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Space>, space::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .overlay()
            .await
            .map_err(tracerr::wrap!())?
            .space(by.into_inner()))
    }
}

impl Storage<Select<By<Vec<Reservation>, space::Id>>> for Tx {
    type Ok = Vec<Reservation>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Reservation>, space::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .overlay()
            .await
            .map_err(tracerr::wrap!())?
            .reservations_of(by.into_inner()))
    }
}

impl Storage<Select<By<Option<Reservation>, reservation::Id>>> for Tx {
    type Ok = Option<Reservation>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .overlay()
            .await
            .map_err(tracerr::wrap!())?
            .reservation(by.into_inner()))
    }
}

impl Storage<Select<By<Vec<Review>, space::Id>>> for Tx {
    type Ok = Vec<Review>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Review>, space::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .overlay()
            .await
            .map_err(tracerr::wrap!())?
            .reviews_of(by.into_inner()))
    }
}

impl Storage<Select<By<space::Id, unit::NextId>>> for Tx {
    type Ok = space::Id;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        _: Select<By<space::Id, unit::NextId>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.store.next_space_id())
    }
}

impl Storage<Select<By<reservation::Id, unit::NextId>>> for Tx {
    type Ok = reservation::Id;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        _: Select<By<reservation::Id, unit::NextId>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.store.next_reservation_id())
    }
}

impl Storage<Select<By<review::Id, unit::NextId>>> for Tx {
    type Ok = review::Id;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        _: Select<By<review::Id, unit::NextId>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.store.next_review_id())
    }
}

impl Storage<Lock<By<Space, space::Id>>> for Tx {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Space, space::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let lock = self.store.space_lock(by.into_inner()).await;
        let guard = lock.lock_owned().await;
        self.guards.lock().await.push(guard);
        Ok(())
    }
}

impl Storage<Insert<Space>> for Tx {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(space): Insert<Space>,
    ) -> Result<Self::Ok, Self::Err> {
        self.stage(Change::InsertSpace(space)).await;
        Ok(())
    }
}

impl Storage<Update<Space>> for Tx {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(space): Update<Space>,
    ) -> Result<Self::Ok, Self::Err> {
        self.stage(Change::UpdateSpace(space)).await;
        Ok(())
    }
}

impl Storage<Insert<Reservation>> for Tx {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(reservation): Insert<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.stage(Change::InsertReservation(reservation)).await;
        Ok(())
    }
}

impl Storage<Update<Reservation>> for Tx {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(reservation): Update<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.stage(Change::UpdateReservation(reservation)).await;
        Ok(())
    }
}

impl Storage<Insert<Review>> for Tx {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(review): Insert<Review>,
    ) -> Result<Self::Ok, Self::Err> {
        self.stage(Change::InsertReview(review)).await;
        Ok(())
    }
}

impl Storage<Commit> for Tx {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let changes = std::mem::take(&mut *self.staged.lock().await);
        if changes.is_empty() {
            self.guards.lock().await.clear();
            return Ok(());
        }

        let mut state = self.store.inner.state.write().await;
        let mut next = state.clone();
        for change in changes {
            next.apply(change).map_err(tracerr::wrap!())?;
        }

        // Flush to disk first, so a committed change is never visible
        // without being durable.
        if let Some(path) = &self.store.inner.path {
            let bytes = serde_json::to_vec_pretty(&next)
                .map_err(tracerr::from_and_wrap!(=> Error))?;
            fs::write(path, bytes)
                .await
                .map_err(tracerr::from_and_wrap!(=> Error))?;
        }

        *state = next;
        drop(state);
        self.guards.lock().await.clear();

        log::debug!("transaction committed");
        Ok(())
    }
}

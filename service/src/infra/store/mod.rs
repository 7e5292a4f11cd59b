//! JSON-file backed [`Storage`] implementation.

mod snapshot;
mod tx;

use std::{
    collections::HashMap,
    io,
    path::PathBuf,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use common::operations::{By, Select, Transact};
use derive_more::{Display, Error as StdError, From};
use tokio::{
    fs,
    sync::{Mutex, RwLock},
};
use tracerr::Traced;

use crate::{
    domain::{reservation, review, space, Reservation, Review, Space},
    read,
};

pub use self::snapshot::Snapshot;
pub use self::tx::Tx;

/// Storage operation.
pub use common::Handler as Storage;

/// [`Storage`] persisting its collections as a single JSON file, with all the
/// reads served from memory.
///
/// [`Commit`]s flush to disk before becoming visible to readers.
///
/// [`Commit`]: common::operations::Commit
#[derive(Clone, Debug)]
pub struct Store {
    /// Inner representation of this [`Store`].
    inner: Arc<Inner>,
}

/// Inner representation of a [`Store`].
#[derive(Debug)]
struct Inner {
    /// Path of the backing JSON file, if any.
    path: Option<PathBuf>,

    /// Committed collection state.
    state: RwLock<Snapshot>,

    /// Per-[`Space`] locks serializing transactions upon the same [`Space`].
    locks: Mutex<HashMap<space::Id, Arc<Mutex<()>>>>,

    /// Next [`space::Id`] to draw.
    next_space_id: AtomicI64,

    /// Next [`reservation::Id`] to draw.
    next_reservation_id: AtomicI64,

    /// Next [`review::Id`] to draw.
    next_review_id: AtomicI64,
}

impl Store {
    /// Opens a [`Store`] backed by the JSON file at the provided `path`.
    ///
    /// A missing file is treated as an empty [`Store`] and will be created on
    /// the first [`Commit`].
    ///
    /// # Errors
    ///
    /// If the file cannot be read or contains malformed JSON.
    ///
    /// [`Commit`]: common::operations::Commit
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, Traced<Error>> {
        let path = path.into();
        let snapshot = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(tracerr::from_and_wrap!(=> Error))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Snapshot::default()
            }
            Err(e) => return Err(tracerr::new!(Error::from(e))),
        };
        Ok(Self::with_snapshot(Some(path), snapshot))
    }

    /// Creates a [`Store`] never touching the disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_snapshot(None, Snapshot::default())
    }

    /// Creates a [`Store`] out of the provided [`Snapshot`], continuing its
    /// ID sequences.
    fn with_snapshot(path: Option<PathBuf>, snapshot: Snapshot) -> Self {
        fn next<I: Copy + Into<i64>>(
            ids: impl Iterator<Item = I>,
        ) -> AtomicI64 {
            AtomicI64::new(ids.map(Into::into).max().unwrap_or(0) + 1)
        }

        Self {
            inner: Arc::new(Inner {
                next_space_id: next(snapshot.spaces.iter().map(|s| s.id)),
                next_reservation_id: next(
                    snapshot.reservations.iter().map(|r| r.id),
                ),
                next_review_id: next(snapshot.reviews.iter().map(|r| r.id)),
                path,
                state: RwLock::new(snapshot),
                locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Draws a fresh [`space::Id`].
    fn next_space_id(&self) -> space::Id {
        self.inner.next_space_id.fetch_add(1, Ordering::Relaxed).into()
    }

    /// Draws a fresh [`reservation::Id`].
    fn next_reservation_id(&self) -> reservation::Id {
        self.inner
            .next_reservation_id
            .fetch_add(1, Ordering::Relaxed)
            .into()
    }

    /// Draws a fresh [`review::Id`].
    fn next_review_id(&self) -> review::Id {
        self.inner.next_review_id.fetch_add(1, Ordering::Relaxed).into()
    }

    /// Returns the per-[`Space`] lock of the [`Space`] with the provided ID.
    async fn space_lock(&self, id: space::Id) -> Arc<Mutex<()>> {
        Arc::clone(
            self.inner.locks.lock().await.entry(id).or_default(),
        )
    }
}

impl Storage<Select<By<Vec<Space>, read::space::list::Filter>>> for Store {
    type Ok = Vec<Space>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Space>, read::space::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        Ok(self.inner.state.read().await.spaces(&filter))
    }
}

impl Storage<Select<By<Option<Space>, space::Id>>> for Store {
    type Ok = Option<Space>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Space>, space::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.inner.state.read().await.space(by.into_inner()))
    }
}

impl Storage<Select<By<Vec<Reservation>, space::Id>>> for Store {
    type Ok = Vec<Reservation>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Reservation>, space::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .inner
            .state
            .read()
            .await
            .reservations_of(by.into_inner()))
    }
}

impl Storage<Select<By<Vec<Reservation>, read::reservation::list::Filter>>>
    for Store
{
    type Ok = Vec<Reservation>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Reservation>, read::reservation::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.inner.state.read().await.reservations(by.into_inner()))
    }
}

impl Storage<Select<By<Option<Reservation>, reservation::Id>>> for Store {
    type Ok = Option<Reservation>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.inner.state.read().await.reservation(by.into_inner()))
    }
}

impl Storage<Select<By<Vec<Review>, space::Id>>> for Store {
    type Ok = Vec<Review>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Review>, space::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.inner.state.read().await.reviews_of(by.into_inner()))
    }
}

impl Storage<Transact> for Store {
    type Ok = Tx;
    type Err = Traced<Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Tx::new(self.clone()))
    }
}

/// [`Store`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Failed to read or write the backing JSON file.
    #[display("I/O error: {_0}")]
    Io(io::Error),

    /// Failed to encode or decode the backing JSON file.
    #[display("JSON error: {_0}")]
    Json(serde_json::Error),

    /// Updated row doesn't exist.
    #[display("no `{_0}` row to update")]
    MissingRow(#[error(not(source))] &'static str),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Insert, Select, Transact, Update},
        unit, DateTime,
    };

    use crate::{
        domain::{space, Space},
        read,
    };

    use super::{Storage, Store};

    fn space(id: space::Id, name: &str) -> Space {
        Space {
            id,
            name: name.parse().unwrap(),
            location: "Madrid".parse().unwrap(),
            description: "".parse().unwrap(),
            kind: space::Kind::Garage,
            price: "15EUR".parse().unwrap(),
            rating: space::Rating::unrated(),
            features: vec![],
            size: 20,
            status: space::Status::Active,
            owner_id: 1.into(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    async fn all_spaces(store: &Store) -> Vec<Space> {
        store
            .execute(Select(By::<Vec<Space>, _>::new(
                read::space::list::Filter::default(),
            )))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn uncommitted_changes_stay_invisible() {
        let store = Store::in_memory();

        let tx = store.execute(Transact).await.unwrap();
        let id = tx
            .execute(Select(By::<space::Id, unit::NextId>::new(unit::NextId)))
            .await
            .unwrap();
        tx.execute(Insert(space(id, "Garage Centro"))).await.unwrap();

        assert!(all_spaces(&store).await.is_empty());

        drop(tx);
        assert!(all_spaces(&store).await.is_empty());
    }

    #[tokio::test]
    async fn tx_reads_its_own_staged_changes() {
        let store = Store::in_memory();

        let tx = store.execute(Transact).await.unwrap();
        let id = tx
            .execute(Select(By::<space::Id, unit::NextId>::new(unit::NextId)))
            .await
            .unwrap();
        tx.execute(Insert(space(id, "Garage Centro"))).await.unwrap();

        let seen = tx
            .execute(Select(By::<Option<Space>, _>::new(id)))
            .await
            .unwrap();
        assert!(seen.is_some());
    }

    #[tokio::test]
    async fn commit_publishes_changes() {
        let store = Store::in_memory();

        let tx = store.execute(Transact).await.unwrap();
        let id = tx
            .execute(Select(By::<space::Id, unit::NextId>::new(unit::NextId)))
            .await
            .unwrap();
        tx.execute(Insert(space(id, "Garage Centro"))).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let spaces = all_spaces(&store).await;
        assert_eq!(spaces.len(), 1);
        assert_eq!(spaces[0].id, id);
    }

    #[tokio::test]
    async fn updating_missing_row_fails_commit() {
        let store = Store::in_memory();

        let tx = store.execute(Transact).await.unwrap();
        tx.execute(Update(space(42.into(), "Ghost"))).await.unwrap();

        assert!(tx.execute(Commit).await.is_err());
    }

    #[tokio::test]
    async fn selects_exclude_soft_deleted_spaces() {
        let store = Store::in_memory();

        let mut deleted = space(1.into(), "Old Garage");
        deleted.deleted_at = Some(DateTime::now().coerce());

        let tx = store.execute(Transact).await.unwrap();
        tx.execute(Insert(deleted)).await.unwrap();
        tx.execute(Insert(space(2.into(), "New Garage"))).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let spaces = all_spaces(&store).await;
        assert_eq!(spaces.len(), 1);
        assert_eq!(spaces[0].id, 2.into());

        let missing = store
            .execute(Select(By::<Option<Space>, _>::new(space::Id::from(1))))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn reopened_store_continues_id_sequence() {
        let path = std::env::temp_dir().join(format!(
            "store-{}-{}.json",
            std::process::id(),
            DateTime::now().unix_timestamp(),
        ));

        let store = Store::open(&path).await.unwrap();
        let tx = store.execute(Transact).await.unwrap();
        let first = tx
            .execute(Select(By::<space::Id, unit::NextId>::new(unit::NextId)))
            .await
            .unwrap();
        tx.execute(Insert(space(first, "Garage Centro"))).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let reopened = Store::open(&path).await.unwrap();
        assert_eq!(all_spaces(&reopened).await.len(), 1);

        let tx = reopened.execute(Transact).await.unwrap();
        let next = tx
            .execute(Select(By::<space::Id, unit::NextId>::new(unit::NextId)))
            .await
            .unwrap();
        assert!(i64::from(next) > i64::from(first));

        let _ = tokio::fs::remove_file(&path).await;
    }
}

//! [`Memory`] clients definitions.

use std::{future::Future, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

#[cfg(doc)]
use common::operations::Commit;

use crate::infra::database::{self, memory};

#[cfg(doc)]
use super::Memory;
use super::State;

/// Generic access to the [`State`] of a [`Memory`] client.
pub trait Connection {
    /// Reads the [`State`] with the provided function.
    ///
    /// # Errors
    ///
    /// If the [`State`] is not accessible anymore.
    fn read<R, F>(
        &self,
        f: F,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>
    where
        F: FnOnce(&State) -> R;

    /// Modifies the [`State`] with the provided function.
    ///
    /// # Errors
    ///
    /// If the [`State`] is not accessible anymore.
    fn write<R, F>(
        &self,
        f: F,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>
    where
        F: FnOnce(&mut State) -> R;
}

/// Non-transactional [`Memory`] client.
///
/// Every operation is applied to the shared [`State`] immediately.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`State`] of all the clones of this client.
    state: Arc<Mutex<State>>,
}

impl Connection for NonTx {
    async fn read<R, F>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&State) -> R,
    {
        Ok(f(&*self.state.lock().await))
    }

    async fn write<R, F>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&mut State) -> R,
    {
        Ok(f(&mut *self.state.lock().await))
    }
}

/// Transactional [`Memory`] client.
///
/// Holds the lock of the shared [`State`] for its whole lifetime, so the
/// operations of a transaction are never interleaved with any other ones.
/// Changes are made to a staged copy of the [`State`], which replaces the
/// shared one on [`Commit`] only. Dropping a [`Tx`] without committing it
/// discards the changes.
///
/// Using the originating [`NonTx`] client while a [`Tx`] is alive blocks
/// until the [`Tx`] is dropped.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Inner representation of this client.
    ///
    /// [`None`] once committed.
    inner: Arc<Mutex<Option<Inner>>>,
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug)]
struct Inner {
    /// Lock of the shared [`State`].
    shared: OwnedMutexGuard<State>,

    /// Staged [`State`] to be committed.
    staged: State,
}

impl Tx {
    /// Starts a new [`Tx`] over the [`State`] of the provided [`NonTx`]
    /// client.
    pub async fn from_non_tx(client: &NonTx) -> Self {
        let shared = Arc::clone(&client.state).lock_owned().await;
        let staged = shared.clone();
        Self {
            inner: Arc::new(Mutex::new(Some(Inner { shared, staged }))),
        }
    }

    /// Commits this [`Tx`] client.
    ///
    /// Committing an already committed [`Tx`] does nothing.
    pub async fn commit(&self) {
        if let Some(Inner { mut shared, staged }) =
            self.inner.lock().await.take()
        {
            *shared = staged;
        }
    }
}

impl Connection for Tx {
    async fn read<R, F>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&State) -> R,
    {
        self.inner
            .lock()
            .await
            .as_ref()
            .map(|inner| f(&inner.staged))
            .ok_or_else(|| {
                tracerr::new!(database::Error::from(
                    memory::Error::TxFinished
                ))
            })
    }

    async fn write<R, F>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&mut State) -> R,
    {
        self.inner
            .lock()
            .await
            .as_mut()
            .map(|inner| f(&mut inner.staged))
            .ok_or_else(|| {
                tracerr::new!(database::Error::from(
                    memory::Error::TxFinished
                ))
            })
    }
}

#[cfg(test)]
mod spec {
    use super::{Connection as _, NonTx, Tx};

    #[tokio::test]
    async fn committed_tx_cannot_be_used() {
        let client = NonTx::default();

        let tx = Tx::from_non_tx(&client).await;
        tx.commit().await;

        assert!(tx.read(|_| ()).await.is_err());
        assert!(tx.write(|_| ()).await.is_err());
        tx.commit().await;
    }
}

//! In-memory [`Database`] implementation.
//!
//! Nothing is persisted: all the data lives as long as the [`Memory`] client
//! (and its clones) does, and starts empty.

pub mod client;
mod impls;

use derive_more::{Deref, Display, Error as StdError};

#[cfg(doc)]
use common::operations::{Commit, Transact};

#[cfg(doc)]
use crate::infra::Database;
use crate::domain::{user::Session, User};

pub use self::client::{Connection, NonTx, Tx};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Data stored in a [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Registered [`User`]s in their registration order.
    pub(crate) users: Vec<User>,

    /// The only active [`Session`], if any.
    ///
    /// There is a single slot for the whole [`Memory`] client, so creating a
    /// new [`Session`] replaces the previous one whoever it belongs to.
    pub(crate) session: Option<Session>,
}

/// [`Memory`] database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Tx`] has been used after its [`Commit`].
    #[display("`Tx` is already committed")]
    TxFinished,

    /// Unique constraint is violated by the inserted value.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}


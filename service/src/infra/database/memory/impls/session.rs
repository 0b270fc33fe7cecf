//! [`Session`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::user::Session,
    infra::{
        database::{self, memory::Connection, Memory},
        Database,
    },
};

impl<C> Database<Select<By<Option<Session>, ()>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Option<Session>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Option<Session>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.read(|s| s.session.clone())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Session>> for Memory<C>
where
    C: Connection,
{
    /// Replaced [`Session`], if any.
    type Ok = Option<Session>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(session): Insert<Session>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| s.session.replace(session))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<Option<Session>, ()>>> for Memory<C>
where
    C: Connection,
{
    /// Deleted [`Session`], if any.
    type Ok = Option<Session>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Delete<By<Option<Session>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| s.session.take())
            .await
            .map_err(tracerr::wrap!())
    }
}

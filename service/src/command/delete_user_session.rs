//! [`Command`] for deleting the active [`Session`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::user::Session,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting the active [`Session`] (logging out).
///
/// Succeeds regardless of whether there is any active [`Session`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteUserSession;

impl<Db> Command<DeleteUserSession> for Service<Db>
where
    Db: Database<
        Delete<By<Option<Session>, ()>>,
        Ok = Option<Session>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        _: DeleteUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let deleted = self
            .database()
            .execute(Delete(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(s) = deleted {
            tracing::debug!(user_id = %s.user_id, "`Session` deleted");
        }

        Ok(())
    }
}

/// Error of [`DeleteUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

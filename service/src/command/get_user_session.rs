//! [`Command`] for getting the active [`Session`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::user::Session,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for getting the active [`Session`].
///
/// This is a [`Command`] rather than a query, because an expired [`Session`]
/// is cleared once noticed, so is never returned again.
#[derive(Clone, Copy, Debug)]
pub struct GetUserSession;

impl<Db> Command<GetUserSession> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Session>, ()>>,
            Ok = Option<Session>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Option<Session>, ()>>,
            Ok = Option<Session>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Option<Session>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: GetUserSession) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let Some(session) = tx
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Ok(None);
        };
        if !session.is_expired_at(self.now()) {
            return Ok(Some(session));
        }

        tx.execute(Delete(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::debug!(
            user_id = %session.user_id,
            expires_at = %session.expires_at.to_rfc3339(),
            "expired `Session` cleared",
        );

        Ok(None)
    }
}

/// Error of [`GetUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(all(test, feature = "memory"))]
mod spec {
    use std::time::Duration;

    use common::operations::Insert;

    use crate::{
        command::CreateUserSession,
        domain::user::{session::Token, Role, Session},
        test_util, Command as _,
    };

    use super::GetUserSession;

    #[tokio::test]
    async fn absent_without_login() {
        let svc = test_util::service();

        assert!(svc.execute(GetUserSession).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn returns_unexpired_session_repeatedly() {
        let svc = test_util::service();
        svc.execute(test_util::registration(
            "S100",
            Role::Student,
            "s100@uni.edu",
            None,
        ))
        .await
        .unwrap();
        let session = svc
            .execute(CreateUserSession {
                id: "S100".parse().unwrap(),
                password: test_util::password("secret-pass"),
                role: Role::Student,
            })
            .await
            .unwrap();

        for _ in 0..2 {
            let active = svc.execute(GetUserSession).await.unwrap().unwrap();
            assert_eq!(active.token, session.token);
        }
    }

    #[tokio::test]
    async fn clears_session_once_expired() {
        let clock = test_util::ManualClock::new();
        let svc = test_util::service_with_clock(&clock);
        svc.execute(test_util::registration(
            "S100",
            Role::Student,
            "s100@uni.edu",
            None,
        ))
        .await
        .unwrap();
        let session = svc
            .execute(CreateUserSession {
                id: "S100".parse().unwrap(),
                password: test_util::password("secret-pass"),
                role: Role::Student,
            })
            .await
            .unwrap();

        clock.advance(Duration::from_secs(8 * 60 * 60 - 1));
        let active = svc.execute(GetUserSession).await.unwrap().unwrap();
        assert_eq!(active.token, session.token);

        clock.advance(Duration::from_secs(1));
        assert_eq!(session.expires_at.coerce::<()>(), svc.now());
        assert!(svc.execute(GetUserSession).await.unwrap().is_none());

        clock.advance(Duration::from_secs(1));
        assert!(svc.execute(GetUserSession).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clears_session_with_zero_ttl() {
        let svc = test_util::service_with_ttl(Duration::ZERO);
        svc.execute(test_util::registration(
            "S100",
            Role::Student,
            "s100@uni.edu",
            None,
        ))
        .await
        .unwrap();
        let session = svc
            .execute(CreateUserSession {
                id: "S100".parse().unwrap(),
                password: test_util::password("secret-pass"),
                role: Role::Student,
            })
            .await
            .unwrap();
        assert!(session.is_expired_at(svc.now()));

        assert!(svc.execute(GetUserSession).await.unwrap().is_none());
        assert!(svc.execute(GetUserSession).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clears_stored_expired_session() {
        let clock = test_util::ManualClock::new();
        let svc = test_util::service_with_clock(&clock);
        #[expect(unsafe_code, reason = "test fixture")]
        let token = unsafe { Token::new_unchecked("expired".to_owned()) };
        let expired = Session {
            user_id: "S100".parse().unwrap(),
            name: "Jane Doe".parse().unwrap(),
            email: "s100@uni.edu".parse().unwrap(),
            role: Role::Student,
            employee_number: None,
            token,
            expires_at: svc.now().coerce(),
        };
        _ = svc.database().execute(Insert(expired)).await.unwrap();
        clock.advance(Duration::from_secs(1));

        assert!(svc.execute(GetUserSession).await.unwrap().is_none());
        assert!(svc.execute(GetUserSession).await.unwrap().is_none());
    }
}

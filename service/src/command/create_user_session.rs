//! [`Command`] for creating a [`Session`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::user::{Id, Password, Role};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] by [`User`] credentials.
///
/// The created [`Session`] replaces the active one, whoever it belongs to.
#[derive(Clone, Debug)]
pub struct CreateUserSession {
    /// [`Id`] of a [`User`].
    pub id: user::Id,

    /// [`Password`] of a [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Role`] the [`User`] is expected to have.
    pub role: user::Role,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'l> Database<
            Select<By<Option<User>, &'l user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<Session>,
            Ok = Option<Session>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession { id, password, role } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let user = tx
            .execute(Select(By::new(&id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::WrongCredentials)
            .map_err(tracerr::wrap!())?;

        let hash = user::PasswordHash::new(password.expose_secret());
        if user.password_hash != hash {
            return Err(tracerr::new!(E::WrongCredentials));
        }
        if user.role != role {
            return Err(tracerr::new!(E::RoleMismatch {
                actual: user.role,
                expected: role,
            }));
        }

        let expires_at = self
            .now()
            .checked_add(self.config().session_ttl)
            .ok_or_else(|| E::ExpirationOutOfRange)
            .map_err(tracerr::wrap!())?
            .coerce();
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &session::Claims {
                sub: user.id.clone(),
                exp: expires_at,
                jti: Uuid::new_v4(),
            },
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        let User {
            id,
            name,
            role,
            email,
            employee_number,
            ..
        } = user;
        let session = Session {
            user_id: id,
            name,
            email,
            role,
            employee_number,
            token,
            expires_at,
        };

        let replaced = tx
            .execute(Insert(session.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if let Some(prev) = replaced {
            tracing::debug!(
                user_id = %prev.user_id,
                "active `Session` replaced by `User(id: {})`",
                session.user_id,
            );
        }

        Ok(session)
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Session`] expiration is beyond the representable date range.
    #[display("`Session` expiration is out of range")]
    ExpirationOutOfRange,

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] has a [`Role`] different from the expected one.
    #[display("`User` has `{actual}` role, not `{expected}`")]
    #[from(ignore)]
    RoleMismatch {
        /// Actual [`Role`] of the [`User`].
        actual: user::Role,

        /// [`Role`] the [`User`] was expected to have.
        expected: user::Role,
    },

    /// Provided credentials don't match any [`User`].
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(all(test, feature = "memory"))]
mod spec {
    use std::time::Duration;

    use crate::{
        command::{GetUserSession, RegisterUser},
        domain::user::Role,
        test_util, Command as _,
    };

    use super::{CreateUserSession, ExecutionError as E};

    fn login(id: &str, password: &str, role: Role) -> CreateUserSession {
        CreateUserSession {
            id: id.parse().unwrap(),
            password: test_util::password(password),
            role,
        }
    }

    fn supervisor() -> RegisterUser {
        test_util::registration(
            "E100",
            Role::Supervisor,
            "boss@uni.edu",
            Some("EMP-1"),
        )
    }

    #[tokio::test]
    async fn creates_session_expiring_after_ttl() {
        let clock = test_util::ManualClock::new();
        let svc = test_util::service_with_clock(&clock);
        svc.execute(supervisor()).await.unwrap();

        let logged_in_at = svc.now();
        let session = svc
            .execute(login(" E100 ", "secret-pass", Role::Supervisor))
            .await
            .unwrap();

        let ttl = Duration::from_secs(8 * 60 * 60);
        assert_eq!(
            session.expires_at.coerce::<()>(),
            logged_in_at.checked_add(ttl).unwrap(),
        );
        assert_eq!(session.user_id.to_string(), "E100");
        assert_eq!(session.name.to_string(), "Jane Doe");
        assert_eq!(session.email.to_string(), "boss@uni.edu");
        assert_eq!(session.role, Role::Supervisor);
        assert_eq!(
            session.employee_number.map(|n| n.to_string()),
            Some("EMP-1".into()),
        );

        let active = svc.execute(GetUserSession).await.unwrap().unwrap();
        assert_eq!(active.token, session.token);
        assert_eq!(active.expires_at, session.expires_at);
    }

    #[tokio::test]
    async fn fails_when_expiration_overflows() {
        let svc = test_util::service_with_ttl(Duration::MAX);
        svc.execute(supervisor()).await.unwrap();

        let err = svc
            .execute(login("E100", "secret-pass", Role::Supervisor))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::ExpirationOutOfRange), "{err}");

        assert!(svc.execute(GetUserSession).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_wrong_credentials() {
        let svc = test_util::service();
        svc.execute(supervisor()).await.unwrap();

        let err = svc
            .execute(login("E100", "wrong-pass", Role::Supervisor))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::WrongCredentials), "{err}");

        let err = svc
            .execute(login("E999", "secret-pass", Role::Supervisor))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::WrongCredentials), "{err}");

        assert!(svc.execute(GetUserSession).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_role_mismatch_naming_actual_role() {
        let svc = test_util::service();
        svc.execute(test_util::registration(
            "C100",
            Role::Coordinator,
            "coord@uni.edu",
            Some("EMP-9"),
        ))
        .await
        .unwrap();

        for expected in [Role::Student, Role::Supervisor] {
            let err = svc
                .execute(login("C100", "secret-pass", expected))
                .await
                .unwrap_err();
            assert!(
                matches!(
                    err.as_ref(),
                    E::RoleMismatch { actual: Role::Coordinator, expected: e }
                        if *e == expected,
                ),
                "{err}",
            );
        }

        assert!(svc.execute(GetUserSession).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replaces_active_session() {
        let svc = test_util::service();
        svc.execute(supervisor()).await.unwrap();
        svc.execute(test_util::registration(
            "S100",
            Role::Student,
            "student@uni.edu",
            None,
        ))
        .await
        .unwrap();

        let first = svc
            .execute(login("E100", "secret-pass", Role::Supervisor))
            .await
            .unwrap();
        let second = svc
            .execute(login("S100", "secret-pass", Role::Student))
            .await
            .unwrap();
        assert_ne!(first.token, second.token);

        let active = svc.execute(GetUserSession).await.unwrap().unwrap();
        assert_eq!(active.user_id.to_string(), "S100");
        assert_eq!(active.token, second.token);
    }

    #[tokio::test]
    async fn issues_fresh_token_on_each_login() {
        let svc = test_util::service();
        svc.execute(supervisor()).await.unwrap();

        let first = svc
            .execute(login("E100", "secret-pass", Role::Supervisor))
            .await
            .unwrap();
        let second = svc
            .execute(login("E100", "secret-pass", Role::Supervisor))
            .await
            .unwrap();

        assert_ne!(first.token, second.token);
    }
}

//! [`Command`] for registering a new [`User`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, EmployeeNumber, Id, Name, Password, Role};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`User`].
#[derive(Clone, Debug)]
pub struct RegisterUser {
    /// [`Id`] of a new [`User`].
    pub id: user::Id,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,

    /// Full [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`EmployeeNumber`] of a new [`User`].
    ///
    /// Required for staff [`Role`]s, ignored for [`Role::Student`]s.
    pub employee_number: Option<user::EmployeeNumber>,
}

impl<Db> Command<RegisterUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'l> Database<
            Select<By<Option<User>, &'l user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::EmployeeNumber>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RegisterUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterUser {
            id,
            password,
            role,
            name,
            email,
            employee_number,
        } = cmd;
        let employee_number = employee_number.filter(|_| role.is_staff());
        let password_hash = user::PasswordHash::new(password.expose_secret());

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let u = tx
            .execute(Select(By::new(&id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::DuplicateIdentity(id)));
        }

        let u = tx
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::DuplicateEmail(email)));
        }

        if role.is_staff() {
            let Some(number) = employee_number.as_ref() else {
                return Err(tracerr::new!(E::MissingEmployeeNumber(role)));
            };
            let u = tx
                .execute(Select(By::new(number)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if u.is_some() {
                return Err(tracerr::new!(E::DuplicateEmployeeNumber(
                    number.clone()
                )));
            }
        }

        let user = User {
            id,
            name,
            role,
            password_hash,
            email,
            employee_number,
            created_at: self.now().coerce(),
        };
        tx.execute(Insert(user))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(())
    }
}

/// Error of [`RegisterUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the same [`Id`] is already registered.
    #[display("`User(id: {_0})` is already registered")]
    DuplicateIdentity(#[error(not(source))] user::Id),

    /// [`User`] with the same [`Email`] is already registered.
    #[display("`{_0}` email is already registered")]
    DuplicateEmail(#[error(not(source))] user::Email),

    /// Staff [`Role`] is registered without an [`EmployeeNumber`].
    #[display("`{_0}` role requires an employee number")]
    MissingEmployeeNumber(#[error(not(source))] user::Role),

    /// [`User`] with the same [`EmployeeNumber`] is already registered.
    #[display("`{_0}` employee number is already registered")]
    DuplicateEmployeeNumber(#[error(not(source))] user::EmployeeNumber),
}

#[cfg(all(test, feature = "memory"))]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::user::{self, Role},
        infra::Memory,
        query, read, test_util, Command as _, Service,
    };

    use super::ExecutionError as E;

    async fn total(svc: &Service<Memory>) -> usize {
        svc.execute(query::users::TotalCount::by(()))
            .await
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn registers_student_without_employee_number() {
        let svc = test_util::service();

        svc.execute(test_util::registration(
            "S100",
            Role::Student,
            "s100@uni.edu",
            None,
        ))
        .await
        .unwrap();

        assert_eq!(total(&svc).await, 1);
    }

    #[tokio::test]
    async fn discards_student_employee_number() {
        let svc = test_util::service();

        svc.execute(test_util::registration(
            "S100",
            Role::Student,
            "s100@uni.edu",
            Some("EMP-1"),
        ))
        .await
        .unwrap();
        svc.execute(test_util::registration(
            "E100",
            Role::Supervisor,
            "e100@uni.edu",
            Some("EMP-1"),
        ))
        .await
        .unwrap();

        let id: user::Id = "S100".parse().unwrap();
        let student = svc
            .database()
            .execute(Select(By::<Option<user::User>, _>::new(&id)))
            .await
            .unwrap()
            .unwrap();
        assert!(student.employee_number.is_none());
        assert_eq!(total(&svc).await, 2);
    }

    #[tokio::test]
    async fn rejects_duplicate_identity() {
        let svc = test_util::service();
        svc.execute(test_util::registration(
            "S100",
            Role::Student,
            "first@uni.edu",
            None,
        ))
        .await
        .unwrap();

        let err = svc
            .execute(test_util::registration(
                "S100",
                Role::Student,
                "second@uni.edu",
                None,
            ))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), E::DuplicateIdentity(id) if id.to_string() == "S100"),
            "{err}",
        );
        assert_eq!(total(&svc).await, 1);

        let id: user::Id = "S100".parse().unwrap();
        let kept = svc
            .execute(query::user::ById::by(&id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.email.to_string(), "first@uni.edu");
    }

    #[tokio::test]
    async fn rejects_duplicate_email_ignoring_case_and_whitespace() {
        let svc = test_util::service();
        svc.execute(test_util::registration(
            "S100",
            Role::Student,
            "Jane.Doe@Uni.edu",
            None,
        ))
        .await
        .unwrap();

        let err = svc
            .execute(test_util::registration(
                "S200",
                Role::Student,
                "  jane.doe@UNI.EDU ",
                None,
            ))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), E::DuplicateEmail(_)), "{err}");
        assert_eq!(total(&svc).await, 1);
    }

    #[tokio::test]
    async fn requires_employee_number_for_staff() {
        let svc = test_util::service();

        for role in [Role::Supervisor, Role::Coordinator] {
            let err = svc
                .execute(test_util::registration(
                    "E100",
                    role,
                    "e100@uni.edu",
                    None,
                ))
                .await
                .unwrap_err();

            assert!(
                matches!(err.as_ref(), E::MissingEmployeeNumber(r) if *r == role),
                "{err}",
            );
        }
        assert_eq!(total(&svc).await, 0);
    }

    #[tokio::test]
    async fn rejects_duplicate_employee_number() {
        let svc = test_util::service();
        svc.execute(test_util::registration(
            "E100",
            Role::Supervisor,
            "e100@uni.edu",
            Some("EMP-1"),
        ))
        .await
        .unwrap();

        let err = svc
            .execute(test_util::registration(
                "E200",
                Role::Coordinator,
                "e200@uni.edu",
                Some("EMP-1"),
            ))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), E::DuplicateEmployeeNumber(_)),
            "{err}",
        );
        assert_eq!(total(&svc).await, 1);
    }

    #[tokio::test]
    async fn first_failing_check_wins() {
        let svc = test_util::service();
        svc.execute(test_util::registration(
            "E100",
            Role::Supervisor,
            "e100@uni.edu",
            Some("EMP-1"),
        ))
        .await
        .unwrap();

        // Duplicate identity takes precedence over everything else.
        let err = svc
            .execute(test_util::registration(
                "E100",
                Role::Supervisor,
                "E100@uni.edu",
                None,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::DuplicateIdentity(_)), "{err}");

        // Duplicate email goes before the missing employee number.
        let err = svc
            .execute(test_util::registration(
                "E200",
                Role::Supervisor,
                "E100@uni.edu",
                None,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::DuplicateEmail(_)), "{err}");

        assert_eq!(
            usize::from(
                svc.database()
                    .execute(Select(By::<read::user::TotalCount, _>::new(())))
                    .await
                    .unwrap()
            ),
            1,
        );
    }
}

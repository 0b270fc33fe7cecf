//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{
            self,
            memory::{self, Connection},
            Memory,
        },
        Database,
    },
    read,
};

impl<'l, C> Database<Select<By<Option<User>, &'l user::Id>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.users.iter().find(|u| &u.id == id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Email>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        self.read(|s| s.users.iter().find(|u| u.email.is_same(email)).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::EmployeeNumber>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::EmployeeNumber>>,
    ) -> Result<Self::Ok, Self::Err> {
        let number = by.into_inner();
        self.read(|s| {
            s.users
                .iter()
                .find(|u| u.employee_number.as_ref() == Some(number))
                .cloned()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<read::user::TotalCount, ()>>> for Memory<C>
where
    C: Connection,
{
    type Ok = read::user::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::user::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.read(|s| s.users.len().into())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<User>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            let violated = s.users.iter().find_map(|u| {
                if u.id == user.id {
                    Some("users_id_key")
                } else if u.email.is_same(&user.email) {
                    Some("users_email_key")
                } else if u.employee_number.is_some()
                    && u.employee_number == user.employee_number
                {
                    Some("users_employee_number_key")
                } else {
                    None
                }
            });
            if let Some(constraint) = violated {
                return Err(memory::Error::UniqueViolation(constraint));
            }
            s.users.push(user);
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())?
        .map_err(|e| tracerr::new!(database::Error::from(e)))
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Insert, Select, Transact},
        DateTime,
    };

    use crate::{
        domain::{user, User},
        infra::{database, Database as _, Memory},
        read,
    };

    fn user(id: &str, email: &str, employee: Option<&str>) -> User {
        User {
            id: id.parse().unwrap(),
            name: "Jane Doe".parse().unwrap(),
            role: if employee.is_some() {
                user::Role::Supervisor
            } else {
                user::Role::Student
            },
            password_hash: user::PasswordHash::new(
                &"secret-pass".parse().unwrap(),
            ),
            email: email.parse().unwrap(),
            employee_number: employee.map(|n| n.parse().unwrap()),
            created_at: DateTime::now().coerce(),
        }
    }

    async fn count(db: &Memory) -> usize {
        db.execute(Select(By::<read::user::TotalCount, _>::new(())))
            .await
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn selects_by_unique_keys() {
        let db = Memory::new();
        db.execute(Insert(user("S1", "Jane@Uni.edu", None)))
            .await
            .unwrap();
        db.execute(Insert(user("E1", "boss@uni.edu", Some("EMP-1"))))
            .await
            .unwrap();

        let id: user::Id = "S1".parse().unwrap();
        let found = db
            .execute(Select(By::<Option<User>, _>::new(&id)))
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(id));

        let email: user::Email = " jane@uni.EDU ".parse().unwrap();
        let found = db
            .execute(Select(By::<Option<User>, _>::new(&email)))
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id.to_string()), Some("S1".into()));

        let number: user::EmployeeNumber = "EMP-1".parse().unwrap();
        let found = db
            .execute(Select(By::<Option<User>, _>::new(&number)))
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id.to_string()), Some("E1".into()));

        let missing: user::Id = "S2".parse().unwrap();
        assert!(db
            .execute(Select(By::<Option<User>, _>::new(&missing)))
            .await
            .unwrap()
            .is_none());
        assert_eq!(count(&db).await, 2);
    }

    #[tokio::test]
    async fn insert_enforces_uniqueness() {
        let db = Memory::new();
        db.execute(Insert(user("E1", "a@uni.edu", Some("EMP-1"))))
            .await
            .unwrap();

        for (dup, constraint) in [
            (user("E1", "b@uni.edu", Some("EMP-2")), "users_id_key"),
            (user("E2", "A@UNI.EDU", Some("EMP-2")), "users_email_key"),
            (
                user("E3", "c@uni.edu", Some("EMP-1")),
                "users_employee_number_key",
            ),
        ] {
            let err = db.execute(Insert(dup)).await.unwrap_err();
            let database::Error::Memory(err): &database::Error = err.as_ref();
            assert!(
                matches!(
                    err,
                    database::memory::Error::UniqueViolation(c) if *c == constraint,
                ),
                "{err}",
            );
        }

        db.execute(Insert(user("S1", "s1@uni.edu", None)))
            .await
            .unwrap();
        db.execute(Insert(user("S2", "s2@uni.edu", None)))
            .await
            .unwrap();
        assert_eq!(count(&db).await, 3);
    }

    #[tokio::test]
    async fn uncommitted_tx_is_discarded() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(user("S1", "s1@uni.edu", None)))
            .await
            .unwrap();
        assert_eq!(
            usize::from(
                tx.execute(Select(By::<read::user::TotalCount, _>::new(())))
                    .await
                    .unwrap()
            ),
            1,
        );
        drop(tx);
        assert_eq!(count(&db).await, 0);

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(user("S1", "s1@uni.edu", None)))
            .await
            .unwrap();
        tx.execute(Commit).await.unwrap();
        drop(tx);
        assert_eq!(count(&db).await, 1);
    }
}

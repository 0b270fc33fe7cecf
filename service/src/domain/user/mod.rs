//! [`User`] definitions.

pub mod session;

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Debug, Display};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::Serialize;
use sha2::Sha256;

pub use self::session::Session;

/// Registered portal user.
///
/// [`User`]s are created once on registration and never change afterwards.
#[derive(Clone, Debug)]
pub struct User {
    /// Identity number of this [`User`].
    pub id: Id,

    /// Full [`Name`] of this [`User`].
    pub name: Name,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// [`EmployeeNumber`] of this [`User`].
    ///
    /// Always present for staff [`Role`]s and absent for students.
    pub employee_number: Option<EmployeeNumber>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// Identity number of a [`User`].
///
/// Unique key of a [`User`] in the system.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
pub struct Id(String);

impl Id {
    /// Creates a new [`Id`] out of the trimmed `id`, if it's valid.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Option<Self> {
        let id = id.as_ref().trim();
        Self::check(id).then(|| Self(id.to_owned()))
    }

    /// Checks whether the given `id` is a valid [`Id`].
    fn check(id: &str) -> bool {
        !id.is_empty()
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Id`")
    }
}

/// Full name of a [`User`].
///
/// Bounded in length, as it's accepted from the console input as is.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] out of the trimmed `name`, if it's valid.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let name = name.as_ref().trim();
        Self::check(name).then(|| Self(name.to_owned()))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: &str) -> bool {
        !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

define_kind! {
    #[doc = "Role of a [`User`], ranked from the least to the most \
             privileged one."]
    enum Role {
        #[doc = "Student submitting project proposals."]
        Student = 0,

        #[doc = "Supervisor reviewing proposals of students."]
        Supervisor = 1,

        #[doc = "Coordinator of the whole program."]
        Coordinator = 2,
    }
}

impl Role {
    /// Returns the rank of this [`Role`] in the privilege hierarchy.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.u8()
    }

    /// Indicates whether this [`Role`] belongs to the staff (not a
    /// [`Role::Student`]), so requires an [`EmployeeNumber`].
    #[must_use]
    pub const fn is_staff(self) -> bool {
        !matches!(self, Self::Student)
    }

    /// Checks whether this [`Role`] satisfies the `required` one.
    ///
    /// This is a hierarchy check: a [`Role::Coordinator`] satisfies anything
    /// a [`Role::Supervisor`] or a [`Role::Student`] does.
    #[must_use]
    pub const fn can_access(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }
}

/// Checks whether the `session_role` satisfies the `required` [`Role`].
///
/// No [`Role`] (no authenticated [`Session`]) satisfies nothing.
#[must_use]
pub fn can_access(session_role: Option<Role>, required: Role) -> bool {
    session_role.is_some_and(|role| role.can_access(required))
}

/// Password of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[debug("Password(..)")]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        !password.as_ref().is_empty()
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Password hash of a [`User`].
///
/// Deterministic: the same [`Password`] always produces the same
/// [`PasswordHash`], so hashes are compared for equality.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Salt mixed into every [`Password`] before hashing.
    const SALT: &'static [u8] = b"wil-portal.user.password";

    /// Number of PBKDF2 rounds.
    const ROUNDS: u32 = 10_000;

    /// Creates a new [`PasswordHash`] from the given [`Password`].
    #[must_use]
    pub fn new(password: &Password) -> Self {
        let mut digest = [0_u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            password.0.as_bytes(),
            Self::SALT,
            Self::ROUNDS,
            &mut digest,
        );
        Self(hex::encode(digest))
    }
}

/// Email address of a [`User`].
///
/// Two [`Email`]s denote the same mailbox if their [`Email::normalized()`]
/// forms are equal.
///
/// The address format is checked once, when parsing the console input.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] out of the trimmed `address`, if it's valid.
    #[must_use]
    pub fn new(address: impl AsRef<str>) -> Option<Self> {
        let address = address.as_ref().trim();
        Self::check(address).then(|| Self(address.to_owned()))
    }

    /// Returns the case-insensitive form of this [`Email`].
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Checks whether this [`Email`] denotes the same mailbox as the `other`
    /// one.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: &str) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                  |\\x5c[\\x00-\\x7f])*\\x22)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x22))*\\x40\
                  ([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d))*$",
            )
            .expect("valid regex")
        });

        REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Employee number of a staff [`User`].
///
/// Bounded in length, as it's accepted from the console input as is.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct EmployeeNumber(String);

impl EmployeeNumber {
    /// Creates a new [`EmployeeNumber`] out of the trimmed `number`, if it's
    /// valid.
    #[must_use]
    pub fn new(number: impl AsRef<str>) -> Option<Self> {
        let number = number.as_ref().trim();
        Self::check(number).then(|| Self(number.to_owned()))
    }

    /// Checks whether the given `number` is a valid [`EmployeeNumber`].
    fn check(number: &str) -> bool {
        !number.is_empty() && number.chars().count() <= 64
    }
}

impl FromStr for EmployeeNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `EmployeeNumber`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display};
use serde::Serialize;
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Authenticated [`User`] session.
///
/// Carries a snapshot of the [`User`] identity taken at login time.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`user::Name`] of the [`User`].
    pub name: user::Name,

    /// [`user::Email`] of the [`User`].
    pub email: user::Email,

    /// [`user::Role`] of the [`User`].
    pub role: user::Role,

    /// [`user::EmployeeNumber`] of the [`User`], if any.
    pub employee_number: Option<user::EmployeeNumber>,

    /// Opaque access [`Token`] of this [`Session`].
    pub token: Token,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// Checks whether this [`Session`] is expired at the provided moment.
    ///
    /// A [`Session`] is valid strictly before its [`Session::expires_at`].
    #[must_use]
    pub fn is_expired_at<Of: ?Sized>(&self, now: DateTimeOf<Of>) -> bool {
        self.expires_at <= now.coerce()
    }
}

/// Claims signed into a [`Token`].
#[derive(Clone, Debug, Serialize)]
pub struct Claims {
    /// ID of the [`User`] the [`Token`] is issued to.
    pub sub: user::Id,

    /// [`DateTime`] when the [`Token`] expires.
    #[serde(with = "common::datetime::serde::unix_timestamp")]
    pub exp: ExpirationDateTime,

    /// Unique ID of the [`Token`], making each issued [`Token`] distinct.
    pub jti: Uuid,
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

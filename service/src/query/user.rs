//! [`Query`] collection related to a single [`User`].

use common::operations::By;

use crate::domain::{user, User};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`User`] by its [`user::Id`].
pub type ById<'l> = DatabaseQuery<By<Option<User>, &'l user::Id>>;

/// Queries a [`User`] by its [`user::Email`], ignoring the letter case.
pub type ByEmail<'l> = DatabaseQuery<By<Option<User>, &'l user::Email>>;

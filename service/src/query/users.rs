//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::By;

#[cfg(doc)]
use crate::{domain::User, Query};
use crate::read;

use super::DatabaseQuery;

/// Queries total count of registered [`User`]s.
pub type TotalCount = DatabaseQuery<By<read::user::TotalCount, ()>>;

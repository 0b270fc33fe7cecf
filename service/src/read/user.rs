//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

use derive_more::{Display, From, Into};

/// Total count of registered [`User`]s.
///
/// [`User`]: crate::domain::User
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, Hash, Into, PartialEq,
)]
pub struct TotalCount(usize);

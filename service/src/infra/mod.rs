//! Infrastructure layer.

pub mod database;

pub use self::database::Database;
#[cfg(feature = "memory")]
pub use self::database::{memory, Memory};

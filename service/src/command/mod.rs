//! [`Command`] definition.

pub mod create_user_session;
pub mod delete_user_session;
pub mod get_user_session;
pub mod register_user;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_user_session::CreateUserSession,
    delete_user_session::DeleteUserSession, get_user_session::GetUserSession,
    register_user::RegisterUser,
};

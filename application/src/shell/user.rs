//! User-related reply payloads.

use serde::Serialize;
use service::domain::user;

/// Authenticated session as printed by the [`Shell`].
///
/// [`Shell`]: super::Shell
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Identity number of the logged in user.
    pub user_id: String,

    /// Full name of the logged in user.
    pub name: String,

    /// Email of the logged in user.
    pub email: String,

    /// Role of the logged in user.
    pub role: String,

    /// Employee number of the logged in user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,

    /// Opaque access token of the session.
    pub token: String,

    /// RFC 3339 moment when the session expires.
    pub expires_at: String,
}

impl From<user::Session> for Session {
    fn from(session: user::Session) -> Self {
        let user::Session {
            user_id,
            name,
            email,
            role,
            employee_number,
            token,
            expires_at,
        } = session;
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            employee_number: employee_number.map(|n| n.to_string()),
            token: token.to_string(),
            expires_at: expires_at.to_rfc3339(),
        }
    }
}

/// Registered user as printed by the [`Shell`].
///
/// Never exposes the password hash.
///
/// [`Shell`]: super::Shell
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity number of the user.
    pub id: String,

    /// Full name of the user.
    pub name: String,

    /// Email of the user.
    pub email: String,

    /// Role of the user.
    pub role: String,

    /// Employee number of the user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,

    /// RFC 3339 moment when the user registered.
    pub created_at: String,
}

impl From<service::domain::User> for User {
    fn from(user: service::domain::User) -> Self {
        let service::domain::User {
            id,
            name,
            role,
            password_hash: _,
            email,
            employee_number,
            created_at,
        } = user;
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            employee_number: employee_number.map(|n| n.to_string()),
            created_at: created_at.to_rfc3339(),
        }
    }
}

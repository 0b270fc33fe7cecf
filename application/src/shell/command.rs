//! [`Shell`] handlers of the identity [`Request`]s.
//!
//! [`Request`]: super::Request

use service::{command, domain::user, query, Command as _};

use crate::{define_error, AsError, Error};

use super::{Output, Shell};

impl Shell {
    /// Name of the [`tracing::Span`] for the handlers.
    const SPAN_NAME: &'static str = "Shell request";

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DUPLICATE_IDENTITY` - identity number is already registered;
    /// - `DUPLICATE_EMAIL` - email is already registered;
    /// - `MISSING_EMPLOYEE_NUMBER` - staff role without employee number;
    /// - `DUPLICATE_EMPLOYEE_NUMBER` - employee number is already
    ///                                 registered.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            employee_number = ?employee_number.as_ref().map(ToString::to_string),
            id = %id,
            name = %name,
            otel.name = Self::SPAN_NAME,
            request = "register",
            role = %role,
        ),
    )]
    pub(super) async fn register(
        &self,
        id: user::Id,
        password: user::Password,
        role: user::Role,
        name: user::Name,
        email: user::Email,
        employee_number: Option<user::EmployeeNumber>,
    ) -> Result<Output, Error> {
        self.service
            .execute(command::RegisterUser {
                id,
                password: secrecy::SecretBox::init_with(move || password),
                role,
                name,
                email,
                employee_number,
            })
            .await
            .map_err(AsError::into_error)?;

        Ok(Output::Done {})
    }

    /// Logs in through the entry point of the provided `role`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_CREDENTIALS` - credentials don't match any user;
    /// - `ROLE_MISMATCH` - user is registered with another role.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            otel.name = Self::SPAN_NAME,
            request = "login",
            role = %role,
        ),
    )]
    pub(super) async fn login(
        &self,
        id: user::Id,
        password: user::Password,
        role: user::Role,
    ) -> Result<Output, Error> {
        let session = self
            .service
            .execute(command::CreateUserSession {
                id,
                password: secrecy::SecretBox::init_with(move || password),
                role,
            })
            .await
            .map_err(AsError::into_error)?;

        Ok(Output::Session {
            session: Some(session.into()),
        })
    }

    /// Returns the active session, if any.
    #[tracing::instrument(
        skip_all,
        fields(otel.name = Self::SPAN_NAME, request = "session"),
    )]
    pub(super) async fn session(&self) -> Result<Output, Error> {
        let session = self
            .service
            .execute(command::GetUserSession)
            .await
            .map_err(AsError::into_error)?;

        Ok(Output::Session {
            session: session.map(Into::into),
        })
    }

    /// Clears the active session.
    #[tracing::instrument(
        skip_all,
        fields(otel.name = Self::SPAN_NAME, request = "logout"),
    )]
    pub(super) async fn logout(&self) -> Result<Output, Error> {
        self.service
            .execute(command::DeleteUserSession)
            .await
            .map_err(AsError::into_error)?;

        Ok(Output::Done {})
    }

    /// Checks whether the `session_role` (or the role of the active session)
    /// satisfies the `required` one.
    #[tracing::instrument(
        skip_all,
        fields(
            otel.name = Self::SPAN_NAME,
            request = "can-access",
            required = %required,
            session_role = ?session_role.map(|r| r.to_string()),
        ),
    )]
    pub(super) async fn can_access(
        &self,
        required: user::Role,
        session_role: Option<user::Role>,
    ) -> Result<Output, Error> {
        let session_role = match session_role {
            Some(role) => Some(role),
            None => self
                .service
                .execute(command::GetUserSession)
                .await
                .map_err(AsError::into_error)?
                .map(|s| s.role),
        };

        Ok(Output::Access {
            allowed: user::can_access(session_role, required),
        })
    }

    /// Returns the registered user with the provided `id`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - no user is registered with the `id`.
    #[tracing::instrument(
        skip_all,
        fields(id = %id, otel.name = Self::SPAN_NAME, request = "user"),
    )]
    pub(super) async fn user(&self, id: user::Id) -> Result<Output, Error> {
        define_error! {
            enum UserError {
                #[code = "USER_NOT_EXISTS"]
                #[message = "No user is registered with this identity number"]
                NotExists,
            }
        }

        let user = self
            .service
            .execute(query::user::ById::by(&id))
            .await
            .map_err(AsError::into_error)?
            .ok_or_else(|| Error::from(UserError::NotExists))?;

        Ok(Output::User { user: user.into() })
    }

    /// Returns the number of registered users.
    #[tracing::instrument(
        skip_all,
        fields(otel.name = Self::SPAN_NAME, request = "users"),
    )]
    pub(super) async fn users(&self) -> Result<Output, Error> {
        let count = self
            .service
            .execute(query::users::TotalCount::by(()))
            .await
            .map_err(AsError::into_error)?;

        Ok(Output::Count {
            count: count.into(),
        })
    }
}

impl AsError for command::register_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DUPLICATE_IDENTITY"]
                #[message = "A user with this identity number is already \
                             registered"]
                DuplicateIdentity,

                #[code = "DUPLICATE_EMAIL"]
                #[message = "A user with this email is already registered"]
                DuplicateEmail,

                #[code = "MISSING_EMPLOYEE_NUMBER"]
                #[message = "Employee number is required for supervisors and \
                             coordinators"]
                MissingEmployeeNumber,

                #[code = "DUPLICATE_EMPLOYEE_NUMBER"]
                #[message = "A user with this employee number is already \
                             registered"]
                DuplicateEmployeeNumber,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::DuplicateIdentity(_) => Some(Error::DuplicateIdentity.into()),
            Self::DuplicateEmail(_) => Some(Error::DuplicateEmail.into()),
            Self::MissingEmployeeNumber(_) => {
                Some(Error::MissingEmployeeNumber.into())
            }
            Self::DuplicateEmployeeNumber(_) => {
                Some(Error::DuplicateEmployeeNumber.into())
            }
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_CREDENTIALS"]
                #[message = "Invalid identity number or password"]
                InvalidCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ExpirationOutOfRange | Self::JsonWebTokenEncodeError(_) => {
                None
            }
            Self::RoleMismatch { actual, .. } => Some(crate::Error::new(
                "ROLE_MISMATCH",
                format!(
                    "This account is registered as `{actual}`, use the \
                     `{actual}` login instead",
                ),
            )),
            Self::WrongCredentials => Some(Error::InvalidCredentials.into()),
        }
    }
}

impl AsError for command::get_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

//! Console [`Shell`] serving [`Request`]s line by line.

mod command;
pub mod request;
pub mod user;

use std::io;

use clap::error::ErrorKind;
use serde::Serialize;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _,
};

use crate::{error::Code, AsError as _, Error, Service};

pub use self::request::{ParseError, Request};

/// Console shell executing [`Request`]s against the [`Service`].
///
/// Every non-empty input line is a single [`Request`], answered with a single
/// line of JSON:
/// - `{"success":true, ..}` along with the [`Output`] payload;
/// - `{"success":false,"code":..,"message":..}` on failure.
#[derive(Clone, Debug)]
pub struct Shell {
    /// [`Service`] the [`Request`]s are executed against.
    service: Service,
}

impl Shell {
    /// Creates a new [`Shell`] over the provided [`Service`].
    #[must_use]
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    /// Runs this [`Shell`] until the `input` is exhausted or an
    /// [`Request::Exit`] is received.
    ///
    /// # Errors
    ///
    /// If reading the `input` or writing the `output` fails.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let result = match Request::parse_line(line) {
                Ok(Request::Exit) => break,
                Ok(req) => self.execute(req).await,
                Err(ParseError::Args(e))
                    if matches!(e.kind(), ErrorKind::DisplayHelp) =>
                {
                    Ok(Output::Help {
                        help: e.render().to_string(),
                    })
                }
                Err(e) => Err(e.into_error()),
            };

            let mut reply = serde_json::to_string(&Reply::from(result))
                .map_err(io::Error::other)?;
            reply.push('\n');
            output.write_all(reply.as_bytes()).await?;
            output.flush().await?;
        }
        Ok(())
    }

    /// Executes the provided [`Request`].
    async fn execute(&self, req: Request) -> Result<Output, Error> {
        match req {
            Request::Register {
                id,
                password,
                role,
                name,
                email,
                employee_number,
            } => {
                self.register(id, password, role, name, email, employee_number)
                    .await
            }
            Request::Login { id, password, role } => {
                self.login(id, password, role).await
            }
            Request::Session => self.session().await,
            Request::Logout => self.logout().await,
            Request::CanAccess {
                required,
                session_role,
            } => self.can_access(required, session_role).await,
            Request::User { id } => self.user(id).await,
            Request::Users => self.users().await,
            Request::Exit => Ok(Output::Done {}),
        }
    }
}

/// Payload of a successful [`Request`] execution.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    /// Active [`user::Session`], if any.
    Session {
        /// Active [`user::Session`].
        session: Option<user::Session>,
    },

    /// Result of an access check.
    Access {
        /// Whether the access is granted.
        allowed: bool,
    },

    /// Registered [`user::User`].
    User {
        /// Registered [`user::User`].
        user: user::User,
    },

    /// Number of registered users.
    Count {
        /// Number of registered users.
        count: usize,
    },

    /// Usage of the [`Shell`].
    Help {
        /// Rendered usage text.
        help: String,
    },

    /// No payload.
    Done {},
}

/// Single line reply of the [`Shell`].
#[derive(Debug, Serialize)]
struct Reply {
    /// Whether the [`Request`] has succeeded.
    success: bool,

    /// Payload of this [`Reply`].
    #[serde(flatten)]
    body: Body,
}

/// Payload of a [`Reply`].
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Body {
    /// Successful [`Output`].
    Output(Output),

    /// Failure description.
    Failure {
        /// [`Error`] code.
        code: Code,

        /// Human-readable [`Error`] message.
        message: String,
    },
}

impl From<Result<Output, Error>> for Reply {
    fn from(result: Result<Output, Error>) -> Self {
        match result {
            Ok(output) => Self {
                success: true,
                body: Body::Output(output),
            },
            Err(Error { code, message, .. }) => Self {
                success: false,
                body: Body::Failure { code, message },
            },
        }
    }
}

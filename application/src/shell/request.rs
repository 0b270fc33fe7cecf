//! [`Request`] parsing.

use std::mem;

use clap::Parser;
use derive_more::{Display, Error, From};
use service::domain::user;

use crate::{AsError, Error as ShellError};

/// Single line command of the console [`Shell`].
///
/// [`Shell`]: super::Shell
#[derive(Debug, Parser)]
#[command(
    name = "shell",
    no_binary_name = true,
    disable_version_flag = true,
    help_template = "{all-args}"
)]
pub enum Request {
    /// Registers a new user.
    Register {
        /// Identity number of the user.
        #[arg(long)]
        id: user::Id,

        /// Password of the user.
        #[arg(long)]
        password: user::Password,

        /// Role of the user: `student`, `supervisor` or `coordinator`.
        #[arg(long)]
        role: user::Role,

        /// Full name of the user.
        #[arg(long)]
        name: user::Name,

        /// Email address of the user.
        #[arg(long)]
        email: user::Email,

        /// Employee number, required for staff roles.
        #[arg(long)]
        employee_number: Option<user::EmployeeNumber>,
    },

    /// Logs in through the entry point of the provided role.
    Login {
        /// Identity number of the user.
        #[arg(long)]
        id: user::Id,

        /// Password of the user.
        #[arg(long)]
        password: user::Password,

        /// Role the user logs in as.
        #[arg(long)]
        role: user::Role,
    },

    /// Prints the active session, if any.
    Session,

    /// Clears the active session.
    Logout,

    /// Checks whether a role satisfies the required one.
    CanAccess {
        /// Required role.
        required: user::Role,

        /// Role to check instead of the one of the active session.
        #[arg(long = "as", value_name = "ROLE")]
        session_role: Option<user::Role>,
    },

    /// Prints a registered user.
    User {
        /// Identity number of the user.
        id: user::Id,
    },

    /// Prints the number of registered users.
    Users,

    /// Closes the shell.
    Exit,
}

impl Request {
    /// Parses a [`Request`] out of the provided input `line`.
    ///
    /// # Errors
    ///
    /// If the `line` is not a valid [`Request`].
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        Ok(Self::try_parse_from(split(line)?)?)
    }
}

/// Error of parsing a [`Request`].
#[derive(Debug, Display, Error, From)]
pub enum ParseError {
    /// Command line arguments are invalid.
    #[display("{_0}")]
    Args(clap::Error),

    /// Quoted argument isn't closed.
    #[display("Unterminated quote")]
    UnterminatedQuote,
}

impl AsError for ParseError {
    fn try_as_error(&self) -> Option<ShellError> {
        match self {
            Self::Args(e) => e.try_as_error(),
            Self::UnterminatedQuote => Some(ShellError::bad_request(self)),
        }
    }
}

/// Splits the provided `line` into whitespace-separated words.
///
/// Single or double quotes group whitespace-containing text into a single
/// word, without any escaping.
fn split(line: &str) -> Result<Vec<String>, ParseError> {
    let mut words = vec![];
    let mut word = String::new();
    let mut in_word = false;
    let mut quote = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => word.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(mem::take(&mut word));
                    in_word = false;
                }
            }
            None => {
                word.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ParseError::UnterminatedQuote);
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

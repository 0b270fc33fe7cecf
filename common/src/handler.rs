//! [`Handler`] abstractions.

use std::future::Future;

/// Asynchronous handler of `Args`.
///
/// Every layer of the application speaks this single trait: commands and
/// queries are [`Handler`]s of a service, and storage operations are
/// [`Handler`]s of a database.
///
/// ```rust
/// use std::convert::Infallible;
///
/// use common::Handler;
///
/// struct Doubler;
///
/// impl Handler<u8> for Doubler {
///     type Ok = u16;
///     type Err = Infallible;
///
///     async fn execute(&self, n: u8) -> Result<u16, Infallible> {
///         Ok(u16::from(n) * 2)
///     }
/// }
/// ```
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}

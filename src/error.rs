use derive_more::Display;
use std::fmt::{self, Debug, Display, Formatter};

/// The errors that can occur while parsing a `multipart/form-data` stream.
///
/// Both kinds are fatal to the parser instance: once one has been returned,
/// every subsequent call on the same parser returns it again.
#[derive(Clone, Display, PartialEq, Eq)]
pub enum Error {
    /// The byte stream violates the `multipart/form-data` grammar at a point
    /// the parser cannot recover from.
    #[display(fmt = "malformed multipart/form-data: {}", _0)]
    MalformedData(String),

    /// The parser was released before the closing boundary was observed.
    #[display(fmt = "unexpected end of multipart/form-data, no terminator parsed")]
    UnexpectedExit,
}

impl Error {
    pub(crate) fn malformed<M: Into<String>>(msg: M) -> Error {
        Error::MalformedData(msg.into())
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

pub trait ResultExt<T> {
    /// Map any error into [`Error::MalformedData`], prefixed with `msg`.
    fn context(self, msg: &str) -> crate::Result<T>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> crate::Result<T> {
        self.map_err(|err| Error::MalformedData(format!("{}: {}", msg, err)))
    }
}

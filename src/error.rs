use std::error;
use std::fmt;
use std::result;

pub type Result<T> = result::Result<T, Error>;

/// An error that occurred during compilation of a pattern set.
///
/// A compile error is local to the matcher being built: the matcher remains
/// uncompiled and can be reconfigured and compiled again. The absence of a
/// match at match time is never an error.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The kind of error that occurred.
#[derive(Clone, Debug)]
pub enum ErrorKind {
    /// An error that occurred while parsing a regular expression. Note that
    /// this error may be printed over multiple lines, and is generally
    /// intended to be end user readable on its own.
    Syntax(String),
    /// An error that occurred because an unsupported regex feature was used.
    /// The message string describes which unsupported feature was used.
    Unsupported(String),
    /// An error that occurred while registering a multi-pattern set, such as
    /// supplying the reserved pattern index 0.
    Set(String),
}

impl Error {
    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn syntax(err: regex_syntax::Error) -> Error {
        Error { kind: ErrorKind::Syntax(err.to_string()) }
    }

    pub(crate) fn unsupported(msg: &str) -> Error {
        Error { kind: ErrorKind::Unsupported(msg.to_string()) }
    }

    pub(crate) fn set(msg: String) -> Error {
        Error { kind: ErrorKind::Set(msg) }
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        match self.kind {
            ErrorKind::Syntax(_) => "syntax error",
            ErrorKind::Unsupported(_) => "unsupported syntax",
            ErrorKind::Set(_) => "invalid pattern set",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::Syntax(ref msg) => write!(f, "{}", msg),
            ErrorKind::Unsupported(ref msg) => write!(f, "{}", msg),
            ErrorKind::Set(ref msg) => write!(f, "{}", msg),
        }
    }
}

//!
//! Common Errors.
//!
use std::fmt;

pub type Result<T> = std::result::Result<T, VolleyError>;

#[derive(Debug)]
pub enum VolleyError {
    /// The selected provider cannot perform the operation, or the fallback
    /// path is disabled/unavailable.
    UnsupportedOperation(String),
    /// The query trace did not contain the expected `FROM [..].[..] AS [..]`
    /// fragment.
    MalformedQueryTrace(String),
    /// A column referenced by an update specification does not exist in the
    /// mapping, or a required key column is missing.
    MissingField(String),
    /// A mapping declares the same object property twice.
    RedundantField(String),
    /// Any failure raised by SQL execution or the bulk-load channel.
    DatabaseError(String),
    /// The configured execute timeout elapsed.
    ExecuteTimeout(String),
    ConfigError(String),
    TokioError(String),
}

impl fmt::Display for VolleyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            VolleyError::UnsupportedOperation(ref err) => err.fmt(f),
            VolleyError::MalformedQueryTrace(ref err) => err.fmt(f),
            VolleyError::MissingField(ref err) => err.fmt(f),
            VolleyError::RedundantField(ref err) => err.fmt(f),
            VolleyError::DatabaseError(ref err) => err.fmt(f),
            VolleyError::ExecuteTimeout(ref err) => err.fmt(f),
            VolleyError::ConfigError(ref err) => err.fmt(f),
            VolleyError::TokioError(ref err) => err.fmt(f),
        }
    }
}

impl std::error::Error for VolleyError {}

impl From<tiberius::error::Error> for VolleyError {
    fn from(err: tiberius::error::Error) -> Self {
        VolleyError::DatabaseError(err.to_string())
    }
}

impl From<r2d2::Error> for VolleyError {
    fn from(err: r2d2::Error) -> Self {
        VolleyError::DatabaseError(err.to_string())
    }
}

impl From<std::io::Error> for VolleyError {
    fn from(err: std::io::Error) -> Self {
        VolleyError::TokioError(err.to_string())
    }
}

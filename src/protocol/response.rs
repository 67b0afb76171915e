//! Response lines.
//!
//! Every reply is one JSON object on one line:
//! `{"ok":true,"result":...}` or
//! `{"ok":false,"error":{"kind":"...","message":"..."}}`.

use serde::Serialize;

use crate::game::ErrorKind;

/// Error classes reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Precondition,
    InvalidReference,
    Unavailable,
    /// The command line itself could not be understood.
    Protocol,
}

impl From<ErrorKind> for ResponseKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Precondition => ResponseKind::Precondition,
            ErrorKind::InvalidReference => ResponseKind::InvalidReference,
            ErrorKind::Unavailable => ResponseKind::Unavailable,
        }
    }
}

#[derive(Serialize)]
struct Success<'a, T: Serialize> {
    ok: bool,
    result: &'a T,
}

#[derive(Serialize)]
struct Failure<'a> {
    ok: bool,
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: ResponseKind,
    message: &'a str,
}

/// Encodes a successful reply.
pub fn success<T: Serialize>(result: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Success { ok: true, result })
}

/// Encodes a failed reply.
pub fn failure(kind: ResponseKind, message: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Failure {
        ok: false,
        error: ErrorBody { kind, message },
    })
}

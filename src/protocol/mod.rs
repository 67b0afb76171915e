//! Line protocol handling.
//!
//! This module implements the command parser for the main loop and the
//! JSON encoding of replies. One command per input line, one JSON object
//! per output line.

pub mod parser;
pub mod response;

pub use parser::{parse_command, Command, ParseError};
pub use response::{failure, success, ResponseKind};

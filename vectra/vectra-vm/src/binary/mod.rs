//! VBC image decoding. The cursor and readers fail with `BinaryReadError`; the section
//! parser adds container-level checks and reports `LoadError`.

pub mod cursor;
pub mod reader;
pub mod sections;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, BinaryReadError>;

/// Low-level read failure, located by byte offset.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BinaryReadError {
    #[error("unexpected EOF at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },
}

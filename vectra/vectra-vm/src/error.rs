//! Crate-level error types for vectra-vm.

use thiserror::Error;

use crate::model::PoolIndex;

/// A module that could not be loaded. Always fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid VBC magic number: expected \"VBC\", found {found:02X?}")]
    BadMagic { found: Vec<u8> },

    #[error("unknown constant kind 0x{tag:02X} at offset {offset}")]
    UnknownConstantKind { tag: u8, offset: usize },

    #[error(transparent)]
    Binary(#[from] crate::binary::BinaryReadError),

    #[error("failed to read module stream")]
    Io(#[from] std::io::Error),
}

/// Execution-time failure. Every variant except `UnhandledAbort` signals an invalid or
/// version-mismatched module; none are retried.
#[derive(Debug, Error)]
pub enum Trap {
    #[error("unknown opcode 0x{opcode:02X} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },

    #[error("no method body for pool index {pool_index}")]
    MissingMethodBody { pool_index: PoolIndex },

    #[error("no method constant ending with {suffix:?} in module")]
    MissingEntryPoint { suffix: String },

    #[error("type mismatch ({context}): expected {expected}, found {found}")]
    TypeMismatch {
        context: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("array index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("constant pool index {index} is out of range for pool of {len}")]
    ConstantOutOfRange { index: PoolIndex, len: usize },

    #[error("local slot {index} is out of range for frame of {len} slots")]
    LocalOutOfRange { index: u16, len: usize },

    #[error("operand stack underflow in {opcode} at offset {offset}")]
    StackUnderflow { opcode: &'static str, offset: usize },

    #[error("truncated operand for {opcode} at offset {offset}")]
    TruncatedOperand { opcode: &'static str, offset: usize },

    #[error("LEAVE_ATTEMPT at offset {offset} with no active attempt handler")]
    HandlerStackEmpty { offset: usize },

    #[error("unknown native function id {id}")]
    UnknownNative { id: u16 },

    #[error("native {name} expects {expected} argument(s), got {found}")]
    NativeArity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid number input: {input:?}")]
    InvalidNumber { input: String },

    #[error("call depth limit of {limit} exceeded")]
    CallDepthExceeded { limit: usize },

    #[error("unhandled abort: {value}")]
    UnhandledAbort { value: String },

    #[error("native I/O failed")]
    Io(#[from] std::io::Error),
}

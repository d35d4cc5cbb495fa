//! vectra-vm: loader and stack interpreter for VBC bytecode modules.
//!
//! A module is loaded once into an immutable `Module`, then run by an `Interpreter` that
//! owns all mutable execution state. Host I/O goes through `NativeDispatch`.

pub mod binary;
pub mod config;
pub mod error;
pub mod host;
pub mod model;
pub mod vm;

use std::io::Read;

pub use config::VmConfig;
pub use error::{LoadError, Trap};
pub use host::{ConsoleNatives, NativeDispatch, NativeFunction};
pub use model::{ConstantEntry, ConstantKind, MethodBody, Module, PoolIndex};
pub use vm::{Completion, Interpreter, Value};

/// Parse a VBC image into a Module. Bytes after the last section are ignored.
pub fn load(bytes: &[u8]) -> Result<Module, LoadError> {
    let module = crate::binary::sections::parse_module_from_bytes(bytes)?;
    Ok(module)
}

/// Read a whole VBC stream and parse it. Stream failures surface as `LoadError::Io`.
pub fn load_from_reader<R: Read>(mut reader: R) -> Result<Module, LoadError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    load(&bytes)
}

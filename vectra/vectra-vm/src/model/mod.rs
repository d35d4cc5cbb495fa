//! Public model surface: constant pool entries and the loaded module.

pub mod constants;
pub mod module;

pub use constants::{ConstantEntry, ConstantKind, PoolIndex};
pub use module::{MethodBody, MethodDefinition, Module, TypeDefinition};

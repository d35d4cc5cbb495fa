//! Execution engine: values, heap cells, operand stack, frames and the interpreter loop.

pub mod frames;
pub mod heap;
pub mod instructions;
pub mod interpreter;
pub mod stack;
pub mod value;

pub use heap::{Array, ArrayRef, Object, ObjectRef};
pub use instructions::Opcode;
pub use interpreter::{Completion, Interpreter};
pub use value::Value;

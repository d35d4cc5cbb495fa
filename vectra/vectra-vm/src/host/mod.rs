//! Host boundary: native functions reachable through `CALL_NATIVE`.

pub mod console;

pub use console::ConsoleNatives;

use std::fmt;

use crate::error::Trap;
use crate::vm::value::Value;

/// Native function ids as encoded in `CALL_NATIVE` operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum NativeFunction {
    Print = 0,
    PrintLine = 1,
    Read = 2,
    ReadLine = 3,
    ReadInt = 4,
}

impl NativeFunction {
    pub fn from_id(id: u16) -> Option<Self> {
        Some(match id {
            0 => NativeFunction::Print,
            1 => NativeFunction::PrintLine,
            2 => NativeFunction::Read,
            3 => NativeFunction::ReadLine,
            4 => NativeFunction::ReadInt,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            NativeFunction::Print => "Print",
            NativeFunction::PrintLine => "PrintLine",
            NativeFunction::Read => "Read",
            NativeFunction::ReadLine => "ReadLine",
            NativeFunction::ReadInt => "ReadInt",
        }
    }

    /// Exact argument count the function accepts.
    pub fn arity(self) -> usize {
        match self {
            NativeFunction::Print | NativeFunction::PrintLine => 1,
            NativeFunction::Read | NativeFunction::ReadLine | NativeFunction::ReadInt => 0,
        }
    }

    pub fn check_arity(self, args: &[Value]) -> Result<(), Trap> {
        if args.len() != self.arity() {
            return Err(Trap::NativeArity {
                name: self.name(),
                expected: self.arity(),
                found: args.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host-provided native functions. Calls are synchronous and may block on host I/O.
pub trait NativeDispatch {
    /// Invoke native `id` with arguments in left-to-right order.
    /// Unknown ids fail with `Trap::UnknownNative`.
    fn invoke(&mut self, id: u16, args: &[Value]) -> Result<Value, Trap>;
}

impl<T: NativeDispatch + ?Sized> NativeDispatch for &mut T {
    fn invoke(&mut self, id: u16, args: &[Value]) -> Result<Value, Trap> {
        (**self).invoke(id, args)
    }
}

impl<T: NativeDispatch + ?Sized> NativeDispatch for Box<T> {
    fn invoke(&mut self, id: u16, args: &[Value]) -> Result<Value, Trap> {
        (**self).invoke(id, args)
    }
}

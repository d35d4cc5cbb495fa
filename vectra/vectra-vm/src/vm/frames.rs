//! Call frame: one activation with its locals, operand stack and instruction pointer.

use crate::error::Trap;
use crate::vm::instructions::{Opcode, OPERAND_WIDTH};
use crate::vm::stack::ValueStack;
use crate::vm::value::Value;

/// Identity of one invocation. Unique for the lifetime of an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Static sizing pass: highest local index referenced by LOAD_LOCAL/STORE_LOCAL, plus one.
/// Code that references no locals still gets one slot. Never executes anything.
/// A trailing instruction with truncated operands is left for the interpreter to report.
pub fn scan_local_slots(code: &[u8]) -> Result<usize, Trap> {
    let mut slots = 1usize;
    let mut i = 0usize;
    while i < code.len() {
        let op = Opcode::from_byte(code[i]).ok_or(Trap::UnknownOpcode { opcode: code[i], offset: i })?;
        if matches!(op, Opcode::LoadLocal | Opcode::StoreLocal) {
            if let Some(b) = code.get(i + 1..i + 1 + OPERAND_WIDTH) {
                let index = u16::from_le_bytes([b[0], b[1]]) as usize;
                slots = slots.max(index + 1);
            }
        }
        i += op.encoded_len();
    }
    Ok(slots)
}

#[derive(Debug)]
pub struct CallFrame<'a> {
    pub id: FrameId,
    code: &'a [u8],
    ip: usize,
    /// Offset of the opcode currently executing, for diagnostics.
    op_offset: usize,
    locals: Vec<Value>,
    pub stack: ValueStack,
}

impl<'a> CallFrame<'a> {
    /// Build a frame for `code`. Locals are sized to `max(param_count, scanned slots)`, all
    /// Null, then the first `args.len()` slots are bound in order; surplus args are dropped.
    pub fn new(id: FrameId, code: &'a [u8], param_count: usize, args: Vec<Value>) -> Result<Self, Trap> {
        let size = param_count.max(scan_local_slots(code)?);
        let mut locals = vec![Value::NULL; size];
        for (slot, arg) in locals.iter_mut().zip(args) {
            *slot = arg;
        }
        Ok(Self {
            id,
            code,
            ip: 0,
            op_offset: 0,
            locals,
            stack: ValueStack::new(),
        })
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn op_offset(&self) -> usize {
        self.op_offset
    }

    pub fn locals(&self) -> &[Value] {
        &self.locals
    }

    /// Fetch and decode the next opcode. `None` once the instruction pointer runs past the code.
    pub fn fetch(&mut self) -> Result<Option<Opcode>, Trap> {
        let Some(&byte) = self.code.get(self.ip) else {
            return Ok(None);
        };
        self.op_offset = self.ip;
        self.ip += 1;
        Opcode::from_byte(byte)
            .map(Some)
            .ok_or(Trap::UnknownOpcode { opcode: byte, offset: self.op_offset })
    }

    pub fn read_operand(&mut self, op: Opcode) -> Result<u16, Trap> {
        let b = self
            .code
            .get(self.ip..self.ip + OPERAND_WIDTH)
            .ok_or(Trap::TruncatedOperand { opcode: op.mnemonic(), offset: self.op_offset })?;
        self.ip += OPERAND_WIDTH;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Absolute jump. Targets past the end terminate the frame on the next fetch.
    pub fn jump(&mut self, target: u16) {
        self.ip = target as usize;
    }

    pub fn push(&mut self, v: Value) {
        self.stack.push(v);
    }

    pub fn pop(&mut self, op: Opcode) -> Result<Value, Trap> {
        self.stack.pop().ok_or(self.underflow(op))
    }

    pub fn peek(&self, op: Opcode) -> Result<&Value, Trap> {
        self.stack.peek().ok_or(self.underflow(op))
    }

    /// Pop `count` call arguments, returned in left-to-right order.
    pub fn pop_args(&mut self, op: Opcode, count: u16) -> Result<Vec<Value>, Trap> {
        let underflow = self.underflow(op);
        self.stack.pop_n(count as usize).ok_or(underflow)
    }

    pub fn local(&self, index: u16) -> Result<&Value, Trap> {
        self.locals
            .get(index as usize)
            .ok_or(Trap::LocalOutOfRange { index, len: self.locals.len() })
    }

    pub fn set_local(&mut self, index: u16, v: Value) -> Result<(), Trap> {
        let len = self.locals.len();
        let slot = self
            .locals
            .get_mut(index as usize)
            .ok_or(Trap::LocalOutOfRange { index, len })?;
        *slot = v;
        Ok(())
    }

    fn underflow(&self, op: Opcode) -> Trap {
        Trap::StackUnderflow { opcode: op.mnemonic(), offset: self.op_offset }
    }
}

//! Operand stack for one call frame.

use crate::vm::value::Value;

#[derive(Debug, Default)]
pub struct ValueStack {
    stack: Vec<Value>,
}

impl ValueStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn push(&mut self, v: Value) {
        self.stack.push(v);
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.stack.pop()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.stack.last()
    }

    /// Pop `n` values, returned in push order (deepest first).
    pub fn pop_n(&mut self, n: usize) -> Option<Vec<Value>> {
        let split = self.stack.len().checked_sub(n)?;
        Some(self.stack.split_off(split))
    }
}

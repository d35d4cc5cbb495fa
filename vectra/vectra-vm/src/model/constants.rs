//! Constant pool entries: named/typed symbols and literals addressed by dense pool index.

use std::fmt;

/// Dense zero-based index into a module's constant pool.
pub type PoolIndex = u16;

/// Kind tag of a constant pool entry, as encoded in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConstantKind {
    Type = 0x01,
    Constructor = 0x02,
    Method = 0x03,
    Field = 0x04,
    Property = 0x05,
    String = 0x06,
    Number = 0x07,
}

impl ConstantKind {
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0x01 => ConstantKind::Type,
            0x02 => ConstantKind::Constructor,
            0x03 => ConstantKind::Method,
            0x04 => ConstantKind::Field,
            0x05 => ConstantKind::Property,
            0x06 => ConstantKind::String,
            0x07 => ConstantKind::Number,
            _ => return None,
        })
    }
}

impl fmt::Display for ConstantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One constant pool entry.
///
/// `numeric_value` is `Some` exactly when `kind == Number`; for those entries `name` holds
/// the display rendering of the value and is never used for arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantEntry {
    pub index: PoolIndex,
    pub kind: ConstantKind,
    pub name: String,
    pub numeric_value: Option<f64>,
}

impl ConstantEntry {
    /// Symbol or string literal entry (every kind except Number).
    pub fn named(index: PoolIndex, kind: ConstantKind, name: impl Into<String>) -> Self {
        debug_assert!(kind != ConstantKind::Number);
        Self { index, kind, name: name.into(), numeric_value: None }
    }

    /// Number literal entry; the name is derived from the value.
    pub fn number(index: PoolIndex, value: f64) -> Self {
        Self {
            index,
            kind: ConstantKind::Number,
            name: crate::vm::value::render_number(value),
            numeric_value: Some(value),
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ConstantKind::Method | ConstantKind::Constructor)
    }
}

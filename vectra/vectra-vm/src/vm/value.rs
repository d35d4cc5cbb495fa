//! Tagged runtime value flowing through the operand stack, locals and object fields.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::error::Trap;
use crate::model::PoolIndex;
use crate::vm::heap::{Array, ArrayRef, Object, ObjectRef};

/// Runtime value. Objects and arrays are references: cloning a `Value` shares the target.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(ObjectRef),
    Array(ArrayRef),
}

impl Value {
    pub const NULL: Value = Value::Null;
    pub const TRUE: Value = Value::Bool(true);
    pub const FALSE: Value = Value::Bool(false);

    pub fn from_bool(b: bool) -> Self {
        if b { Self::TRUE } else { Self::FALSE }
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn new_object(type_pool_index: PoolIndex) -> Self {
        Value::Object(Rc::new(RefCell::new(Object::new(type_pool_index))))
    }

    pub fn new_array(element_type_pool_index: PoolIndex, size: usize) -> Self {
        Value::Array(Rc::new(RefCell::new(Array::new(element_type_pool_index, size))))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Object(_) => "Object",
            Value::Array(_) => "Array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Truthiness used by conditional jumps and NOT: only `Bool(true)` is true.
    pub fn as_boolean(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    pub fn as_number(&self, context: &'static str) -> Result<f64, Trap> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(other.mismatch(context, "Number")),
        }
    }

    pub fn as_str(&self, context: &'static str) -> Result<&str, Trap> {
        match self {
            Value::String(s) => Ok(&s[..]),
            other => Err(other.mismatch(context, "String")),
        }
    }

    pub fn as_object(&self, context: &'static str) -> Result<&ObjectRef, Trap> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(other.mismatch(context, "Object")),
        }
    }

    pub fn as_array(&self, context: &'static str) -> Result<&ArrayRef, Trap> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(other.mismatch(context, "Array")),
        }
    }

    fn mismatch(&self, context: &'static str, expected: &'static str) -> Trap {
        Trap::TypeMismatch { context, expected, found: self.kind_name() }
    }
}

/// Ordering used by CLT/CLE/CGT/CGE: ordinal comparison of the rendered forms when either
/// side is a string, otherwise numeric (`None` when either side is NaN).
pub fn compare(a: &Value, b: &Value, context: &'static str) -> Result<Option<Ordering>, Trap> {
    if a.is_string() || b.is_string() {
        return Ok(Some(a.to_string().cmp(&b.to_string())));
    }
    Ok(a.as_number(context)?.partial_cmp(&b.as_number(context)?))
}

/// Display rendering of a number: shortest round-trip digits, integral values without a
/// fraction, `NaN`/`Infinity`/`-Infinity`. Decimal exponents outside `-5..15` switch to
/// exponent form with a signed, at least two-digit exponent (`1E+21`, `1.5E-07`).
pub fn render_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let sci = format!("{n:e}");
    match sci.split_once('e').map(|(m, e)| (m, e.parse::<i32>())) {
        Some((mantissa, Ok(exp))) if !(-5..15).contains(&exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}E{sign}{:02}", exp.unsigned_abs())
        }
        _ => format!("{n}"),
    }
}

impl PartialEq for Value {
    /// Kind-and-value equality: references compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&render_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Object(o) => write!(f, "object#{}", o.borrow().type_pool_index()),
            Value::Array(a) => {
                let a = a.borrow();
                write!(f, "array#{}[{}]", a.element_type_pool_index(), a.len())
            }
        }
    }
}

// Objects may reference themselves through fields, so Debug never descends into them.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n:?})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Object(o) => write!(f, "Object({:p}, type={})", Rc::as_ptr(o), o.borrow().type_pool_index()),
            Value::Array(a) => write!(f, "Array({:p}, len={})", Rc::as_ptr(a), a.borrow().len()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::from_bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

//! Heap reference types. Shared ownership through `Rc`; storage is freed when the last
//! `Value` referencing it is dropped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Trap;
use crate::model::PoolIndex;
use crate::vm::value::Value;

pub type ObjectRef = Rc<RefCell<Object>>;
pub type ArrayRef = Rc<RefCell<Array>>;

/// Instance created by `NEW_OBJ`. Fields are keyed by their Field pool index.
#[derive(Debug, Default)]
pub struct Object {
    type_pool_index: PoolIndex,
    fields: HashMap<PoolIndex, Value>,
}

impl Object {
    pub fn new(type_pool_index: PoolIndex) -> Self {
        Self { type_pool_index, fields: HashMap::new() }
    }

    pub fn type_pool_index(&self) -> PoolIndex {
        self.type_pool_index
    }

    /// Unset fields read as Null.
    pub fn get_field(&self, field: PoolIndex) -> Value {
        self.fields.get(&field).cloned().unwrap_or(Value::NULL)
    }

    pub fn set_field(&mut self, field: PoolIndex, value: Value) {
        self.fields.insert(field, value);
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Fixed-size array; every element starts as Null.
#[derive(Debug)]
pub struct Array {
    element_type_pool_index: PoolIndex,
    elements: Box<[Value]>,
}

impl Array {
    pub fn new(element_type_pool_index: PoolIndex, size: usize) -> Self {
        Self {
            element_type_pool_index,
            elements: vec![Value::NULL; size].into_boxed_slice(),
        }
    }

    pub fn element_type_pool_index(&self) -> PoolIndex {
        self.element_type_pool_index
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Value, Trap> {
        self.elements
            .get(index)
            .cloned()
            .ok_or(Trap::IndexOutOfRange { index, len: self.elements.len() })
    }

    pub fn set(&mut self, index: usize, value: Value) -> Result<(), Trap> {
        let len = self.elements.len();
        let slot = self
            .elements
            .get_mut(index)
            .ok_or(Trap::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }
}

//! The loaded program: version, imports, constant pool, type table, and method bodies.

use super::constants::{ConstantEntry, ConstantKind, PoolIndex};

/// Declared method shape inside a type. Metadata only; calls resolve through method bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MethodDefinition {
    pub pool_index: PoolIndex,
    pub parameter_count: u16,
}

/// Declared type with its methods.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeDefinition {
    pub pool_index: PoolIndex,
    pub methods: Vec<MethodDefinition>,
}

/// Bytecode implementing the Method/Constructor constant at `callable_pool_index`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodBody {
    pub callable_pool_index: PoolIndex,
    /// Declared parameter/local count hint; frames grow past it when the code needs more.
    pub local_slot_count: u16,
    pub bytecode: Vec<u8>,
}

impl MethodBody {
    pub fn new(callable_pool_index: PoolIndex, local_slot_count: u16, bytecode: Vec<u8>) -> Self {
        Self { callable_pool_index, local_slot_count, bytecode }
    }
}

/// A fully parsed VBC module. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub version_major: u8,
    pub version_minor: u8,
    pub imports: Vec<String>,
    pub constants: Vec<ConstantEntry>,
    pub types: Vec<TypeDefinition>,
    pub method_bodies: Vec<MethodBody>,
}

impl Module {
    pub fn constant(&self, index: PoolIndex) -> Option<&ConstantEntry> {
        self.constants.get(index as usize)
    }

    /// First body implementing the callable at `pool_index`.
    pub fn body_for(&self, pool_index: PoolIndex) -> Option<&MethodBody> {
        self.method_bodies
            .iter()
            .find(|b| b.callable_pool_index == pool_index)
    }

    /// First Method constant whose name ends with `suffix`.
    pub fn find_method_by_suffix(&self, suffix: &str) -> Option<&ConstantEntry> {
        self.constants
            .iter()
            .find(|c| c.kind == ConstantKind::Method && c.name.ends_with(suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Module {
        Module {
            version_major: 1,
            constants: vec![
                ConstantEntry::named(0, ConstantKind::Type, "Program"),
                ConstantEntry::named(1, ConstantKind::Method, "Program::Helper()"),
                ConstantEntry::named(2, ConstantKind::Method, "Program::Main()"),
            ],
            method_bodies: vec![
                MethodBody::new(2, 0, vec![0x42]),
                MethodBody::new(1, 0, vec![0x21, 0x42]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn finds_entry_by_suffix() {
        let m = sample();
        let e = m.find_method_by_suffix("::Main()").unwrap();
        assert_eq!(e.index, 2);
        assert!(m.find_method_by_suffix("::Nope()").is_none());
    }

    #[test]
    fn body_lookup_by_callable_index() {
        let m = sample();
        assert_eq!(m.body_for(1).unwrap().bytecode, vec![0x21, 0x42]);
        assert!(m.body_for(0).is_none());
    }
}

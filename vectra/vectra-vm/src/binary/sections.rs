//! VBC container layout: magic, version, then the four counted sections in fixed order
//! (imports, constants, types, method bodies). All integers are little-endian.

use std::fmt;

use tracing::debug;

use super::{
    cursor::Cursor,
    reader::{read_len_prefixed_bytes, read_string, read_vec},
};
use crate::error::LoadError;
use crate::model::{
    ConstantEntry, ConstantKind, MethodBody, MethodDefinition, Module, TypeDefinition,
};

/// Magic bytes at the start of every container.
pub const MAGIC: [u8; 3] = *b"VBC";

pub type LResult<T> = core::result::Result<T, LoadError>;

/// Sections of the container, in the order they appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Imports,
    Constants,
    Types,
    Bodies,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Imports => "imports",
            Section::Constants => "constants",
            Section::Types => "types",
            Section::Bodies => "bodies",
        })
    }
}

/* ---------- Header ---------- */

/// Read and check the 3-byte magic. A stream shorter than the magic is reported as a bad
/// magic rather than an EOF so both cases share one failure.
pub fn read_magic(cur: &mut Cursor) -> LResult<()> {
    let n = cur.remaining().min(MAGIC.len());
    let found = cur.read_bytes(n)?;
    if found != MAGIC {
        return Err(LoadError::BadMagic { found: found.to_vec() });
    }
    Ok(())
}

/* ---------- Section payloads ---------- */

fn read_imports(cur: &mut Cursor) -> LResult<Vec<String>> {
    Ok(read_vec(cur, |c, _| read_string(c))?)
}

fn read_constant(cur: &mut Cursor, index: u16) -> LResult<ConstantEntry> {
    let tag_offset = cur.offset();
    let tag = cur.read_u8()?;
    let kind = ConstantKind::from_byte(tag).ok_or(LoadError::UnknownConstantKind {
        tag,
        offset: tag_offset,
    })?;
    if kind == ConstantKind::Number {
        let value = cur.read_f64_le()?;
        return Ok(ConstantEntry::number(index, value));
    }
    let name = read_string(cur)?;
    Ok(ConstantEntry::named(index, kind, name))
}

fn read_constants(cur: &mut Cursor) -> LResult<Vec<ConstantEntry>> {
    // Index is the position in the sequence; the container carries no index field.
    let count = cur.read_u16_le()?;
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        out.push(read_constant(cur, i)?);
    }
    Ok(out)
}

fn read_types(cur: &mut Cursor) -> LResult<Vec<TypeDefinition>> {
    Ok(read_vec(cur, |c, _| {
        let pool_index = c.read_u16_le()?;
        let methods = read_vec(c, |c, _| {
            let pool_index = c.read_u16_le()?;
            let parameter_count = c.read_u16_le()?;
            Ok(MethodDefinition { pool_index, parameter_count })
        })?;
        Ok(TypeDefinition { pool_index, methods })
    })?)
}

fn read_bodies(cur: &mut Cursor) -> LResult<Vec<MethodBody>> {
    Ok(read_vec(cur, |c, _| {
        let callable_pool_index = c.read_u16_le()?;
        let local_slot_count = c.read_u16_le()?;
        let bytecode = read_len_prefixed_bytes(c)?.to_vec();
        Ok(MethodBody::new(callable_pool_index, local_slot_count, bytecode))
    })?)
}

/* ---------- Top-level parser ---------- */

/// Parse a complete VBC container. Bytecode is copied verbatim and not inspected.
/// Bytes after the bodies section are ignored.
pub fn parse_module_from_bytes(bytes: &[u8]) -> LResult<Module> {
    let mut cur = Cursor::new(bytes);
    read_magic(&mut cur)?;
    let version_major = cur.read_u8()?;
    let version_minor = cur.read_u8()?;

    let imports = read_imports(&mut cur)?;
    debug!(section = %Section::Imports, count = imports.len(), "section read");
    let constants = read_constants(&mut cur)?;
    debug!(section = %Section::Constants, count = constants.len(), "section read");
    let types = read_types(&mut cur)?;
    debug!(section = %Section::Types, count = types.len(), "section read");
    let method_bodies = read_bodies(&mut cur)?;
    debug!(section = %Section::Bodies, count = method_bodies.len(), "section read");

    if !cur.is_eof() {
        debug!(trailing = cur.remaining(), "ignoring trailing bytes after bodies section");
    }

    Ok(Module {
        version_major,
        version_minor,
        imports,
        constants,
        types,
        method_bodies,
    })
}

/* ---------- Tests ---------- */

//! Counted encodings shared by every section: u16 length-prefixed byte strings and u16
//! element counts.

use super::{cursor::Cursor, BinaryReadError, Result};

pub fn read_len_prefixed_bytes<'a>(cur: &mut Cursor<'a>) -> Result<&'a [u8]> {
    let len = cur.read_u16_le()?;
    cur.read_bytes(len as usize)
}

/// UTF-8 name or literal. Invalid UTF-8 is reported at the offset of the length prefix.
pub fn read_string(cur: &mut Cursor) -> Result<String> {
    let at = cur.offset();
    let bytes = read_len_prefixed_bytes(cur)?;
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_owned()),
        Err(_) => Err(BinaryReadError::InvalidUtf8 { offset: at }),
    }
}

/// A u16 count followed by that many elements. `elem` receives the element's position.
pub fn read_vec<T, F>(cur: &mut Cursor, mut elem: F) -> Result<Vec<T>>
where
    F: FnMut(&mut Cursor, u16) -> Result<T>,
{
    let count = cur.read_u16_le()?;
    (0..count).map(|i| elem(cur, i)).collect()
}

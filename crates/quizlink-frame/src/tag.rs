//! Wire tags.
//!
//! Tags 0-6 are defined. Any other tag byte decodes to
//! [`Value::Unknown`](crate::Value::Unknown) with its content untouched.

/// 32-bit signed integer, big-endian two's complement.
pub const INT32: u8 = 0;

/// UTF-8 text.
pub const STRING: u8 = 1;

/// Opaque bytes.
pub const BYTE_BLOB: u8 = 2;

/// Container of back-to-back encoded values.
pub const SEQUENCE: u8 = 3;

/// Floating point number carried as decimal text.
pub const DOUBLE: u8 = 4;

/// Empty value, no content.
pub const NULL: u8 = 5;

/// 32-bit unsigned status code, big-endian.
pub const RESULT_CODE: u8 = 6;

/// Returns a human-readable name for a tag.
pub fn tag_name(tag: u8) -> &'static str {
    match tag {
        INT32 => "INT32",
        STRING => "STRING",
        BYTE_BLOB => "BYTE_BLOB",
        SEQUENCE => "SEQUENCE",
        DOUBLE => "DOUBLE",
        NULL => "NULL",
        RESULT_CODE => "RESULT_CODE",
        _ => "UNKNOWN",
    }
}

/// Fixed content width for scalar tags, `None` for variable-width tags.
pub fn fixed_width(tag: u8) -> Option<usize> {
    match tag {
        INT32 | RESULT_CODE => Some(4),
        NULL => Some(0),
        _ => None,
    }
}

//! Tag-length-value encoding and exact-length stream framing.
//!
//! Every value on the wire is framed with:
//! - A 1-byte tag naming the value kind
//! - A 2-byte big-endian content length
//! - Exactly that many content bytes
//!
//! Sequences nest: their content is a back-to-back run of complete
//! encoded values. No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod tag;
pub mod value;
pub mod writer;

pub use codec::{
    decode, decode_all, decode_frame, encode_value, Frame, FrameConfig, HEADER_SIZE,
    MAX_CONTENT_LEN, MAX_NESTING_DEPTH, READ_CHUNK_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::{read_exact, FrameReader};
pub use tag::{BYTE_BLOB, DOUBLE, INT32, NULL, RESULT_CODE, SEQUENCE, STRING};
pub use value::Value;
pub use writer::FrameWriter;

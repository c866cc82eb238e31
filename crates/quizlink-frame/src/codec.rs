use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::tag;
use crate::value::Value;

/// Value header: tag (1) + length (2) = 3 bytes.
pub const HEADER_SIZE: usize = 3;

/// Largest content length the 16-bit length field can carry.
pub const MAX_CONTENT_LEN: usize = u16::MAX as usize;

/// Upper bound on a single receive call.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Default limit on nested sequences accepted by the decoder.
pub const MAX_NESTING_DEPTH: usize = 64;

/// One undecoded value as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The value's tag byte.
    pub tag: u8,
    /// The value's content bytes, without header.
    pub content: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(tag: u8, content: impl Into<Bytes>) -> Self {
        Self {
            tag,
            content: content.into(),
        }
    }

    /// The total wire size of this frame (header + content).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.content.len()
    }

    /// Convert the raw content into a typed value.
    pub fn into_value(self) -> Result<Value> {
        self.into_value_with_depth(MAX_NESTING_DEPTH)
    }

    /// Convert the raw content into a typed value with an explicit
    /// nesting limit.
    pub fn into_value_with_depth(self, max_depth: usize) -> Result<Value> {
        decode_content(self.tag, self.content, 0, max_depth)
    }
}

/// Encode a value into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────────┬─────────────────────────────┐
/// │ Tag (1B) │ Length       │ Content                     │
/// │          │ (2B BE)      │ (Length bytes; for SEQUENCE │
/// │          │              │  back-to-back encodings)    │
/// └──────────┴──────────────┴─────────────────────────────┘
/// ```
///
/// The length field of every header is back-patched once its content is
/// written. On error `dst` is left as it was before the call.
pub fn encode_value(value: &Value, dst: &mut BytesMut) -> Result<()> {
    let start = dst.len();
    let result = encode_into(value, dst, 0);
    if result.is_err() {
        dst.truncate(start);
    }
    result
}

fn encode_into(value: &Value, dst: &mut BytesMut, depth: usize) -> Result<()> {
    let start = dst.len();
    dst.put_u8(value.tag());
    dst.put_u16(0);

    match value {
        Value::Int(v) => dst.put_i32(*v),
        Value::ResultCode(v) => dst.put_u32(*v),
        Value::String(text) => put_content(dst, text.as_bytes())?,
        Value::Bytes(data) => put_content(dst, data)?,
        Value::Double(v) => put_content(dst, format!("{v:?}").as_bytes())?,
        Value::Null => {}
        Value::Sequence(items) => {
            // Mirrors the decoder's limit.
            if depth >= MAX_NESTING_DEPTH {
                return Err(FrameError::NestingTooDeep {
                    max: MAX_NESTING_DEPTH,
                });
            }
            for item in items {
                encode_into(item, dst, depth + 1)?;
            }
        }
        Value::Unknown { content, .. } => put_content(dst, content)?,
    }

    let content_len = dst.len() - start - HEADER_SIZE;
    if content_len > MAX_CONTENT_LEN {
        return Err(FrameError::ContentTooLarge {
            size: content_len,
            max: MAX_CONTENT_LEN,
        });
    }
    dst[start + 1..start + HEADER_SIZE].copy_from_slice(&(content_len as u16).to_be_bytes());
    Ok(())
}

fn put_content(dst: &mut BytesMut, content: &[u8]) -> Result<()> {
    // Checked before copying so an oversized blob is never buffered.
    if content.len() > MAX_CONTENT_LEN {
        return Err(FrameError::ContentTooLarge {
            size: content.len(),
            max: MAX_CONTENT_LEN,
        });
    }
    dst.put_slice(content);
    Ok(())
}

/// Split the first raw frame off `src`.
///
/// Returns the frame and the number of bytes it occupied.
pub fn decode_frame(src: &[u8]) -> Result<(Frame, usize)> {
    let src = Bytes::copy_from_slice(src);
    let (tag, content, next) = split_frame(&src, 0)?;
    Ok((Frame { tag, content }, next))
}

/// Decode exactly one value from `src`.
pub fn decode(src: &[u8]) -> Result<Value> {
    let src = Bytes::copy_from_slice(src);
    let (tag, content, next) = split_frame(&src, 0)?;
    if next != src.len() {
        return Err(FrameError::TrailingBytes(src.len() - next));
    }
    decode_content(tag, content, 0, MAX_NESTING_DEPTH)
}

/// Decode zero or more values packed back-to-back.
///
/// This is how a sequence's content is expanded; there is no count
/// prefix, the run ends exactly where `src` ends.
pub fn decode_all(src: &[u8]) -> Result<Vec<Value>> {
    decode_run(&Bytes::copy_from_slice(src), 0, MAX_NESTING_DEPTH)
}

fn split_frame(src: &Bytes, pos: usize) -> Result<(u8, Bytes, usize)> {
    let available = src.len() - pos;
    if available < HEADER_SIZE {
        return Err(FrameError::Truncated {
            needed: HEADER_SIZE,
            available,
        });
    }

    let tag = src[pos];
    let content_len = u16::from_be_bytes([src[pos + 1], src[pos + 2]]) as usize;
    let total = HEADER_SIZE + content_len;
    if available < total {
        return Err(FrameError::Truncated {
            needed: total,
            available,
        });
    }

    let content = src.slice(pos + HEADER_SIZE..pos + total);
    Ok((tag, content, pos + total))
}

fn decode_run(src: &Bytes, depth: usize, max_depth: usize) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    let mut pos = 0;
    while pos < src.len() {
        let (tag, content, next) = split_frame(src, pos)?;
        values.push(decode_content(tag, content, depth, max_depth)?);
        pos = next;
    }
    Ok(values)
}

fn decode_content(tag: u8, content: Bytes, depth: usize, max_depth: usize) -> Result<Value> {
    check_width(tag, &content)?;
    match tag {
        tag::INT32 => Ok(Value::Int((&content[..]).get_i32())),
        tag::RESULT_CODE => Ok(Value::ResultCode((&content[..]).get_u32())),
        tag::STRING => {
            let text = std::str::from_utf8(&content)
                .map_err(|err| FrameError::format(tag, format!("invalid UTF-8: {err}")))?;
            Ok(Value::String(text.to_string()))
        }
        tag::BYTE_BLOB => Ok(Value::Bytes(content)),
        tag::DOUBLE => {
            let text = std::str::from_utf8(&content)
                .map_err(|err| FrameError::format(tag, format!("invalid UTF-8: {err}")))?;
            let number = text
                .trim()
                .parse::<f64>()
                .map_err(|_| FrameError::format(tag, format!("not a number: {text:?}")))?;
            Ok(Value::Double(number))
        }
        tag::NULL => Ok(Value::Null),
        tag::SEQUENCE => {
            if depth >= max_depth {
                return Err(FrameError::NestingTooDeep { max: max_depth });
            }
            decode_run(&content, depth + 1, max_depth).map(Value::Sequence)
        }
        _ => Ok(Value::Unknown { tag, content }),
    }
}

fn check_width(tag: u8, content: &[u8]) -> Result<()> {
    match tag::fixed_width(tag) {
        Some(width) if content.len() != width => Err(FrameError::format(
            tag,
            format!("expected {width} content bytes, got {}", content.len()),
        )),
        _ => Ok(()),
    }
}

/// Configuration for the frame codec and stream framing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Upper bound on a single receive call. Default: 4096.
    pub read_chunk_size: usize,
    /// Maximum content length accepted or sent. Default: 65535.
    pub max_content_len: usize,
    /// Maximum sequence nesting accepted when decoding. Default: 64.
    pub max_nesting_depth: usize,
    /// Read timeout for blocking operations. Default: none.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations. Default: none.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: READ_CHUNK_SIZE,
            max_content_len: MAX_CONTENT_LEN,
            max_nesting_depth: MAX_NESTING_DEPTH,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

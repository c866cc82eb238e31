use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use quizlink_transport::LinkStream;
use tracing::trace;

use crate::codec::{Frame, FrameConfig, HEADER_SIZE, READ_CHUNK_SIZE};
use crate::error::{FrameError, Result};
use crate::value::Value;

/// Read exactly `n` bytes from `stream` (blocking).
///
/// Each receive asks for at most [`READ_CHUNK_SIZE`] bytes. The result is
/// either exactly `n` bytes or an error: a zero-length receive means the
/// peer closed the connection.
pub fn read_exact<R: Read>(stream: &mut R, n: usize) -> Result<Bytes> {
    read_exact_chunked(stream, n, READ_CHUNK_SIZE)
}

fn read_exact_chunked<R: Read>(stream: &mut R, n: usize, chunk_size: usize) -> Result<Bytes> {
    let mut buf = BytesMut::zeroed(n);
    let mut filled = 0usize;
    let chunk_size = chunk_size.max(1);

    while filled < n {
        let end = n.min(filled + chunk_size);
        let read = match stream.read(&mut buf[filled..end]) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        };

        if read == 0 {
            return Err(FrameError::ConnectionClosed);
        }

        filled += read;
    }

    Ok(buf.freeze())
}

/// Reads complete values from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete values.
/// Reads never go past the value being assembled, so nothing is buffered
/// between calls.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read exactly `n` bytes (blocking).
    pub fn read_exact(&mut self, n: usize) -> Result<Bytes> {
        read_exact_chunked(&mut self.inner, n, self.config.read_chunk_size)
    }

    /// Read the next raw frame: the 3-byte header, then its content.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Frame> {
        let header = self.read_exact(HEADER_SIZE)?;
        let tag = header[0];
        let content_len = u16::from_be_bytes([header[1], header[2]]) as usize;

        if content_len > self.config.max_content_len {
            return Err(FrameError::OversizedFrame {
                size: content_len,
                max: self.config.max_content_len,
            });
        }

        let content = self.read_exact(content_len)?;
        trace!(tag, len = content_len, "read frame");
        Ok(Frame { tag, content })
    }

    /// Read the next frame and decode it into a typed value.
    pub fn read_value(&mut self) -> Result<Value> {
        let frame = self.read_frame()?;
        frame.into_value_with_depth(self.config.max_nesting_depth)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<LinkStream> {
    /// Create a frame reader for `LinkStream` and apply read timeout from config.
    pub fn with_config_link(inner: LinkStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: quizlink_transport::TransportError) -> FrameError {
    match err {
        quizlink_transport::TransportError::Io(io)
        | quizlink_transport::TransportError::Accept(io) => FrameError::Io(io),
        quizlink_transport::TransportError::Bind { source, .. }
        | quizlink_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;

    use super::*;
    use crate::codec::encode_value;
    use crate::tag;

    fn wire(values: &[Value]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for value in values {
            encode_value(value, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    #[test]
    fn read_exact_returns_requested_bytes() {
        let mut cursor = Cursor::new(b"abcdef".to_vec());
        assert_eq!(read_exact(&mut cursor, 4).unwrap().as_ref(), b"abcd");
        assert_eq!(read_exact(&mut cursor, 2).unwrap().as_ref(), b"ef");
        assert!(read_exact(&mut cursor, 0).unwrap().is_empty());
    }

    #[test]
    fn read_exact_fails_on_short_stream() {
        let mut cursor = Cursor::new(b"abc".to_vec());
        let err = read_exact(&mut cursor, 4).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn read_exact_bounds_each_receive() {
        let mut recorder = ChunkRecorder {
            remaining: 10_000,
            requests: Vec::new(),
        };
        let data = read_exact(&mut recorder, 10_000).unwrap();
        assert_eq!(data.len(), 10_000);
        assert!(recorder.requests.iter().all(|&n| n <= READ_CHUNK_SIZE));
        assert_eq!(recorder.requests, vec![4096, 4096, 1808]);
    }

    #[test]
    fn read_single_value() {
        let bytes = wire(&[Value::sequence([Value::from("showintro")])]);
        let mut reader = FrameReader::new(Cursor::new(bytes));
        assert_eq!(
            reader.read_value().unwrap(),
            Value::sequence([Value::from("showintro")])
        );
    }

    #[test]
    fn read_multiple_values() {
        let bytes = wire(&[Value::Int(1), Value::from("two"), Value::result_code(3)]);
        let mut reader = FrameReader::new(Cursor::new(bytes));

        assert_eq!(reader.read_value().unwrap(), Value::Int(1));
        assert_eq!(reader.read_value().unwrap(), Value::from("two"));
        assert_eq!(reader.read_value().unwrap(), Value::result_code(3));
        assert!(matches!(
            reader.read_value().unwrap_err(),
            FrameError::ConnectionClosed
        ));
    }

    #[test]
    fn partial_read_handling() {
        let bytes = wire(&[Value::from("slow")]);
        let mut reader = FrameReader::new(ByteByByteReader { bytes, pos: 0 });
        assert_eq!(reader.read_value().unwrap(), Value::from("slow"));
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_content() {
        let partial = vec![tag::STRING, 0x00, 0x10, b'o', b'n', b'l', b'y'];
        let mut reader = FrameReader::new(Cursor::new(partial));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_header() {
        let mut reader = FrameReader::new(Cursor::new(vec![tag::SEQUENCE, 0x00]));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn oversized_frame_in_stream() {
        let bytes = vec![tag::BYTE_BLOB, 0x04, 0x00];
        let cfg = FrameConfig {
            max_content_len: 16,
            ..FrameConfig::default()
        };
        let mut reader = FrameReader::with_config(Cursor::new(bytes), cfg);
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::OversizedFrame { size: 1024, max: 16 }));
        assert!(err.is_transport());
    }

    #[test]
    fn format_error_leaves_stream_aligned() {
        let mut bytes = vec![tag::INT32, 0x00, 0x02, 0x00, 0x01];
        bytes.extend(wire(&[Value::from("next")]));
        let mut reader = FrameReader::new(Cursor::new(bytes));

        assert!(matches!(
            reader.read_value().unwrap_err(),
            FrameError::Format { .. }
        ));
        assert_eq!(reader.read_value().unwrap(), Value::from("next"));
    }

    #[test]
    fn interrupted_read_retries() {
        let bytes = wire(&[Value::Int(8)]);
        let mut reader = FrameReader::new(InterruptedThenData {
            interrupted: false,
            inner: Cursor::new(bytes),
        });
        assert_eq!(reader.read_value().unwrap(), Value::Int(8));
    }

    #[test]
    fn read_error_propagates() {
        let mut reader = FrameReader::new(FailingReader);
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::ConnectionReset));
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_pipe() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        writer.write_value(&Value::from("ping")).unwrap();
        assert_eq!(reader.read_value().unwrap(), Value::from("ping"));
    }

    #[test]
    fn roundtrip_over_link_stream() {
        let listener = quizlink_transport::TcpLink::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr();

        let server = std::thread::spawn(move || {
            let stream = listener.accept().unwrap();
            let mut reader = FrameReader::with_config_link(stream, FrameConfig::default()).unwrap();
            reader.read_value().unwrap()
        });

        let stream = quizlink_transport::TcpLink::connect(addr).unwrap();
        let mut writer = crate::writer::FrameWriter::new(stream);
        let value = Value::sequence([Value::from("showquestion"), Value::Int(-1)]);
        writer.write_value(&value).unwrap();

        assert_eq!(server.join().unwrap(), value);
    }

    struct ChunkRecorder {
        remaining: usize,
        requests: Vec<usize>,
    }

    impl Read for ChunkRecorder {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.requests.push(buf.len());
            let n = buf.len().min(self.remaining);
            buf[..n].fill(0x5A);
            self.remaining -= n;
            Ok(n)
        }
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::ConnectionReset))
        }
    }
}

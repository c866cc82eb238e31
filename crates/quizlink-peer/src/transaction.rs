use std::any::Any;
use std::io::{Read, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};

use quizlink_frame::{FrameError, FrameReader, FrameWriter, Value};
use tracing::{debug, warn};

use crate::command::Request;
use crate::error::Result;
use crate::status::Status;

/// Maps a decoded request to its response.
///
/// This is the only place that knows what commands mean. An `Err` (or a
/// panic) becomes a generic `ResultCode(ERROR)` response; the connection
/// stays usable.
pub trait RequestHandler {
    fn handle(&mut self, request: Request) -> Result<Value>;

    /// Checked by the serving loop after every transaction.
    fn stop_requested(&self) -> bool {
        false
    }
}

/// What happened to one served request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The handler produced the response that was sent.
    Handled { command: String },
    /// A generic error status was sent instead.
    Rejected { reason: String },
}

impl Outcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

/// Send one request and block until its response arrives.
///
/// Any failure fails the whole call; nothing is retried.
pub fn call<R: Read, W: Write>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
    request: &Value,
) -> Result<Value> {
    writer.write_value(request)?;
    Ok(reader.read_value()?)
}

/// Serve exactly one request: read it, dispatch it, write one response.
///
/// Only transport failures are returned as errors. Everything that goes
/// wrong between reading the request and writing the response is answered
/// with `ResultCode(ERROR)`.
pub fn serve_one<R, W, H>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
    handler: &mut H,
) -> Result<Outcome>
where
    R: Read,
    W: Write,
    H: RequestHandler + ?Sized,
{
    let received = receive(reader)?;
    let (response, outcome) = dispatch(received, handler);
    respond(writer, &response, outcome)
}

/// Read one request value.
///
/// The outer error is fatal to the connection. The inner error is a
/// request whose bytes were fully consumed but did not decode, so the
/// stream is still aligned on the next frame.
pub(crate) fn receive<R: Read>(
    reader: &mut FrameReader<R>,
) -> Result<std::result::Result<Value, FrameError>> {
    match reader.read_value() {
        Ok(value) => Ok(Ok(value)),
        Err(
            err @ (FrameError::Format { .. }
            | FrameError::Truncated { .. }
            | FrameError::TrailingBytes(_)
            | FrameError::NestingTooDeep { .. }),
        ) => Ok(Err(err)),
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn dispatch<H: RequestHandler + ?Sized>(
    received: std::result::Result<Value, FrameError>,
    handler: &mut H,
) -> (Value, Outcome) {
    let value = match received {
        Ok(value) => value,
        Err(err) => return reject(format!("undecodable request: {err}")),
    };

    let request = match Request::from_value(value) {
        Ok(request) => request,
        Err(err) => return reject(err.to_string()),
    };

    let command = request.command.clone();
    match catch_unwind(AssertUnwindSafe(|| handler.handle(request))) {
        Ok(Ok(response)) => {
            debug!(command = %command, "handled request");
            (response, Outcome::Handled { command })
        }
        Ok(Err(err)) => reject(format!("{command}: {err}")),
        Err(panic) => reject(format!(
            "{command}: handler panicked: {}",
            panic_message(panic.as_ref())
        )),
    }
}

pub(crate) fn respond<W: Write>(
    writer: &mut FrameWriter<W>,
    response: &Value,
    outcome: Outcome,
) -> Result<Outcome> {
    match writer.write_value(response) {
        Ok(()) => Ok(outcome),
        Err(FrameError::ContentTooLarge { size, max }) => {
            let (fallback, outcome) =
                reject(format!("response content {size} bytes exceeds {max}"));
            writer.write_value(&fallback)?;
            Ok(outcome)
        }
        Err(err) => Err(err.into()),
    }
}

fn reject(reason: String) -> (Value, Outcome) {
    warn!(%reason, "rejected request");
    (Status::ERROR.to_value(), Outcome::Rejected { reason })
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

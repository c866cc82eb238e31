use std::io::{Read, Write};
use std::time::Duration;

use quizlink_frame::{FrameConfig, FrameReader, FrameWriter};
use quizlink_transport::{Link, LinkStream};
use tracing::trace;

use crate::error::{PeerError, Result};
use crate::transaction::{self, Outcome, RequestHandler};

/// Where a connection is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingRequest,
    Dispatching,
    Responding,
    /// Terminal.
    Closed,
}

/// Server side of one display connection.
pub struct Session<S> {
    reader: FrameReader<S>,
    writer: FrameWriter<S>,
    state: SessionState,
    served: u64,
}

impl<S: Read + Write> Session<S> {
    /// Wrap the two halves of one connection.
    pub fn new(reader: FrameReader<S>, writer: FrameWriter<S>) -> Self {
        Self {
            reader,
            writer,
            state: SessionState::Idle,
            served: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Requests answered so far, rejected ones included.
    pub fn served(&self) -> u64 {
        self.served
    }

    /// Serve one request (blocking until it has fully arrived).
    ///
    /// A transport failure moves the session to `Closed`; every later call
    /// fails with [`PeerError::SessionClosed`].
    pub fn serve_one<H: RequestHandler + ?Sized>(&mut self, handler: &mut H) -> Result<Outcome> {
        if self.state == SessionState::Closed {
            return Err(PeerError::SessionClosed);
        }

        self.transition(SessionState::AwaitingRequest);
        let received = match transaction::receive(&mut self.reader) {
            Ok(received) => received,
            Err(err) => {
                self.transition(SessionState::Closed);
                return Err(err);
            }
        };

        self.transition(SessionState::Dispatching);
        let (response, outcome) = transaction::dispatch(received, handler);

        self.transition(SessionState::Responding);
        match transaction::respond(&mut self.writer, &response, outcome) {
            Ok(outcome) => {
                self.served += 1;
                self.transition(SessionState::Idle);
                Ok(outcome)
            }
            Err(err) => {
                self.transition(SessionState::Closed);
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        trace!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }
}

impl<S: Link> Session<S> {
    /// True when a request (or the peer's hang-up) is waiting.
    pub fn poll_readable(&self, timeout: Duration) -> Result<bool> {
        if self.state == SessionState::Closed {
            return Err(PeerError::SessionClosed);
        }
        Ok(self.reader.get_ref().poll_readable(timeout)?)
    }

    /// Shut the connection down. Closing twice is not an error.
    pub fn close(&mut self) -> Result<()> {
        self.transition(SessionState::Closed);
        Ok(self.writer.get_ref().close()?)
    }
}

impl Session<LinkStream> {
    /// Split a connected stream into a session, applying the configured
    /// timeouts.
    pub fn from_stream(stream: LinkStream, config: FrameConfig) -> Result<Self> {
        let reader_stream = stream.try_clone()?;
        let reader = FrameReader::with_config_link(reader_stream, config.clone())?;
        let writer = FrameWriter::with_config_link(stream, config)?;
        Ok(Self::new(reader, writer))
    }
}

impl<S> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("served", &self.served)
            .finish()
    }
}

use quizlink_frame::{FrameConfig, FrameReader, FrameWriter, Value};
use quizlink_transport::{LinkStream, TcpLink};
use tracing::{debug, info};

use crate::command::{Command, Request};
use crate::error::{PeerError, Result};
use crate::payload::{PlayingField, Scoreboard};
use crate::status::Status;
use crate::transaction;

/// Client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Frame limits and socket timeouts for the connection.
    pub frame: FrameConfig,
}

struct Connection {
    reader: FrameReader<LinkStream>,
    writer: FrameWriter<LinkStream>,
}

/// Control-panel side of the display link.
///
/// The client stays connected for the whole game. A transport failure
/// during a call drops the connection; the caller decides whether to
/// [`connect`](DisplayClient::connect) again.
pub struct DisplayClient {
    addr: String,
    config: ClientConfig,
    conn: Option<Connection>,
}

impl DisplayClient {
    /// Create a disconnected client for `addr` (`host:port`).
    pub fn new(addr: impl Into<String>) -> Self {
        Self::with_config(addr, ClientConfig::default())
    }

    pub fn with_config(addr: impl Into<String>, config: ClientConfig) -> Self {
        Self {
            addr: addr.into(),
            config,
            conn: None,
        }
    }

    /// Connect unless already connected.
    pub fn connect(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        let stream = TcpLink::connect(self.addr.as_str())?;
        let reader_stream = stream.try_clone()?;
        let reader = FrameReader::with_config_link(reader_stream, self.config.frame.clone())?;
        let writer = FrameWriter::with_config_link(stream, self.config.frame.clone())?;
        self.conn = Some(Connection { reader, writer });
        info!(addr = %self.addr, "connected to display");
        Ok(())
    }

    /// Shut down and forget the connection. Always leaves the client
    /// disconnected.
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(err) = conn.writer.get_ref().shutdown() {
                debug!(%err, "shutdown on disconnect failed");
            }
            debug!(addr = %self.addr, "disconnected from display");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send one raw request value and return the raw response.
    pub fn call(&mut self, request: &Value) -> Result<Value> {
        let conn = self.conn.as_mut().ok_or(PeerError::NotConnected)?;
        let result = transaction::call(&mut conn.reader, &mut conn.writer, request);
        if let Err(err) = &result {
            if err.is_transport() {
                debug!(%err, "call failed, dropping connection");
                self.disconnect();
            }
        }
        result
    }

    /// Send `Sequence[String(command), params...]` and interpret the status.
    pub fn make_call(&mut self, command: &str, params: Vec<Value>) -> Result<Status> {
        let request = Request::new(command, params).into_value();
        let response = self.call(&request)?;
        Status::from_response(&response)
    }

    /// Send a typed command.
    pub fn send(&mut self, command: &Command) -> Result<Status> {
        let request = command.to_request()?;
        debug!(command = command.name(), "sending command");
        let response = self.call(&request.into_value())?;
        Status::from_response(&response)
    }

    pub fn show_question(&mut self, text: &str, seconds: i32) -> Result<Status> {
        self.send(&Command::ShowQuestion {
            text: text.to_string(),
            seconds,
        })
    }

    pub fn show_intro(&mut self) -> Result<Status> {
        self.send(&Command::ShowIntro)
    }

    pub fn show_thanks(&mut self) -> Result<Status> {
        self.send(&Command::ShowThanks)
    }

    pub fn show_result(&mut self, scoreboard: &Scoreboard) -> Result<Status> {
        self.send(&Command::ShowResult(scoreboard.clone()))
    }

    pub fn show_playing_field(&mut self, field: &PlayingField) -> Result<Status> {
        self.send(&Command::ShowPlayingField(field.clone()))
    }

    /// Tell the display to stop, then disconnect.
    pub fn stop(&mut self) -> Result<Status> {
        let result = self.send(&Command::Stop);
        self.disconnect();
        result
    }
}

impl std::fmt::Debug for DisplayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayClient")
            .field("addr", &self.addr)
            .field("connected", &self.is_connected())
            .finish()
    }
}

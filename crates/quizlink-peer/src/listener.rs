use std::fmt::Display;
use std::net::{SocketAddr, ToSocketAddrs};

use quizlink_frame::FrameConfig;
use quizlink_transport::{LinkStream, TcpLink};
use tracing::info;

use crate::error::Result;
use crate::session::Session;

/// Waits for the control panel to connect.
///
/// A display serves one connection for its whole lifetime: [`accept`]
/// consumes the listener, and the listening socket closes with it.
///
/// [`accept`]: DisplayListener::accept
pub struct DisplayListener {
    link: TcpLink,
    frame_config: FrameConfig,
}

impl DisplayListener {
    /// Bind to a TCP address such as `0.0.0.0:4321`.
    pub fn bind(addr: impl ToSocketAddrs + Display) -> Result<Self> {
        Ok(Self {
            link: TcpLink::bind(addr)?,
            frame_config: FrameConfig::default(),
        })
    }

    /// Override frame limits and timeouts for the accepted session.
    pub fn with_frame_config(mut self, config: FrameConfig) -> Self {
        self.frame_config = config;
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.link.local_addr()
    }

    /// Block until the control panel connects.
    pub fn accept(self) -> Result<Session<LinkStream>> {
        let stream = self.link.accept()?;
        info!(peer = ?stream.peer_addr().ok(), "control panel connected");
        Session::from_stream(stream, self.frame_config)
    }
}

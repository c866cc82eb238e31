//! The display's main loop.
//!
//! Each iteration pumps the frontend, checks the connection without
//! waiting, serves at most one transaction if data is there, and renders.
//! Serving blocks for the length of one transaction: a peer that sends a
//! partial request and then stalls stalls the loop with it.

use std::time::{Duration, Instant};

use quizlink_transport::Link;
use tracing::{debug, info};

use crate::error::Result;
use crate::session::Session;
use crate::transaction::RequestHandler;

/// Frontend verdict after processing its own input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pump {
    Continue,
    Quit,
}

/// Whatever draws the display.
pub trait Frontend<H: ?Sized> {
    /// Process local input (window events, signals).
    fn pump(&mut self) -> Pump {
        Pump::Continue
    }

    /// Make the handler's current state visible.
    fn render(&mut self, handler: &H) -> Result<()>;
}

/// Frontend that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl<H: ?Sized> Frontend<H> for Headless {
    fn render(&mut self, _handler: &H) -> Result<()> {
        Ok(())
    }
}

/// Event loop configuration.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Readiness check timeout. Default: zero (never wait).
    pub poll_timeout: Duration,
    /// Minimum time per iteration. Default: 16 ms.
    pub frame_interval: Option<Duration>,
    /// Pause before shutting the connection down, so the client closes
    /// first. Default: 300 ms.
    pub linger: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::ZERO,
            frame_interval: Some(Duration::from_millis(16)),
            linger: Duration::from_millis(300),
        }
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The handler received `stop`.
    Stopped,
    /// The frontend asked to quit.
    Quit,
    /// The connection failed or the peer went away.
    Disconnected,
}

/// Run until stopped, quit or disconnected, then linger and close the
/// session.
///
/// A frontend error ends the loop the same way and is returned.
pub fn run_loop<S, H, F>(
    session: &mut Session<S>,
    handler: &mut H,
    frontend: &mut F,
    config: &LoopConfig,
) -> Result<LoopExit>
where
    S: Link,
    H: RequestHandler,
    F: Frontend<H>,
{
    let result = drive(session, handler, frontend, config);
    match &result {
        Ok(exit) => info!(?exit, served = session.served(), "display loop finished"),
        Err(err) => info!(%err, "display loop failed"),
    }

    std::thread::sleep(config.linger);
    if let Err(err) = session.close() {
        debug!(%err, "closing session failed");
    }
    result
}

fn drive<S, H, F>(
    session: &mut Session<S>,
    handler: &mut H,
    frontend: &mut F,
    config: &LoopConfig,
) -> Result<LoopExit>
where
    S: Link,
    H: RequestHandler,
    F: Frontend<H>,
{
    loop {
        let started = Instant::now();

        if frontend.pump() == Pump::Quit {
            return Ok(LoopExit::Quit);
        }

        let ready = match session.poll_readable(config.poll_timeout) {
            Ok(ready) => ready,
            Err(err) if err.is_transport() => {
                debug!(%err, "readiness check failed");
                return Ok(LoopExit::Disconnected);
            }
            Err(err) => return Err(err),
        };

        if ready {
            match session.serve_one(handler) {
                Ok(_) => {}
                Err(err) if err.is_transport() => {
                    info!(%err, "control panel disconnected");
                    return Ok(LoopExit::Disconnected);
                }
                Err(err) => return Err(err),
            }
        }

        frontend.render(handler)?;

        if handler.stop_requested() {
            return Ok(LoopExit::Stopped);
        }

        if let Some(interval) = config.frame_interval {
            if let Some(rest) = interval.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::net::UnixStream;

    use quizlink_frame::{FrameReader, FrameWriter, Value};

    use super::*;
    use crate::display::{Screen, ScreenHandler};
    use crate::error::PeerError;
    use crate::status::OK;

    fn quick() -> LoopConfig {
        LoopConfig {
            poll_timeout: Duration::ZERO,
            frame_interval: Some(Duration::from_millis(1)),
            linger: Duration::ZERO,
        }
    }

    fn session_pair() -> (Session<UnixStream>, UnixStream) {
        let (server, client) = UnixStream::pair().expect("socket pair should open");
        let reader = FrameReader::new(server.try_clone().expect("clone should succeed"));
        (Session::new(reader, FrameWriter::new(server)), client)
    }

    /// Records every rendered revision and quits after a fixed number of frames.
    struct Recording {
        frames: usize,
        quit_after: Option<usize>,
        revisions: Vec<u64>,
    }

    impl Recording {
        fn new(quit_after: Option<usize>) -> Self {
            Self {
                frames: 0,
                quit_after,
                revisions: Vec::new(),
            }
        }
    }

    impl Frontend<ScreenHandler> for Recording {
        fn pump(&mut self) -> Pump {
            match self.quit_after {
                Some(limit) if self.frames >= limit => Pump::Quit,
                _ => Pump::Continue,
            }
        }

        fn render(&mut self, handler: &ScreenHandler) -> Result<()> {
            self.frames += 1;
            self.revisions.push(handler.revision());
            Ok(())
        }
    }

    struct Broken;

    impl Frontend<ScreenHandler> for Broken {
        fn render(&mut self, _handler: &ScreenHandler) -> Result<()> {
            Err(PeerError::Frontend("display lost".to_string()))
        }
    }

    #[test]
    fn renders_while_idle_and_quits() {
        let (mut session, _client) = session_pair();
        let mut handler = ScreenHandler::new();
        let mut frontend = Recording::new(Some(5));

        let exit = run_loop(&mut session, &mut handler, &mut frontend, &quick()).expect("loop");
        assert_eq!(exit, LoopExit::Quit);
        assert_eq!(frontend.frames, 5);
        assert_eq!(session.served(), 0);
    }

    #[test]
    fn serves_queued_requests_one_per_iteration_until_stop() {
        let (mut session, client) = session_pair();
        let mut writer = FrameWriter::new(client.try_clone().expect("clone"));
        let mut reader = FrameReader::new(client);
        for name in ["showintro", "danksagung", "stop"] {
            writer
                .write_value(&Value::sequence([Value::from(name)]))
                .expect("write");
        }

        let mut handler = ScreenHandler::new();
        let mut frontend = Recording::new(None);
        let exit = run_loop(&mut session, &mut handler, &mut frontend, &quick()).expect("loop");

        assert_eq!(exit, LoopExit::Stopped);
        assert_eq!(session.served(), 3);
        assert_eq!(frontend.revisions, vec![1, 2, 2]);
        assert_eq!(handler.screen(), &Screen::Thanks);
        for _ in 0..3 {
            assert_eq!(reader.read_value().expect("status"), Value::result_code(OK));
        }
        assert!(matches!(
            reader.read_value(),
            Err(quizlink_frame::FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn peer_hang_up_ends_the_loop() {
        let (mut session, client) = session_pair();
        drop(client);

        let mut handler = ScreenHandler::new();
        let exit = run_loop(&mut session, &mut handler, &mut Headless, &quick()).expect("loop");
        assert_eq!(exit, LoopExit::Disconnected);
    }

    #[test]
    fn frontend_failure_is_returned_and_closes_the_session() {
        let (mut session, mut client) = session_pair();
        let mut handler = ScreenHandler::new();

        let err = run_loop(&mut session, &mut handler, &mut Broken, &quick())
            .expect_err("render failure should end the loop");
        assert!(matches!(err, PeerError::Frontend(_)));
        assert!(matches!(
            quizlink_frame::read_exact(&mut client, 1),
            Err(quizlink_frame::FrameError::ConnectionClosed)
        ));
    }
}

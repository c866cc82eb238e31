use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// A connected link stream (Read + Write).
///
/// This is the fundamental I/O type returned by transport operations.
/// It wraps a TCP stream with Nagle's algorithm disabled, since every
/// transaction is a small request followed by a small response.
pub struct LinkStream {
    inner: TcpStream,
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl LinkStream {
    /// Create a LinkStream from a connected TCP stream.
    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        // Latency only; a failure here leaves a working stream.
        let _ = stream.set_nodelay(true);
        Self { inner: stream }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self { inner: cloned })
    }

    /// Address of the connected peer.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.inner.peer_addr().map_err(Into::into)
    }

    /// Shut down both directions of the connection.
    ///
    /// A peer that already went away is not an error.
    pub fn shutdown(&self) -> Result<()> {
        match self.inner.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkStream")
            .field("type", &"tcp")
            .field("peer", &self.inner.peer_addr().ok())
            .finish()
    }
}

/// Stream operations the session layer needs beyond `Read + Write`.
pub trait Link: Read + Write {
    /// Non-blocking readiness check: returns true when a read would not block.
    ///
    /// A zero `timeout` never waits. Hang-up and error conditions count as
    /// ready so the following read observes the closure.
    fn poll_readable(&self, timeout: Duration) -> Result<bool>;

    /// Shut down both directions; an already-gone peer is not an error.
    fn close(&self) -> Result<()>;
}

impl Link for LinkStream {
    #[cfg(unix)]
    fn poll_readable(&self, timeout: Duration) -> Result<bool> {
        poll_fd(std::os::fd::AsRawFd::as_raw_fd(&self.inner), timeout)
    }

    #[cfg(not(unix))]
    fn poll_readable(&self, timeout: Duration) -> Result<bool> {
        let mut probe = [0u8; 1];
        if timeout.is_zero() {
            self.inner.set_nonblocking(true)?;
            let peeked = self.inner.peek(&mut probe);
            self.inner.set_nonblocking(false)?;
            return match peeked {
                Ok(_) => Ok(true),
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => Ok(false),
                Err(err) => Err(err.into()),
            };
        }

        let previous = self.inner.read_timeout()?;
        self.inner.set_read_timeout(Some(timeout))?;
        let peeked = self.inner.peek(&mut probe);
        self.inner.set_read_timeout(previous)?;
        match peeked {
            Ok(_) => Ok(true),
            Err(err)
                if err.kind() == std::io::ErrorKind::WouldBlock
                    || err.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn close(&self) -> Result<()> {
        self.shutdown()
    }
}

#[cfg(unix)]
impl Link for std::os::unix::net::UnixStream {
    fn poll_readable(&self, timeout: Duration) -> Result<bool> {
        poll_fd(std::os::fd::AsRawFd::as_raw_fd(self), timeout)
    }

    fn close(&self) -> Result<()> {
        match self.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(unix)]
fn poll_fd(fd: std::os::fd::RawFd, timeout: Duration) -> Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

    // SAFETY: `pfd` is a valid, writable pollfd and the count passed is 1.
    let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
    if rc < 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() == std::io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err.into());
    }

    Ok(rc > 0 && pfd.revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0)
}

//! TCP transport for the quiz display link.
//!
//! One control panel talks to one display over one TCP connection. This is
//! the lowest layer of quizlink; everything else builds on the
//! [`LinkStream`] type provided here.

pub mod error;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use tcp::{TcpLink, DEFAULT_PORT};
pub use traits::{Link, LinkStream};

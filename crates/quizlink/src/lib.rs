//! Quiz display link.
//!
//! A control panel drives a remote quiz display over one TCP connection.
//! Every value on the wire is tag-length-value encoded; every exchange is
//! one request sequence answered by one status code.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP bind/accept/connect and readiness checks
//! - [`frame`]: TLV values, encoding and exact-length stream framing
//! - [`peer`]: Commands, transactions, the display loop and the client (behind `peer` feature)

/// Re-export transport types.
pub mod transport {
    pub use quizlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use quizlink_frame::*;
}

/// Re-export peer types (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use quizlink_peer::*;
}

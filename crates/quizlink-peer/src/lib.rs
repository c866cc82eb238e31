//! Request/response transactions between the quiz control panel and the
//! display.
//!
//! The control panel is always the client: it sends one command sequence
//! and blocks until one status value comes back. The display is always the
//! server: its event loop services at most one transaction per iteration
//! and keeps rendering while the link is idle.

pub mod client;
pub mod command;
pub mod display;
pub mod error;
pub mod event_loop;
pub mod listener;
pub mod payload;
pub mod session;
pub mod status;
pub mod transaction;

pub use client::{ClientConfig, DisplayClient};
pub use command::{
    Command, Request, CMD_SHOW_INTRO, CMD_SHOW_PLAYING_FIELD, CMD_SHOW_QUESTION, CMD_SHOW_RESULT,
    CMD_SHOW_THANKS, CMD_STOP,
};
pub use display::{Screen, ScreenHandler};
pub use error::{PeerError, Result};
pub use event_loop::{run_loop, Frontend, Headless, LoopConfig, LoopExit, Pump};
pub use listener::DisplayListener;
pub use payload::{
    Category, Cell, PlayingField, Scoreboard, TeamScore, DEFAULT_VALUES, PAYLOAD_VERSION,
};
pub use session::{Session, SessionState};
pub use status::{Status, ERROR, OK};
pub use transaction::{call, serve_one, Outcome, RequestHandler};

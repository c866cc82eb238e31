use quizlink_frame::Value;
use serde::Serialize;

use crate::error::{PeerError, Result};

/// Status code for success.
pub const OK: u32 = 0;

/// Generic failure status returned by the display for any rejected request.
pub const ERROR: u32 = 42;

/// Application status carried by a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Status(pub u32);

impl Status {
    pub const OK: Status = Status(OK);
    pub const ERROR: Status = Status(ERROR);

    /// The raw code.
    pub fn code(self) -> u32 {
        self.0
    }

    /// True when the code is zero.
    pub fn is_ok(self) -> bool {
        self.0 == OK
    }

    /// Interpret a response value as a status.
    ///
    /// Result codes are taken as is. Integers must be non-negative.
    pub fn from_response(value: &Value) -> Result<Self> {
        match value {
            Value::ResultCode(code) => Ok(Self(*code)),
            Value::Int(code) => u32::try_from(*code).map(Self).map_err(|_| {
                PeerError::UnexpectedResponse(format!("negative status code {code}"))
            }),
            other => Err(PeerError::UnexpectedResponse(format!(
                "expected a status code, got {}",
                other.kind_name()
            ))),
        }
    }

    /// The response value carrying this status.
    pub fn to_value(self) -> Value {
        Value::ResultCode(self.0)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            OK => write!(f, "{} (ok)", self.0),
            ERROR => write!(f, "{} (error)", self.0),
            code => write!(f, "{code}"),
        }
    }
}

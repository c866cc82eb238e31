use quizlink_frame::Value;

use crate::error::{PeerError, Result};
use crate::payload::{PlayingField, Scoreboard};

/// Command name: end the serving session.
pub const CMD_STOP: &str = "stop";
/// Command name: show a question with an optional countdown.
pub const CMD_SHOW_QUESTION: &str = "showquestion";
/// Command name: show the intro screen.
pub const CMD_SHOW_INTRO: &str = "showintro";
/// Command name: show the thank-you screen.
pub const CMD_SHOW_THANKS: &str = "danksagung";
/// Command name: show the final standings.
pub const CMD_SHOW_RESULT: &str = "showresult";
/// Command name: show the board.
pub const CMD_SHOW_PLAYING_FIELD: &str = "showplayingfield";

/// A request in native form: `Sequence[String(command), params...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub command: String,
    pub params: Vec<Value>,
}

impl Request {
    pub fn new(command: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }

    /// Unpack the command-name convention.
    pub fn from_value(value: Value) -> Result<Self> {
        let items = match value {
            Value::Sequence(items) => items,
            other => {
                return Err(PeerError::MalformedRequest(format!(
                    "expected a sequence, got {}",
                    other.kind_name()
                )))
            }
        };

        let mut items = items.into_iter();
        match items.next() {
            Some(Value::String(command)) => Ok(Self {
                command,
                params: items.collect(),
            }),
            Some(other) => Err(PeerError::MalformedRequest(format!(
                "command name must be a string, got {}",
                other.kind_name()
            ))),
            None => Err(PeerError::MalformedRequest("empty sequence".to_string())),
        }
    }

    pub fn into_value(self) -> Value {
        let mut items = Vec::with_capacity(self.params.len() + 1);
        items.push(Value::String(self.command));
        items.extend(self.params);
        Value::Sequence(items)
    }

    /// Positional parameter `index`, if present.
    pub fn param(&self, index: usize) -> Option<&Value> {
        self.params.get(index)
    }

    fn expect_arity(&self, arity: usize) -> Result<()> {
        if self.params.len() != arity {
            return Err(PeerError::bad_parameter(
                &self.command,
                format!("expected {arity} parameter(s), got {}", self.params.len()),
            ));
        }
        Ok(())
    }

    fn blob_param(&self, index: usize) -> Result<&[u8]> {
        match self.param(index) {
            Some(Value::Bytes(blob)) => Ok(&blob[..]),
            Some(other) => Err(PeerError::bad_parameter(
                &self.command,
                format!("parameter {index} must be a byte blob, got {}", other.kind_name()),
            )),
            None => Err(PeerError::bad_parameter(
                &self.command,
                format!("missing parameter {index}"),
            )),
        }
    }
}

/// The commands a display understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Stop,
    /// `text` lines are `#`-delimited; a negative `seconds` hides the timer.
    ShowQuestion { text: String, seconds: i32 },
    ShowIntro,
    ShowThanks,
    ShowResult(Scoreboard),
    ShowPlayingField(PlayingField),
}

impl Command {
    /// Wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stop => CMD_STOP,
            Self::ShowQuestion { .. } => CMD_SHOW_QUESTION,
            Self::ShowIntro => CMD_SHOW_INTRO,
            Self::ShowThanks => CMD_SHOW_THANKS,
            Self::ShowResult(_) => CMD_SHOW_RESULT,
            Self::ShowPlayingField(_) => CMD_SHOW_PLAYING_FIELD,
        }
    }

    pub fn to_request(&self) -> Result<Request> {
        let params = match self {
            Self::Stop | Self::ShowIntro | Self::ShowThanks => Vec::new(),
            Self::ShowQuestion { text, seconds } => {
                vec![Value::string(text.as_str()), Value::Int(*seconds)]
            }
            Self::ShowResult(board) => vec![Value::Bytes(board.to_blob()?)],
            Self::ShowPlayingField(field) => vec![Value::Bytes(field.to_blob()?)],
        };
        Ok(Request::new(self.name(), params))
    }

    pub fn from_request(request: &Request) -> Result<Self> {
        match request.command.as_str() {
            CMD_STOP => {
                request.expect_arity(0)?;
                Ok(Self::Stop)
            }
            CMD_SHOW_INTRO => {
                request.expect_arity(0)?;
                Ok(Self::ShowIntro)
            }
            CMD_SHOW_THANKS => {
                request.expect_arity(0)?;
                Ok(Self::ShowThanks)
            }
            CMD_SHOW_QUESTION => {
                request.expect_arity(2)?;
                let text = request.params[0].as_str().ok_or_else(|| {
                    PeerError::bad_parameter(CMD_SHOW_QUESTION, "text must be a string")
                })?;
                let seconds = request.params[1].as_int().ok_or_else(|| {
                    PeerError::bad_parameter(CMD_SHOW_QUESTION, "seconds must be an int32")
                })?;
                Ok(Self::ShowQuestion {
                    text: text.to_string(),
                    seconds,
                })
            }
            CMD_SHOW_RESULT => {
                request.expect_arity(1)?;
                Ok(Self::ShowResult(Scoreboard::from_blob(request.blob_param(0)?)?))
            }
            CMD_SHOW_PLAYING_FIELD => {
                request.expect_arity(1)?;
                Ok(Self::ShowPlayingField(PlayingField::from_blob(
                    request.blob_param(0)?,
                )?))
            }
            other => Err(PeerError::UnknownCommand(other.to_string())),
        }
    }
}

//! Screen model of the quiz display.
//!
//! [`ScreenHandler`] turns commands into a [`Screen`]; drawing that screen
//! is left to whatever [`Frontend`](crate::event_loop::Frontend) runs the
//! loop.

use quizlink_frame::Value;
use serde::Serialize;

use crate::command::{Command, Request};
use crate::error::Result;
use crate::payload::{PlayingField, Scoreboard, TeamScore};
use crate::status::Status;
use crate::transaction::RequestHandler;

const INTRO_LINES: [&str; 3] = ["DAS", "GROSSE", "QUIZ"];
const THANKS_LINES: [&str; 2] = [
    "Wir hoffen ihr hattet etwas Spaß",
    "DANKE an alle, die mitgeholfen haben",
];
const RESULT_HEADING: &str = "ENDSTAND";

/// What the display currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Blank,
    Intro,
    Thanks,
    Question {
        lines: Vec<String>,
        /// Zero-padded to three digits; absent when the timer is hidden.
        countdown: Option<String>,
    },
    Results {
        /// Highest score first.
        standings: Vec<TeamScore>,
    },
    PlayingField {
        /// Category names, sorted.
        headers: Vec<String>,
        /// One row per question value; a cell shows its value until answered.
        rows: Vec<Vec<String>>,
    },
}

impl Screen {
    pub fn question(text: &str, seconds: i32) -> Self {
        Self::Question {
            lines: text.split('#').map(str::to_string).collect(),
            countdown: (seconds >= 0).then(|| format!("{seconds:03}")),
        }
    }

    pub fn results(scoreboard: &Scoreboard) -> Self {
        Self::Results {
            standings: scoreboard.ranked().into_iter().cloned().collect(),
        }
    }

    pub fn playing_field(field: &PlayingField) -> Self {
        let mut columns: Vec<_> = field.categories.iter().collect();
        columns.sort_by(|a, b| a.name.cmp(&b.name));

        let headers = columns.iter().map(|c| c.name.clone()).collect();
        let rows = field
            .values
            .iter()
            .map(|&value| {
                columns
                    .iter()
                    .map(|category| {
                        match category.cells.iter().find(|cell| cell.value == value) {
                            Some(cell) if !cell.is_answered() => value.to_string(),
                            _ => String::new(),
                        }
                    })
                    .collect()
            })
            .collect();

        Self::PlayingField { headers, rows }
    }

    /// Short name for logs and tables.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Intro => "intro",
            Self::Thanks => "thanks",
            Self::Question { .. } => "question",
            Self::Results { .. } => "results",
            Self::PlayingField { .. } => "playing_field",
        }
    }

    /// Centered text lines, top to bottom. Empty for the blank screen and
    /// the board, which is a grid.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Blank | Self::PlayingField { .. } => Vec::new(),
            Self::Intro => INTRO_LINES.iter().map(|s| s.to_string()).collect(),
            Self::Thanks => THANKS_LINES.iter().map(|s| s.to_string()).collect(),
            Self::Question { lines, .. } => lines.clone(),
            Self::Results { standings } => {
                let mut lines = vec![RESULT_HEADING.to_string(), String::new()];
                lines.extend(
                    standings
                        .iter()
                        .map(|team| format!("Team {}: {}", team.name, team.score)),
                );
                lines
            }
        }
    }
}

/// Request handler backing the display.
#[derive(Debug)]
pub struct ScreenHandler {
    screen: Screen,
    revision: u64,
    stop: bool,
}

impl Default for ScreenHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenHandler {
    pub fn new() -> Self {
        Self {
            screen: Screen::Blank,
            revision: 0,
            stop: false,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Bumped on every screen change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply one command.
    pub fn apply(&mut self, command: Command) {
        let screen = match command {
            Command::Stop => {
                self.stop = true;
                return;
            }
            Command::ShowQuestion { text, seconds } => Screen::question(&text, seconds),
            Command::ShowIntro => Screen::Intro,
            Command::ShowThanks => Screen::Thanks,
            Command::ShowResult(scoreboard) => Screen::results(&scoreboard),
            Command::ShowPlayingField(field) => Screen::playing_field(&field),
        };
        self.screen = screen;
        self.revision += 1;
    }
}

impl RequestHandler for ScreenHandler {
    fn handle(&mut self, request: Request) -> Result<Value> {
        let command = Command::from_request(&request)?;
        self.apply(command);
        Ok(Status::OK.to_value())
    }

    fn stop_requested(&self) -> bool {
        self.stop
    }
}

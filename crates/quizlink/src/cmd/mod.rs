use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod display;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the display: accept one control panel and render its commands.
    Display(DisplayArgs),
    /// Send one command to a running display.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Display(args) => display::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DisplayArgs {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:4321")]
    pub bind: String,
    /// Minimum time per loop iteration (e.g. 16ms, 1s).
    #[arg(long, default_value = "16ms")]
    pub frame_interval: String,
    /// Pause before closing the connection after the loop ends.
    #[arg(long, default_value = "300ms")]
    pub linger: String,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Display address.
    #[arg(long, env = "QUIZLINK_ADDR", default_value = "127.0.0.1:4321")]
    pub addr: String,
    /// Socket read/write timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    #[command(subcommand)]
    pub command: SendCommand,
}

#[derive(Subcommand, Debug)]
pub enum SendCommand {
    /// Show the intro screen.
    Intro,
    /// Show the thank-you screen.
    Thanks,
    /// Stop the display.
    Stop,
    /// Show a question.
    Question {
        /// Question text; `#` starts a new line.
        #[arg(long)]
        text: String,
        /// Seconds left; negative hides the timer.
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        seconds: i32,
    },
    /// Show the final standings.
    Result {
        /// Team score as NAME=SCORE; repeat for each team.
        #[arg(long = "team", value_name = "NAME=SCORE", required = true)]
        teams: Vec<String>,
    },
    /// Show the board.
    Field {
        /// Playing field JSON document.
        #[arg(long, conflicts_with = "categories")]
        file: Option<PathBuf>,
        /// Categories of an unanswered board (comma-separated).
        #[arg(long, value_delimiter = ',', conflicts_with = "file")]
        categories: Option<Vec<String>>,
    },
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `150ms`, `2s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<std::time::Duration> {
    use std::time::Duration;

    use crate::exit::{CliError, USAGE};

    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("0ms").unwrap(), Duration::ZERO);
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert_eq!(parse_duration("").unwrap_err().code, crate::exit::USAGE);
        assert_eq!(parse_duration("soon").unwrap_err().code, crate::exit::USAGE);
        assert_eq!(parse_duration("-1s").unwrap_err().code, crate::exit::USAGE);
    }
}

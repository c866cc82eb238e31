use std::fs;

use quizlink_frame::FrameConfig;
use quizlink_peer::{ClientConfig, Command, DisplayClient, PlayingField, Scoreboard};

use crate::cmd::{parse_duration, SendArgs, SendCommand};
use crate::exit::{io_error, peer_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::output::{print_status, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let command = build_command(&args.command)?;

    let timeout = (!timeout.is_zero()).then_some(timeout);
    let config = ClientConfig {
        frame: FrameConfig {
            read_timeout: timeout,
            write_timeout: timeout,
            ..FrameConfig::default()
        },
    };

    let mut client = DisplayClient::with_config(args.addr.as_str(), config);
    client
        .connect()
        .map_err(|err| peer_error("connect failed", err))?;

    let status = match command {
        Command::Stop => client.stop(),
        other => {
            let status = client.send(&other);
            client.disconnect();
            status
        }
    }
    .map_err(|err| peer_error("send failed", err))?;

    print_status(client.addr(), command_name(&args.command), status, format);
    Ok(if status.is_ok() { SUCCESS } else { FAILURE })
}

fn command_name(command: &SendCommand) -> &'static str {
    match command {
        SendCommand::Intro => quizlink_peer::CMD_SHOW_INTRO,
        SendCommand::Thanks => quizlink_peer::CMD_SHOW_THANKS,
        SendCommand::Stop => quizlink_peer::CMD_STOP,
        SendCommand::Question { .. } => quizlink_peer::CMD_SHOW_QUESTION,
        SendCommand::Result { .. } => quizlink_peer::CMD_SHOW_RESULT,
        SendCommand::Field { .. } => quizlink_peer::CMD_SHOW_PLAYING_FIELD,
    }
}

fn build_command(command: &SendCommand) -> CliResult<Command> {
    Ok(match command {
        SendCommand::Intro => Command::ShowIntro,
        SendCommand::Thanks => Command::ShowThanks,
        SendCommand::Stop => Command::Stop,
        SendCommand::Question { text, seconds } => Command::ShowQuestion {
            text: text.clone(),
            seconds: *seconds,
        },
        SendCommand::Result { teams } => Command::ShowResult(parse_teams(teams)?),
        SendCommand::Field { file, categories } => {
            let field = match (file, categories) {
                (Some(path), _) => {
                    let blob = fs::read(path).map_err(|err| {
                        io_error(&format!("failed reading {}", path.display()), err)
                    })?;
                    PlayingField::from_blob(&blob).map_err(|err| {
                        peer_error(&format!("invalid playing field {}", path.display()), err)
                    })?
                }
                (None, Some(categories)) => {
                    PlayingField::with_default_values(categories.iter().cloned())
                }
                (None, None) => {
                    return Err(CliError::new(USAGE, "field needs --file or --categories"))
                }
            };
            Command::ShowPlayingField(field)
        }
    })
}

fn parse_teams(teams: &[String]) -> CliResult<Scoreboard> {
    let mut board = Scoreboard::default();
    for team in teams {
        let (name, score) = team.rsplit_once('=').ok_or_else(|| {
            CliError::new(USAGE, format!("--team expects NAME=SCORE, got '{team}'"))
        })?;
        let score: i32 = score
            .trim()
            .parse()
            .map_err(|_| CliError::new(USAGE, format!("invalid score in '{team}'")))?;
        if name.trim().is_empty() {
            return Err(CliError::new(USAGE, format!("missing team name in '{team}'")));
        }
        board.push(name.trim(), score);
    }
    Ok(board)
}

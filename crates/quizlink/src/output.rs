use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use quizlink_peer::{Screen, Status};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    addr: &'a str,
    command: &'a str,
    status: u32,
    ok: bool,
}

pub fn print_status(addr: &str, command: &str, status: Status, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatusOutput {
                addr,
                command,
                status: status.code(),
                ok: status.is_ok(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DISPLAY", "COMMAND", "STATUS"])
                .add_row(vec![addr.to_string(), command.to_string(), status.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("display={addr} command={command} status={status}");
        }
    }
}

#[derive(Serialize)]
struct ScreenOutput<'a> {
    revision: u64,
    #[serde(flatten)]
    screen: &'a Screen,
}

pub fn print_screen(screen: &Screen, revision: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ScreenOutput { revision, screen };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => println!("{}", screen_table(screen)),
        OutputFormat::Pretty => {
            println!("--- {} (revision {revision}) ---", screen.name());
            for line in screen_text(screen) {
                println!("{line}");
            }
        }
    }
}

fn screen_table(screen: &Screen) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    match screen {
        Screen::PlayingField { headers, rows } => {
            table.set_header(headers.clone());
            for row in rows {
                table.add_row(row.clone());
            }
        }
        other => {
            table.set_header(vec![other.name().to_uppercase()]);
            for line in screen_text(other) {
                table.add_row(vec![line]);
            }
        }
    }
    table
}

/// Plain-text rendering, one string per terminal line.
fn screen_text(screen: &Screen) -> Vec<String> {
    match screen {
        Screen::Question {
            countdown: Some(countdown),
            ..
        } => {
            let mut lines = vec![format!("[{countdown}]")];
            lines.extend(screen.lines());
            lines
        }
        Screen::PlayingField { headers, rows } => {
            let width = headers
                .iter()
                .chain(rows.iter().flatten())
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0);
            std::iter::once(headers)
                .chain(rows.iter())
                .map(|row| {
                    row.iter()
                        .map(|cell| format!("{cell:^width$}"))
                        .collect::<Vec<_>>()
                        .join(" | ")
                })
                .collect()
        }
        other => other.lines(),
    }
}

#[cfg(test)]
mod tests {
    use quizlink_peer::PlayingField;

    use super::*;

    #[test]
    fn question_text_puts_countdown_first() {
        let lines = screen_text(&Screen::question("Eins#Zwei", 9));
        assert_eq!(lines, vec!["[009]", "Eins", "Zwei"]);
    }

    #[test]
    fn board_text_is_aligned() {
        let mut field = PlayingField::new(["Kunst", "Tiere"], &[20]);
        field.answer("Tiere", 20, "Rot");
        let lines = screen_text(&Screen::playing_field(&field));
        assert_eq!(lines, vec!["Kunst | Tiere", " 20   |      "]);
    }

    #[test]
    fn screen_json_is_flat() {
        let out = ScreenOutput {
            revision: 3,
            screen: &Screen::Intro,
        };
        let json = serde_json::to_value(&out).expect("serialize");
        assert_eq!(json, serde_json::json!({"revision": 3, "screen": "intro"}));
    }
}

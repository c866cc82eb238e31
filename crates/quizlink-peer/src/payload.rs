//! JSON documents carried inside `ByteBlob` parameters.
//!
//! Both documents carry an explicit `version` field. Decoding checks it
//! before looking at anything else, so a newer sender gets a clear
//! [`PeerError::UnsupportedPayloadVersion`] rather than a field error.

use std::collections::BTreeSet;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{PeerError, Result};

/// Schema version written by this build.
pub const PAYLOAD_VERSION: u32 = 1;

/// Question values of a standard board, one row each.
pub const DEFAULT_VALUES: [i32; 5] = [20, 40, 60, 80, 100];

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

fn check_version(blob: &[u8]) -> Result<()> {
    let probe: VersionProbe = serde_json::from_slice(blob)?;
    if probe.version != PAYLOAD_VERSION {
        return Err(PeerError::UnsupportedPayloadVersion {
            found: probe.version,
            expected: PAYLOAD_VERSION,
        });
    }
    Ok(())
}

/// One team's points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub name: String,
    pub score: i32,
}

/// Final standings, as sent with `showresult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub version: u32,
    pub teams: Vec<TeamScore>,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self {
            version: PAYLOAD_VERSION,
            teams: Vec::new(),
        }
    }
}

impl Scoreboard {
    /// Create a scoreboard from (name, score) pairs.
    pub fn new<N: Into<String>>(teams: impl IntoIterator<Item = (N, i32)>) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            teams: teams
                .into_iter()
                .map(|(name, score)| TeamScore {
                    name: name.into(),
                    score,
                })
                .collect(),
        }
    }

    /// Append a team.
    pub fn push(&mut self, name: impl Into<String>, score: i32) {
        self.teams.push(TeamScore {
            name: name.into(),
            score,
        });
    }

    /// Teams ordered by score, highest first. Ties keep their sent order.
    pub fn ranked(&self) -> Vec<&TeamScore> {
        let mut ranked: Vec<&TeamScore> = self.teams.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    pub fn to_blob(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        check_version(blob)?;
        Ok(serde_json::from_slice(blob)?)
    }
}

/// State of one question on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub value: i32,
    #[serde(default)]
    pub answered_by: Option<String>,
    #[serde(default)]
    pub wrong_answers_by: BTreeSet<String>,
}

impl Cell {
    fn open(value: i32) -> Self {
        Self {
            value,
            answered_by: None,
            wrong_answers_by: BTreeSet::new(),
        }
    }

    pub fn is_answered(&self) -> bool {
        self.answered_by.is_some()
    }
}

/// One column of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// The category x value grid, as sent with `showplayingfield`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingField {
    pub version: u32,
    pub values: Vec<i32>,
    pub categories: Vec<Category>,
}

impl PlayingField {
    /// Build an unanswered grid.
    pub fn new<N: Into<String>>(categories: impl IntoIterator<Item = N>, values: &[i32]) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            values: values.to_vec(),
            categories: categories
                .into_iter()
                .map(|name| Category {
                    name: name.into(),
                    cells: values.iter().copied().map(Cell::open).collect(),
                })
                .collect(),
        }
    }

    /// Build an unanswered grid with the standard values.
    pub fn with_default_values<N: Into<String>>(categories: impl IntoIterator<Item = N>) -> Self {
        Self::new(categories, &DEFAULT_VALUES)
    }

    pub fn cell(&self, category: &str, value: i32) -> Option<&Cell> {
        self.categories
            .iter()
            .find(|c| c.name == category)?
            .cells
            .iter()
            .find(|cell| cell.value == value)
    }

    pub fn cell_mut(&mut self, category: &str, value: i32) -> Option<&mut Cell> {
        self.categories
            .iter_mut()
            .find(|c| c.name == category)?
            .cells
            .iter_mut()
            .find(|cell| cell.value == value)
    }

    /// Record a correct answer.
    ///
    /// Ignored when the question is already answered or the team already
    /// got it wrong. Returns whether the cell changed.
    pub fn answer(&mut self, category: &str, value: i32, team: &str) -> bool {
        match self.cell_mut(category, value) {
            Some(cell) if cell.answered_by.is_none() && !cell.wrong_answers_by.contains(team) => {
                cell.answered_by = Some(team.to_string());
                true
            }
            _ => false,
        }
    }

    /// Record a wrong answer; ignored once the question is answered.
    pub fn wrong_answer(&mut self, category: &str, value: i32, team: &str) -> bool {
        match self.cell_mut(category, value) {
            Some(cell) if cell.answered_by.is_none() => {
                cell.wrong_answers_by.insert(team.to_string())
            }
            _ => false,
        }
    }

    /// Number of answered questions.
    pub fn answered_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.cells.iter())
            .filter(|cell| cell.is_answered())
            .count()
    }

    /// Check that every category has exactly one cell per board value.
    pub fn validate(&self) -> Result<()> {
        for category in &self.categories {
            let mut seen: Vec<i32> = category.cells.iter().map(|cell| cell.value).collect();
            seen.sort_unstable();
            let mut expected = self.values.clone();
            expected.sort_unstable();
            if seen != expected {
                return Err(PeerError::bad_parameter(
                    crate::command::CMD_SHOW_PLAYING_FIELD,
                    format!(
                        "category '{}' has cells {seen:?}, board values are {expected:?}",
                        category.name
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn to_blob(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        check_version(blob)?;
        let field: Self = serde_json::from_slice(blob)?;
        field.validate()?;
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoreboard_document_layout() {
        let board = Scoreboard::new([("Rot", 120), ("Blau", -20)]);
        let json: serde_json::Value =
            serde_json::from_slice(&board.to_blob().expect("scoreboard should encode"))
                .expect("blob should be json");
        assert_eq!(
            json,
            serde_json::json!({
                "version": 1,
                "teams": [{"name": "Rot", "score": 120}, {"name": "Blau", "score": -20}]
            })
        );
    }

    #[test]
    fn scoreboard_roundtrip_and_ranking() {
        let mut board = Scoreboard::default();
        board.push("A", 40);
        board.push("B", 100);
        board.push("C", 40);

        let decoded = Scoreboard::from_blob(&board.to_blob().expect("encode"))
            .expect("scoreboard should decode");
        assert_eq!(decoded, board);

        let names: Vec<&str> = decoded.ranked().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let err = Scoreboard::from_blob(br#"{"version":2,"teams":[],"extra":true}"#)
            .expect_err("version 2 should be rejected");
        assert!(matches!(
            err,
            PeerError::UnsupportedPayloadVersion {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn non_json_blob_is_json_error() {
        let err = PlayingField::from_blob(b"\x80\x04pickle").expect_err("garbage should fail");
        assert!(matches!(err, PeerError::Json(_)));
    }

    #[test]
    fn playing_field_answers() {
        let mut field = PlayingField::with_default_values(["Musik", "Sport"]);
        assert_eq!(field.categories.len(), 2);
        assert_eq!(field.categories[0].cells.len(), 5);

        assert!(field.wrong_answer("Musik", 40, "Rot"));
        assert!(!field.answer("Musik", 40, "Rot"));
        assert!(field.answer("Musik", 40, "Blau"));
        assert!(!field.wrong_answer("Musik", 40, "Gelb"));
        assert!(!field.answer("Kunst", 40, "Blau"));

        let cell = field.cell("Musik", 40).expect("cell should exist");
        assert_eq!(cell.answered_by.as_deref(), Some("Blau"));
        assert_eq!(
            cell.wrong_answers_by.iter().collect::<Vec<_>>(),
            vec!["Rot"]
        );
        assert_eq!(field.answered_count(), 1);
    }

    #[test]
    fn playing_field_roundtrip() {
        let mut field = PlayingField::with_default_values(["Geschichte"]);
        field.answer("Geschichte", 100, "Gruen");
        field.wrong_answer("Geschichte", 20, "Rot");
        field.wrong_answer("Geschichte", 20, "Blau");

        let decoded = PlayingField::from_blob(&field.to_blob().expect("encode"))
            .expect("field should decode");
        assert_eq!(decoded, field);
    }

    #[test]
    fn missing_cell_is_rejected() {
        let blob = br#"{"version":1,"values":[20,40],
            "categories":[{"name":"X","cells":[{"value":20}]}]}"#;
        let err = PlayingField::from_blob(blob).expect_err("incomplete grid should fail");
        assert!(matches!(err, PeerError::BadParameter { .. }));
    }
}

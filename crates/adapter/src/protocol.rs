//! Multiplayer line protocol
//!
//! Every message is one text line: a verb, then an optional space and a
//! payload. This module only covers the verbs the game itself needs; lobby
//! and channel management verbs arrive as [`ServerMessage::Unknown`].
//!
//! # Outbound
//!
//! | Line | Meaning |
//! |------|---------|
//! | `PIECE` | Ask for one more piece to be appended to the queue |
//! | `SCORE <n>` | Mirror the local score |
//! | `LIVES <n>` | Mirror the local lives |
//! | `SCORES` | Ask for the match scoreboard |
//! | `BOARD <25 values>` | Mirror the board, row-major |
//! | `DIE` | Leave the match |
//!
//! # Inbound
//!
//! | Line | Meaning |
//! |------|---------|
//! | `PIECE <index>` | Next shared piece, catalog index 0-14 |
//! | `SCORES <name:score:lives>...` | Scoreboard, entries separated by newline or `\|` |
//! | `MSG <from>:<text>` | Chat line |
//! | `DIE <name>` | Another player left or died |
//! | `ERROR <text>` | Server-side rejection |

use std::fmt;

use crate::types::{Cell, BOARD_HEIGHT, BOARD_WIDTH};

/// Message sent to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Piece,
    Score(u32),
    Lives(i32),
    Scores,
    Board([[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize]),
    Die,
}

impl Command {
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Piece => "PIECE",
            Command::Score(_) => "SCORE",
            Command::Lives(_) => "LIVES",
            Command::Scores => "SCORES",
            Command::Board(_) => "BOARD",
            Command::Die => "DIE",
        }
    }

    /// Encode as a wire line (without the trailing newline)
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())?;
        match self {
            Command::Score(n) => write!(f, " {}", n),
            Command::Lives(n) => write!(f, " {}", n),
            Command::Board(grid) => {
                for cell in grid.iter().flatten() {
                    write!(f, " {}", cell)?;
                }
                Ok(())
            }
            Command::Piece | Command::Scores | Command::Die => Ok(()),
        }
    }
}

/// Lives column of a scoreboard entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerLives {
    Alive(i32),
    Dead,
}

/// One scoreboard entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerScore {
    pub name: String,
    pub score: u32,
    pub lives: PlayerLives,
}

/// One chat line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub from: String,
    pub text: String,
}

/// Message received from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Piece(u32),
    Scores(Vec<PlayerScore>),
    Msg(ChatMessage),
    Die(String),
    Error(String),
    Unknown { verb: String, payload: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    EmptyLine,
    MissingPayload(&'static str),
    BadNumber { verb: &'static str, value: String },
    BadScoreEntry(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::EmptyLine => write!(f, "empty line"),
            ProtocolError::MissingPayload(verb) => write!(f, "{} without payload", verb),
            ProtocolError::BadNumber { verb, value } => {
                write!(f, "{}: invalid number {:?}", verb, value)
            }
            ProtocolError::BadScoreEntry(entry) => write!(f, "SCORES: invalid entry {:?}", entry),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Parse one inbound line
pub fn parse_line(line: &str) -> Result<ServerMessage, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(ProtocolError::EmptyLine);
    }
    let (verb, payload) = match line.split_once(' ') {
        Some((verb, payload)) => (verb, payload),
        None => (line, ""),
    };

    match verb {
        "PIECE" => {
            let value = payload.trim();
            if value.is_empty() {
                return Err(ProtocolError::MissingPayload("PIECE"));
            }
            value
                .parse::<u32>()
                .map(ServerMessage::Piece)
                .map_err(|_| ProtocolError::BadNumber {
                    verb: "PIECE",
                    value: value.to_string(),
                })
        }
        "SCORES" => parse_scores(payload).map(ServerMessage::Scores),
        "MSG" => {
            let (from, text) = payload.split_once(':').unwrap_or(("", payload));
            Ok(ServerMessage::Msg(ChatMessage {
                from: from.to_string(),
                text: text.to_string(),
            }))
        }
        "DIE" => Ok(ServerMessage::Die(payload.trim().to_string())),
        "ERROR" => Ok(ServerMessage::Error(payload.to_string())),
        _ => Ok(ServerMessage::Unknown {
            verb: verb.to_string(),
            payload: payload.to_string(),
        }),
    }
}

/// Parse a scoreboard payload: `name:score:lives` entries
pub fn parse_scores(payload: &str) -> Result<Vec<PlayerScore>, ProtocolError> {
    payload
        .split(['\n', '|'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_score_entry)
        .collect()
}

fn parse_score_entry(entry: &str) -> Result<PlayerScore, ProtocolError> {
    let bad = || ProtocolError::BadScoreEntry(entry.to_string());

    // names may contain ':' so split from the right
    let mut parts = entry.rsplitn(3, ':');
    let lives = parts.next().ok_or_else(bad)?;
    let score = parts.next().ok_or_else(bad)?;
    let name = parts.next().ok_or_else(bad)?;

    let lives = if lives.eq_ignore_ascii_case("DEAD") {
        PlayerLives::Dead
    } else {
        PlayerLives::Alive(lives.parse().map_err(|_| bad())?)
    };

    Ok(PlayerScore {
        name: name.to_string(),
        score: score.parse().map_err(|_| bad())?,
        lives,
    })
}

use crate::state::State;
use crate::topology::{Cell, Topology};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

/// Error type for level parsing operations.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// IO error when reading the level
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The level declares agent/box colors
    #[error("Client does not support colors")]
    Colors,
    #[error("Not a single agent level: second agent at ({row}, {col})")]
    MultipleAgents { row: usize, col: usize },
    #[error("No agent found in level")]
    NoAgent,
    #[error("Invalid level character '{ch}' at ({row}, {col})")]
    InvalidCharacter { ch: char, row: usize, col: usize },
    #[error("Empty level")]
    Empty,
    #[error("Level of {rows}x{cols} exceeds the maximum grid size")]
    TooLarge { rows: usize, cols: usize },
}

/// A parsed level: the static grid plus the state the agent starts from.
#[derive(Debug, Clone)]
pub struct Level {
    pub topology: Topology,
    pub initial: State,
}

impl Level {
    /// Parse a level from text.
    ///
    /// Characters:
    /// - `+` = Wall
    /// - ` ` = Floor
    /// - `0`-`9` = The agent (exactly one)
    /// - `A`-`Z` = Box with that letter
    /// - `a`-`z` = Goal requiring a box with the matching upper-case letter
    ///
    /// The level ends at the first empty line.
    pub fn from_text(text: &str) -> Result<Self, LevelError> {
        let lines: Vec<&str> = text.lines().take_while(|line| !line.is_empty()).collect();

        if let Some(first) = lines.first() {
            if is_color_line(first) {
                return Err(LevelError::Colors);
            }
        } else {
            return Err(LevelError::Empty);
        }

        let rows = lines.len();
        let cols = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        if rows > u16::MAX as usize || cols > u16::MAX as usize {
            return Err(LevelError::TooLarge { rows, cols });
        }

        let mut topology = Topology::new(rows, cols);
        let mut agent = None;
        let mut boxes = BTreeMap::new();

        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let cell = Cell::new(row as u16, col as u16);
                match ch {
                    '+' => topology.set_wall(cell),
                    '0'..='9' => {
                        if agent.is_some() {
                            return Err(LevelError::MultipleAgents { row, col });
                        }
                        agent = Some(cell);
                    }
                    'A'..='Z' => {
                        boxes.insert(cell, ch);
                    }
                    'a'..='z' => topology.set_goal(cell, ch),
                    ' ' => {}
                    _ => return Err(LevelError::InvalidCharacter { ch, row, col }),
                }
            }
        }

        let agent = agent.ok_or(LevelError::NoAgent)?;
        Ok(Level {
            topology,
            initial: State::new(agent, boxes),
        })
    }

    /// Read a level line by line until an empty line or end of input, leaving
    /// the rest of the reader untouched.
    pub fn from_reader<R: BufRead>(reader: &mut R) -> Result<Self, LevelError> {
        let mut text = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.is_empty() {
                break;
            }
            text.push_str(trimmed);
            text.push('\n');
        }
        Self::from_text(&text)
    }

    /// Parse a level from a text file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }
}

/// Matches `<color>: <id>, <id>, ...` headers of multi-color levels.
fn is_color_line(line: &str) -> bool {
    let Some((color, ids)) = line.split_once(':') else {
        return false;
    };
    if color.is_empty() || !color.chars().all(|c| c.is_ascii_lowercase()) {
        return false;
    }
    ids.split(',').all(|id| {
        let mut chars = id.trim().chars();
        matches!(
            (chars.next(), chars.next()),
            (Some('0'..='9' | 'A'..='Z'), None)
        )
    })
}

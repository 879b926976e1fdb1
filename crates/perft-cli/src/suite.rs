//! Perft suite files.
//!
//! A suite is a TOML file listing positions with their known node counts,
//! one entry per depth starting at 1:
//!
//! ```toml
//! [[case]]
//! name = "startpos"
//! fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
//! nodes = [20, 400, 8902]
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a suite.
#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Failed to read suite file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse suite: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Suite has no cases")]
    Empty,
    #[error("Case '{0}' lists no node counts")]
    NoCounts(String),
}

/// One position and its expected perft counts.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PerftCase {
    pub name: String,
    pub fen: String,
    /// `nodes[d - 1]` is the expected count at depth `d`.
    pub nodes: Vec<u64>,
}

impl PerftCase {
    /// Iterates over `(depth, expected nodes)` pairs, shallowest first.
    pub fn depths(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, &nodes)| (i as u32 + 1, nodes))
    }
}

#[derive(Debug, Deserialize)]
pub struct PerftSuite {
    #[serde(rename = "case", default)]
    pub cases: Vec<PerftCase>,
}

impl PerftSuite {
    /// Reads and validates a suite file.
    pub fn load(path: &Path) -> Result<Self, SuiteError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses and validates suite text.
    pub fn parse(content: &str) -> Result<Self, SuiteError> {
        let suite: PerftSuite = toml::from_str(content)?;
        if suite.cases.is_empty() {
            return Err(SuiteError::Empty);
        }
        if let Some(case) = suite.cases.iter().find(|c| c.nodes.is_empty()) {
            return Err(SuiteError::NoCounts(case.name.clone()));
        }
        Ok(suite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_movegen::Position;

    #[test]
    fn parse_suite() {
        let suite = PerftSuite::parse(
            r#"
[[case]]
name = "startpos"
fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
nodes = [20, 400]

[[case]]
name = "position_3"
fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -"
nodes = [14]
"#,
        )
        .unwrap();

        assert_eq!(suite.cases.len(), 2);
        assert_eq!(suite.cases[0].name, "startpos");
        assert_eq!(
            suite.cases[0].depths().collect::<Vec<_>>(),
            vec![(1, 20), (2, 400)]
        );
        assert_eq!(suite.cases[1].nodes, vec![14]);
    }

    #[test]
    fn empty_suite_is_rejected() {
        assert!(matches!(PerftSuite::parse(""), Err(SuiteError::Empty)));
    }

    #[test]
    fn case_without_counts_is_rejected() {
        let err = PerftSuite::parse(
            r#"
[[case]]
name = "bare"
fen = "8/8/8/8/8/8/8/8 w - -"
nodes = []
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SuiteError::NoCounts(name) if name == "bare"));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(matches!(
            PerftSuite::parse("[[case]]\nname = 3"),
            Err(SuiteError::ParseError(_))
        ));
    }

    #[test]
    fn bundled_suite_is_valid() {
        let suite = PerftSuite::parse(include_str!("../suites/standard.toml")).unwrap();
        assert!(suite.cases.len() >= 5);
        for case in &suite.cases {
            assert!(
                Position::from_fen(&case.fen).is_ok(),
                "{} has an invalid FEN",
                case.name
            );
        }
    }
}

//! Shared domain vocabulary
//!
//! Core identifiers used by both the ingestion pipeline and the read API.

use serde::{Deserialize, Serialize};

/// Kind of timed session within a race weekend
///
/// Each round of a season holds a qualifying and a race, and sprint rounds
/// additionally hold a sprint qualifying and a sprint race. The kind is part
/// of the session's natural key `(year, round, kind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Race,
    Qualifying,
    SprintRace,
    SprintQualifying,
}

impl SessionKind {
    /// All session kinds ingested by default, in processing order
    pub fn all() -> [SessionKind; 4] {
        [
            SessionKind::Race,
            SessionKind::Qualifying,
            SessionKind::SprintRace,
            SessionKind::SprintQualifying,
        ]
    }

    /// Stable lowercase identifier used in storage and CLI arguments
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Race => "race",
            SessionKind::Qualifying => "qualifying",
            SessionKind::SprintRace => "sprint_race",
            SessionKind::SprintQualifying => "sprint_qualifying",
        }
    }

    /// Race-like sessions award points and carry a fastest-lap marker
    pub fn is_race_like(self) -> bool {
        matches!(self, SessionKind::Race | SessionKind::SprintRace)
    }

    /// Qualifying-like sessions carry Q1/Q2/Q3 times and award no points
    pub fn is_qualifying_like(self) -> bool {
        matches!(self, SessionKind::Qualifying | SessionKind::SprintQualifying)
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionKind {
    type Err = crate::error::PitwallError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "race" => Ok(SessionKind::Race),
            "qualifying" => Ok(SessionKind::Qualifying),
            "sprint_race" => Ok(SessionKind::SprintRace),
            "sprint_qualifying" => Ok(SessionKind::SprintQualifying),
            other => Err(crate::error::PitwallError::UnknownSessionKind(
                other.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_str() {
        for kind in SessionKind::all() {
            let parsed: SessionKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let parsed: SessionKind = "Sprint_Race".parse().unwrap();
        assert_eq!(parsed, SessionKind::SprintRace);
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!("practice".parse::<SessionKind>().is_err());
    }

    #[test]
    fn test_race_like_partition() {
        assert!(SessionKind::Race.is_race_like());
        assert!(SessionKind::SprintRace.is_race_like());
        assert!(SessionKind::Qualifying.is_qualifying_like());
        assert!(SessionKind::SprintQualifying.is_qualifying_like());
        assert!(!SessionKind::Qualifying.is_race_like());
    }
}

//! Category ingesters
//!
//! One module per resource category. Each ingester takes an already-loaded
//! session bundle, re-checks inside its own transaction that the category is
//! still absent, transforms the upstream slice through a pure builder that
//! applies the per-category dropping rules, and batch-inserts the rows. One
//! category's failure never touches another's rows.

pub mod laps;
pub mod messages;
pub mod results;
pub mod track_status;
pub mod weather;

use serde::{Deserialize, Serialize};

/// The five independently-tracked data slices of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Results,
    Laps,
    Weather,
    TrackStatus,
    Messages,
}

impl Category {
    /// All categories, in dispatch order
    pub fn all() -> [Category; 5] {
        [
            Category::Results,
            Category::Laps,
            Category::Weather,
            Category::TrackStatus,
            Category::Messages,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Results => "results",
            Category::Laps => "laps",
            Category::Weather => "weather",
            Category::TrackStatus => "track_status",
            Category::Messages => "messages",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Convert an upstream float field to an integer column value
pub(crate) fn as_int(value: Option<f64>) -> Option<i32> {
    value.filter(|v| v.is_finite()).map(|v| v as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_lists_every_category_once() {
        let all = Category::all();
        assert_eq!(all.len(), 5);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_as_int_truncates() {
        assert_eq!(as_int(Some(3.0)), Some(3));
        assert_eq!(as_int(Some(17.9)), Some(17));
        assert_eq!(as_int(None), None);
    }
}

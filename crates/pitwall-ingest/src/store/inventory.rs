//! Existence Checker
//!
//! Answers, from storage alone, what a session already has: the session row
//! itself plus a has-at-least-one-row flag per category. A fully-ingested
//! session is recognized here before any network access, which is the entire
//! resumption story for interrupted runs.

use anyhow::{Context, Result};
use sqlx::{PgExecutor, PgPool};

use pitwall_common::SessionKind;

use crate::categories::Category;

/// What storage already holds for one (year, round, kind) session
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionInventory {
    /// Internal session id, None when the session row itself does not exist
    pub session_id: Option<i32>,
    pub results: bool,
    pub laps: bool,
    pub weather: bool,
    pub track_status: bool,
    pub messages: bool,
}

impl SessionInventory {
    /// Pure read of current completeness; no upstream contact, no writes
    pub async fn check(pool: &PgPool, year: i32, round: i32, kind: SessionKind) -> Result<Self> {
        let session_id = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM sessions WHERE year = $1 AND round = $2 AND session_kind = $3",
        )
        .bind(year)
        .bind(round)
        .bind(kind.as_str())
        .fetch_optional(pool)
        .await
        .context("Failed to look up session row")?;

        let Some(id) = session_id else {
            return Ok(Self::default());
        };

        let mut inventory = Self {
            session_id: Some(id),
            ..Self::default()
        };

        for category in Category::all() {
            let present = category_present(pool, id, category).await?;
            match category {
                Category::Results => inventory.results = present,
                Category::Laps => inventory.laps = present,
                Category::Weather => inventory.weather = present,
                Category::TrackStatus => inventory.track_status = present,
                Category::Messages => inventory.messages = present,
            }
        }

        Ok(inventory)
    }

    pub fn has(&self, category: Category) -> bool {
        match category {
            Category::Results => self.results,
            Category::Laps => self.laps,
            Category::Weather => self.weather,
            Category::TrackStatus => self.track_status,
            Category::Messages => self.messages,
        }
    }

    /// All five categories present
    pub fn is_complete(&self) -> bool {
        Category::all().iter().all(|c| self.has(*c))
    }

    /// Categories still absent, in dispatch order
    pub fn missing(&self) -> Vec<Category> {
        Category::all()
            .into_iter()
            .filter(|c| !self.has(*c))
            .collect()
    }
}

/// Does the session have at least one row in the category's table?
///
/// Presence, not a count reconciliation: one row marks the category complete.
/// Also used by the ingesters for their re-check inside the write transaction.
pub async fn category_present<'e, E: PgExecutor<'e>>(
    executor: E,
    session_id: i32,
    category: Category,
) -> Result<bool> {
    let sql = match category {
        Category::Results => "SELECT EXISTS(SELECT 1 FROM session_results WHERE session_id = $1)",
        Category::Laps => "SELECT EXISTS(SELECT 1 FROM laps WHERE session_id = $1)",
        Category::Weather => "SELECT EXISTS(SELECT 1 FROM weather_data WHERE session_id = $1)",
        Category::TrackStatus => "SELECT EXISTS(SELECT 1 FROM track_status WHERE session_id = $1)",
        Category::Messages => {
            "SELECT EXISTS(SELECT 1 FROM race_control_messages WHERE session_id = $1)"
        }
    };

    sqlx::query_scalar::<_, bool>(sql)
        .bind(session_id)
        .fetch_one(executor)
        .await
        .with_context(|| format!("Failed to check {} presence", category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inventory_reports_everything_missing() {
        let inventory = SessionInventory::default();
        assert!(!inventory.is_complete());
        assert_eq!(inventory.missing().len(), 5);
    }

    #[test]
    fn test_partial_inventory_missing_order() {
        let inventory = SessionInventory {
            session_id: Some(7),
            results: true,
            laps: true,
            weather: false,
            track_status: true,
            messages: false,
        };
        assert!(!inventory.is_complete());
        assert_eq!(
            inventory.missing(),
            vec![Category::Weather, Category::Messages]
        );
    }

    #[test]
    fn test_full_inventory_is_complete() {
        let inventory = SessionInventory {
            session_id: Some(7),
            results: true,
            laps: true,
            weather: true,
            track_status: true,
            messages: true,
        };
        assert!(inventory.is_complete());
        assert!(inventory.missing().is_empty());
    }
}

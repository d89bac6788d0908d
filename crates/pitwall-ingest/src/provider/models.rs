//! Upstream-shaped wire records
//!
//! These structs mirror the provider's JSON payloads field for field. The
//! provider backfills its archive from several timing feeds, so almost every
//! field can be absent; each one is therefore an explicit `Option` slot.
//! Presence/absence is mapped here at the boundary only — the ingesters
//! downstream work with these records directly and decide per category which
//! gaps make a row unusable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// One event on a season's schedule
#[derive(Debug, Clone, Deserialize)]
pub struct RawScheduleEvent {
    /// Round number within the season; 0 is pre-season testing
    pub round_number: i32,
    pub event_name: String,
    pub location: Option<String>,
    pub country: Option<String>,
    pub event_date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Fully-loaded dataset for one session
///
/// `start_time_utc` is the wall-clock reference all elapsed timestamps are
/// measured from. Control messages may arrive with wall-clock times only and
/// need it for normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionBundle {
    pub start_time_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub results: Vec<RawResultRow>,
    #[serde(default)]
    pub laps: Vec<RawLap>,
    #[serde(default)]
    pub weather: Vec<RawWeatherSample>,
    #[serde(default)]
    pub track_status: Vec<RawTrackStatusEvent>,
    #[serde(default)]
    pub race_control: Vec<RawControlMessage>,
}

/// One participant's classification row
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResultRow {
    /// Short driver code ("VER", "HAM"); the stable participant identity
    pub driver_code: Option<String>,
    pub full_name: Option<String>,
    pub driver_number: Option<i32>,
    pub country_code: Option<String>,
    pub headshot_url: Option<String>,
    pub team_name: Option<String>,
    pub team_color: Option<String>,
    pub position: Option<f64>,
    pub classified_position: Option<String>,
    pub grid_position: Option<f64>,
    pub status: Option<String>,
    pub points: Option<f64>,
    pub time_seconds: Option<f64>,
    pub laps_completed: Option<f64>,
    pub q1_time_seconds: Option<f64>,
    pub q2_time_seconds: Option<f64>,
    pub q3_time_seconds: Option<f64>,
}

/// One lap record for one participant
///
/// All timing fields are elapsed seconds since session start.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLap {
    pub driver_code: Option<String>,
    pub driver_number: Option<i32>,
    pub lap_number: Option<f64>,
    pub lap_time_seconds: Option<f64>,
    pub sector1_time_seconds: Option<f64>,
    pub sector2_time_seconds: Option<f64>,
    pub sector3_time_seconds: Option<f64>,
    pub lap_start_time_seconds: Option<f64>,
    pub sector1_session_time_seconds: Option<f64>,
    pub sector2_session_time_seconds: Option<f64>,
    pub sector3_session_time_seconds: Option<f64>,
    pub pit_in_time_seconds: Option<f64>,
    pub pit_out_time_seconds: Option<f64>,
    pub stint: Option<f64>,
    pub speed_i1: Option<f64>,
    pub speed_i2: Option<f64>,
    pub speed_fl: Option<f64>,
    pub speed_st: Option<f64>,
    pub compound: Option<String>,
    pub tyre_life: Option<f64>,
    pub fresh_tyre: Option<bool>,
    pub position: Option<f64>,
    pub track_status: Option<String>,
    pub is_personal_best: Option<bool>,
    pub is_accurate: Option<bool>,
    pub deleted: Option<bool>,
    pub deleted_reason: Option<String>,
}

/// One weather sample (~1/minute)
///
/// The weather feed ships its timestamps as elapsed-duration strings in the
/// original feed format ("0 days 00:12:00.500000"); they are parsed by the
/// ingester and unparseable samples are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWeatherSample {
    pub time: Option<String>,
    pub air_temp: Option<f64>,
    pub track_temp: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub rainfall: Option<bool>,
}

/// One track-status transition (flags, safety car)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrackStatusEvent {
    pub session_time_seconds: Option<f64>,
    /// Status code: "1" green, "2" yellow, "4" SC, "5" red, "6" VSC, "7" VSC ending
    pub status: Option<String>,
    pub message: Option<String>,
}

/// One race-control communication
///
/// Timestamps arrive either as elapsed seconds (`session_time_seconds`) or as
/// absolute wall clock (`time_utc`), depending on which feed the provider
/// sourced the message from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawControlMessage {
    pub time_utc: Option<String>,
    pub session_time_seconds: Option<f64>,
    pub category: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub driver_number: Option<String>,
    pub flag: Option<String>,
    pub scope: Option<String>,
    pub sector: Option<f64>,
    pub lap_number: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_decodes_with_missing_categories() {
        // An incomplete archive entry: no weather, no race control
        let json = r#"{
            "start_time_utc": "2024-03-02T15:00:00Z",
            "results": [{"driver_code": "VER", "position": 1.0}],
            "laps": [],
            "track_status": [{"session_time_seconds": 0.0, "status": "1"}]
        }"#;

        let bundle: SessionBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.results.len(), 1);
        assert_eq!(bundle.results[0].driver_code.as_deref(), Some("VER"));
        assert!(bundle.weather.is_empty());
        assert!(bundle.race_control.is_empty());
        assert!(bundle.start_time_utc.is_some());
    }

    #[test]
    fn test_result_row_optional_fields_absent() {
        let row: RawResultRow = serde_json::from_str(r#"{"driver_code": "ALB"}"#).unwrap();
        assert_eq!(row.driver_code.as_deref(), Some("ALB"));
        assert!(row.points.is_none());
        assert!(row.position.is_none());
        assert!(row.team_name.is_none());
    }

    #[test]
    fn test_schedule_event_decodes() {
        let json = r#"{
            "round_number": 1,
            "event_name": "Bahrain Grand Prix",
            "location": "Sakhir",
            "country": "Bahrain",
            "event_date": "2024-03-02"
        }"#;

        let event: RawScheduleEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.round_number, 1);
        assert_eq!(event.event_name, "Bahrain Grand Prix");
        assert!(event.latitude.is_none());
    }
}

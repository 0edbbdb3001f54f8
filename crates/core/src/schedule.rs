use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveTime, Timelike};
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::models::{Period, ScheduleRecord};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("unsupported schedule dataset format: .{0}")]
    UnsupportedFormat(String),
}

const WAYPOINTS: &[&str] = &[
    "ISBT",
    "Bypass",
    "Main Road",
    "Kurukshetra",
    "Karnal",
    "Ambala",
    "Depot",
];

#[derive(Debug, Clone, Default)]
pub struct ScheduleStore {
    records: Vec<ScheduleRecord>,
}

impl ScheduleStore {
    pub fn from_records(records: Vec<ScheduleRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
            .to_lowercase();

        let records = match extension.as_str() {
            "json" => {
                let raw = fs::read_to_string(path).with_context(|| {
                    format!("failed reading schedule dataset at {}", path.display())
                })?;
                serde_json::from_str(&raw).with_context(|| {
                    format!("invalid schedule dataset json at {}", path.display())
                })?
            }
            "csv" => {
                let mut reader = csv::Reader::from_path(path).with_context(|| {
                    format!("failed reading schedule dataset at {}", path.display())
                })?;
                let mut records = Vec::new();
                for row in reader.deserialize() {
                    let record: ScheduleRecord = row.with_context(|| {
                        format!("invalid schedule dataset row in {}", path.display())
                    })?;
                    records.push(record);
                }
                records
            }
            other => return Err(DatasetError::UnsupportedFormat(other.to_string()).into()),
        };

        Ok(Self::from_records(records))
    }

    pub fn sample() -> Self {
        let record = |bus_id: &str, source: &str, destination: &str, time: &str, fare: &str| {
            ScheduleRecord {
                bus_id: bus_id.to_string(),
                source: source.to_string(),
                destination: destination.to_string(),
                time: time.to_string(),
                fare: fare.to_string(),
            }
        };

        Self::from_records(vec![
            record("202", "Panipat", "Delhi", "8:30 AM", "₹45"),
            record("702", "Agra", "Lucknow", "11:45 AM", "₹220"),
            record("1001", "Agra", "Lucknow", "6:15 PM", "₹250"),
        ])
    }

    pub fn records(&self) -> &[ScheduleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_by_number(&self, number: &str) -> Option<&ScheduleRecord> {
        let wanted = number.trim();
        self.records
            .iter()
            .find(|record| record.bus_id.trim().eq_ignore_ascii_case(wanted))
    }

    pub fn find_between(&self, source: &str, destination: &str) -> Vec<&ScheduleRecord> {
        let src = source.trim().to_lowercase();
        let dst = destination.trim().to_lowercase();
        if src.is_empty() || dst.is_empty() {
            return Vec::new();
        }

        self.records
            .iter()
            .filter(|record| {
                record.source.to_lowercase() == src && record.destination.to_lowercase() == dst
            })
            .collect()
    }

    pub fn next_departure(
        &self,
        source: &str,
        destination: &str,
        now: NaiveTime,
    ) -> Option<&ScheduleRecord> {
        let mut matches = self.find_between(source, destination);
        if matches.is_empty() {
            return None;
        }

        matches.sort_by_key(|record| parse_departure(&record.time));
        matches
            .iter()
            .find(|record| parse_departure(&record.time) >= now)
            .copied()
            // everything already departed: wrap to the next day's latest run
            .or_else(|| matches.last().copied())
    }

    pub fn last_in_period(
        &self,
        source: &str,
        destination: &str,
        period: Period,
    ) -> Option<&ScheduleRecord> {
        let mut matches: Vec<&ScheduleRecord> = self
            .find_between(source, destination)
            .into_iter()
            .filter(|record| period.contains_hour(parse_departure(&record.time).hour()))
            .collect();

        matches.sort_by_key(|record| parse_departure(&record.time));
        matches.last().copied()
    }
}

/// Malformed departure strings coerce to midnight instead of failing, so they
/// sort first and are least likely to be chosen as "next".
pub fn parse_departure(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value.trim(), "%I:%M %p").unwrap_or(NaiveTime::MIN)
}

/// Stand-in for a live position feed; unseeded on purpose, never authoritative.
pub fn simulate_location(record: &ScheduleRecord) -> String {
    let mut pool: Vec<&str> = vec![record.source.as_str(), record.destination.as_str()];
    pool.extend_from_slice(WAYPOINTS);

    let mut rng = rand::thread_rng();
    pool.choose(&mut rng).copied().unwrap_or("Depot").to_string()
}

/// Same bus number, same delay; the location simulation above stays random.
pub fn simulated_delay_minutes(bus_number: &str) -> u32 {
    let digits: Vec<u8> = bus_number
        .bytes()
        .filter(|byte| byte.is_ascii_digit())
        .collect();

    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in &digits {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % 21) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(bus_id: &str, source: &str, destination: &str, time: &str) -> ScheduleRecord {
        ScheduleRecord {
            bus_id: bus_id.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            time: time.to_string(),
            fare: "₹100".to_string(),
        }
    }

    fn time(text: &str) -> NaiveTime {
        NaiveTime::parse_from_str(text, "%H:%M").unwrap()
    }

    #[test]
    fn find_by_number_keeps_leading_zeros_distinct() {
        let store = ScheduleStore::from_records(vec![
            record("0702", "Agra", "Lucknow", "9:00 AM"),
            record("702", "Agra", "Lucknow", "11:45 AM"),
        ]);

        assert_eq!(store.find_by_number("702").unwrap().time, "11:45 AM");
        assert_eq!(store.find_by_number("0702").unwrap().time, "9:00 AM");
        assert!(store.find_by_number("9999").is_none());
    }

    #[test]
    fn duplicate_bus_ids_resolve_to_first_loaded() {
        let store = ScheduleStore::from_records(vec![
            record("702", "Agra", "Lucknow", "11:45 AM"),
            record("702", "Delhi", "Karnal", "2:00 PM"),
        ]);

        assert_eq!(store.find_by_number("702").unwrap().source, "Agra");
    }

    #[test]
    fn find_between_is_case_insensitive_and_order_preserving() {
        let store = ScheduleStore::from_records(vec![
            record("1", "Agra", "Lucknow", "6:15 PM"),
            record("2", "Delhi", "Karnal", "7:00 AM"),
            record("3", "AGRA", "lucknow", "8:00 AM"),
        ]);

        let matches = store.find_between("agra", "Lucknow");
        assert_eq!(
            matches.iter().map(|r| r.bus_id.as_str()).collect::<Vec<_>>(),
            vec!["1", "3"]
        );
        assert!(store.find_between("", "Lucknow").is_empty());
    }

    #[test]
    fn next_departure_never_picks_an_earlier_bus_unless_all_departed() {
        let store = ScheduleStore::from_records(vec![
            record("late", "Agra", "Lucknow", "6:15 PM"),
            record("early", "Agra", "Lucknow", "8:30 AM"),
        ]);

        let next = store.next_departure("Agra", "Lucknow", time("09:00")).unwrap();
        assert_eq!(next.bus_id, "late");

        // past the last departure: wrap to next day, latest run wins
        let wrapped = store.next_departure("Agra", "Lucknow", time("23:00")).unwrap();
        assert_eq!(wrapped.bus_id, "late");

        let first = store.next_departure("Agra", "Lucknow", time("06:00")).unwrap();
        assert_eq!(first.bus_id, "early");

        assert!(store.next_departure("Delhi", "Karnal", time("09:00")).is_none());
    }

    #[test]
    fn malformed_times_coerce_to_midnight() {
        assert_eq!(parse_departure("garbage"), NaiveTime::MIN);
        assert_eq!(
            parse_departure("11:45 AM"),
            NaiveTime::from_hms_opt(11, 45, 0).unwrap()
        );

        let store = ScheduleStore::from_records(vec![
            record("broken", "Agra", "Lucknow", "soonish"),
            record("real", "Agra", "Lucknow", "9:00 AM"),
        ]);
        let next = store.next_departure("Agra", "Lucknow", time("08:00")).unwrap();
        assert_eq!(next.bus_id, "real");
    }

    #[test]
    fn last_in_period_honors_the_hour_interval() {
        let store = ScheduleStore::from_records(vec![
            record("a", "Agra", "Lucknow", "6:00 AM"),
            record("b", "Agra", "Lucknow", "11:30 AM"),
            record("c", "Agra", "Lucknow", "6:15 PM"),
        ]);

        let last = store
            .last_in_period("Agra", "Lucknow", Period::Morning)
            .unwrap();
        assert_eq!(last.bus_id, "b");

        assert!(store
            .last_in_period("Agra", "Lucknow", Period::Night)
            .is_none());
    }

    #[test]
    fn night_period_wraps_past_midnight() {
        assert!(Period::Night.contains_hour(23));
        assert!(Period::Night.contains_hour(2));
        assert!(!Period::Night.contains_hour(5));
    }

    #[test]
    fn simulated_location_comes_from_the_candidate_pool() {
        let record = record("702", "Agra", "Lucknow", "11:45 AM");
        let location = simulate_location(&record);
        let mut pool = vec!["Agra", "Lucknow"];
        pool.extend_from_slice(WAYPOINTS);
        assert!(pool.contains(&location.as_str()));
    }

    #[test]
    fn load_reads_json_and_rejects_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buses.json");
        std::fs::write(
            &path,
            r#"[{"bus_id":"702","source":"Agra","destination":"Lucknow","time":"11:45 AM","fare":"₹220"}]"#,
        )
        .unwrap();

        let store = ScheduleStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_number("702").unwrap().fare, "₹220");

        let bad = dir.path().join("buses.txt");
        std::fs::write(&bad, "whatever").unwrap();
        assert!(ScheduleStore::load(&bad).is_err());
        assert!(ScheduleStore::load(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn load_keeps_csv_rows_with_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buses.csv");
        std::fs::write(&path, "bus_id,source,destination,time\n702,Agra,Lucknow,11:45 AM\n")
            .unwrap();

        let store = ScheduleStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].fare, "");
        assert_eq!(store.find_between("Agra", "Lucknow").len(), 1);
    }

    #[test]
    fn simulated_delay_is_deterministic_and_bounded() {
        let first = simulated_delay_minutes("702");
        let second = simulated_delay_minutes("bus 702");
        assert_eq!(first, second);
        assert!(first <= 20);
        assert!(simulated_delay_minutes("1001") <= 20);
    }
}

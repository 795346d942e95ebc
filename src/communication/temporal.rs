//! Temporal arguments and their epoch-seconds normalization.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};

/// A date or date-time argument to an operation.
///
/// Resolved at the call site so the builder never inspects types at runtime.
/// `Unsupported` keeps whatever the caller could not express as either form;
/// it normalizes to epoch 0 with a warning instead of failing the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Temporal {
    /// Calendar date, taken as the start of that day in the local zone.
    Date(NaiveDate),
    /// Wall-clock date and time in the local zone.
    DateTime(NaiveDateTime),
    /// Anything else. Normalizes to 0.
    Unsupported(String),
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

impl Temporal {
    /// Parses `YYYY-MM-DD` or `YYYY-MM-DD[ T]HH:MM[:SS]`.
    ///
    /// Never fails: unrecognized input becomes [`Temporal::Unsupported`].
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
            return Self::Date(date);
        }
        DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
            .map_or_else(|| Self::Unsupported(input.to_string()), Self::DateTime)
    }

    /// Epoch seconds for this value in the local zone.
    pub fn to_epoch_seconds(&self) -> i64 {
        let local = match self {
            Self::Date(date) => match date.and_hms_opt(0, 0, 0) {
                Some(midnight) => midnight,
                None => return 0,
            },
            Self::DateTime(date_time) => *date_time,
            Self::Unsupported(raw) => {
                log::warn!("Unsupported temporal argument {raw:?}, using epoch 0");
                return 0;
            }
        };

        // `earliest` resolves DST folds to the first occurrence
        match Local.from_local_datetime(&local).earliest() {
            Some(instant) => instant.timestamp(),
            None => {
                log::warn!("Local time {local} does not exist in this zone, using epoch 0");
                0
            }
        }
    }
}

impl From<NaiveDate> for Temporal {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for Temporal {
    fn from(date_time: NaiveDateTime) -> Self {
        Self::DateTime(date_time)
    }
}

impl From<&str> for Temporal {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn local_epoch(naive: NaiveDateTime) -> i64 {
        Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .timestamp()
    }

    #[test]
    fn test_date_is_local_start_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let expected = local_epoch(date.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(Temporal::Date(date).to_epoch_seconds(), expected);
    }

    #[test]
    fn test_date_time_converts_directly() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap();
        assert_eq!(Temporal::DateTime(dt).to_epoch_seconds(), local_epoch(dt));
    }

    #[test]
    fn test_date_and_date_time_differ_by_time_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let noon = date.and_hms_opt(12, 0, 0).unwrap();
        let diff = Temporal::from(noon).to_epoch_seconds() - Temporal::from(date).to_epoch_seconds();
        assert_eq!(diff, 12 * 3600);
    }

    /// Records warnings so tests can check what was logged.
    struct WarnCapture {
        lines: Mutex<Vec<String>>,
    }

    impl log::Log for WarnCapture {
        fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record<'_>) {
            if self.enabled(record.metadata()) {
                self.lines
                    .lock()
                    .unwrap()
                    .push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static WARNINGS: WarnCapture = WarnCapture {
        lines: Mutex::new(Vec::new()),
    };

    fn captured_warnings() -> &'static WarnCapture {
        // Only this test module installs a logger in the unit-test binary
        let _ = log::set_logger(&WARNINGS);
        log::set_max_level(log::LevelFilter::Warn);
        &WARNINGS
    }

    #[test]
    fn test_unsupported_is_zero() {
        assert_eq!(Temporal::Unsupported("next tuesday".into()).to_epoch_seconds(), 0);
    }

    #[test]
    fn test_unsupported_logs_a_warning() {
        let warnings = captured_warnings();
        assert_eq!(Temporal::parse("the day after tomorrow").to_epoch_seconds(), 0);
        let lines = warnings.lines.lock().unwrap();
        assert!(
            lines.iter().any(|line| line.contains("the day after tomorrow")),
            "no warning recorded: {lines:?}"
        );
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            Temporal::parse("2024-03-15"),
            Temporal::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 45, 0)
            .unwrap();
        assert_eq!(Temporal::parse("2024-03-15 09:45"), Temporal::DateTime(expected));
        assert_eq!(Temporal::parse("2024-03-15T09:45:00"), Temporal::DateTime(expected));
        assert_eq!(
            Temporal::parse("15/03/2024"),
            Temporal::Unsupported("15/03/2024".to_string())
        );
    }
}

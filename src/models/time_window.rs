// Time window model for declared delivery slots

use crate::error::ScheduleError;
use chrono::{Duration, NaiveTime};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: &str = " - ";
const TIME_FORMAT: &str = "%I:%M %p";

/// A same-day delivery window, `start` strictly before `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    /// Creates a window, failing unless `start < end`
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ScheduleError> {
        if start >= end {
            return Err(ScheduleError::MalformedWindow {
                window: format!("{} - {}", format_time(start), format_time(end)),
                reason: "start is not before end".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parses a window such as `"11:08 AM - 11:38 AM"`
    pub fn parse(text: &str) -> Result<Self, ScheduleError> {
        let malformed = |reason: String| ScheduleError::MalformedWindow {
            window: text.to_string(),
            reason,
        };

        let (start_text, end_text) = text
            .split_once(SEPARATOR)
            .ok_or_else(|| malformed(format!("missing separator '{}'", SEPARATOR.trim())))?;

        let start = parse_time(start_text).map_err(&malformed)?;
        let end = parse_time(end_text).map_err(&malformed)?;

        if start >= end {
            // Windows crossing midnight are rejected rather than wrapped
            return Err(malformed("start is not before end".to_string()));
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true when the two windows share any time
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Moves the window to begin at `start`, keeping its duration.
    /// Returns `None` when the moved window would run past midnight.
    pub fn shifted_to(&self, start: NaiveTime) -> Option<TimeWindow> {
        let (end, wrapped) = start.overflowing_add_signed(self.duration());
        if wrapped != 0 || end <= start {
            return None;
        }
        Some(TimeWindow { start, end })
    }
}

impl FromStr for TimeWindow {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeWindow::parse(s)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            format_time(self.start),
            SEPARATOR,
            format_time(self.end)
        )
    }
}

fn parse_time(text: &str) -> Result<NaiveTime, String> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .map_err(|e| format!("invalid 12-hour time '{}': {}", trimmed, e))
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_window() {
        let window = TimeWindow::parse("11:08 AM - 11:38 AM").unwrap();

        assert_eq!(window.start(), hm(11, 8));
        assert_eq!(window.end(), hm(11, 38));
        assert_eq!(window.duration(), Duration::minutes(30));
    }

    #[test]
    fn test_parse_afternoon_and_unpadded_hours() {
        let window = TimeWindow::parse("9:45 AM - 1:15 PM").unwrap();

        assert_eq!(window.start(), hm(9, 45));
        assert_eq!(window.end(), hm(13, 15));
    }

    #[test]
    fn test_missing_separator() {
        let err = TimeWindow::parse("10:00 AM to 11:00 AM").unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedWindow { .. }));
    }

    #[test]
    fn test_invalid_time() {
        assert!(TimeWindow::parse("25:00 AM - 11:00 AM").is_err());
        assert!(TimeWindow::parse("10:00 - 11:00").is_err());
        assert!(TimeWindow::parse(" - ").is_err());
    }

    #[test]
    fn test_start_must_precede_end() {
        assert!(TimeWindow::parse("11:00 AM - 11:00 AM").is_err());
        assert!(TimeWindow::parse("11:30 PM - 12:30 AM").is_err());
        assert!(TimeWindow::new(hm(12, 0), hm(11, 0)).is_err());
    }

    #[test]
    fn test_display() {
        let window = TimeWindow::parse("10:00 AM - 10:30 AM").unwrap();
        assert_eq!(window.to_string(), "10:00 AM - 10:30 AM");

        let afternoon = TimeWindow::new(hm(13, 5), hm(14, 0)).unwrap();
        assert_eq!(afternoon.to_string(), "01:05 PM - 02:00 PM");
    }

    #[test]
    fn test_overlaps() {
        let a = TimeWindow::parse("10:00 AM - 10:30 AM").unwrap();
        let b = TimeWindow::parse("10:15 AM - 10:45 AM").unwrap();
        let c = TimeWindow::parse("10:30 AM - 11:00 AM").unwrap();

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_shifted_to() {
        let window = TimeWindow::parse("10:15 AM - 10:45 AM").unwrap();
        let shifted = window.shifted_to(hm(10, 30)).unwrap();

        assert_eq!(shifted.to_string(), "10:30 AM - 11:00 AM");
        assert_eq!(shifted.duration(), window.duration());

        let late = TimeWindow::parse("10:00 PM - 11:30 PM").unwrap();
        assert!(late.shifted_to(hm(23, 0)).is_none());
    }
}

//! Time-slot expansion.
//!
//! A request's current time is expanded into the hourly slot boundaries to
//! predict for. The first slot is always the next full hour strictly after
//! the current time, so a current time exactly on the hour is not itself a
//! slot.

use crate::error::PredictError;
use chrono::{DateTime, Duration, DurationRound, NaiveDate, NaiveDateTime};

/// Number of hourly slots predicted per device.
pub const HORIZON_HOURS: usize = 24;

/// Output format for slot times.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a wall-clock timestamp.
///
/// Offset-bearing (RFC 3339) inputs are converted to UTC and the offset
/// dropped. A bare date means midnight.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, PredictError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }

    Err(PredictError::InvalidTimestamp {
        input: input.to_string(),
        reason: "expected an ISO-8601 date-time such as 2020-01-01T23:30:00".to_string(),
    })
}

/// Expand `current_time` into `horizon` strictly increasing whole-hour
/// slots, starting at the next full hour.
pub fn expand_slots(
    current_time: NaiveDateTime,
    horizon: usize,
) -> Result<Vec<NaiveDateTime>, PredictError> {
    let step = Duration::hours(1);
    let out_of_range = || PredictError::InvalidTimestamp {
        input: current_time.to_string(),
        reason: "slot range exceeds supported dates".to_string(),
    };

    let floor = current_time
        .duration_trunc(step)
        .map_err(|_| out_of_range())?;

    let mut slots = Vec::with_capacity(horizon);
    let mut slot = floor;
    for _ in 0..horizon {
        slot = slot.checked_add_signed(step).ok_or_else(out_of_range)?;
        slots.push(slot);
    }

    Ok(slots)
}

/// Parse `current_time` and expand it into the standard 24-hour horizon.
pub fn next_slots(current_time: &str) -> Result<Vec<NaiveDateTime>, PredictError> {
    expand_slots(parse_timestamp(current_time)?, HORIZON_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn dt(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_parse_accepted_forms() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        assert_eq!(dt("2020-01-01T23:30:00"), expected);
        assert_eq!(dt("2020-01-01 23:30:00"), expected);
        assert_eq!(dt("2020-01-01T23:30"), expected);
        assert_eq!(dt(" 2020-01-01T23:30:00 "), expected);
        assert_eq!(dt("2020-01-02T00:30:00+01:00"), expected);
        assert_eq!(dt("2020-01-01T23:30:00.250").second(), 0);
        assert_eq!(dt("2020-01-01").hour(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_timestamp("not a time").unwrap_err();
        assert_eq!(err.kind(), "InvalidTimestamp");
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("2020-13-01T00:00:00").is_err());
    }

    #[test]
    fn test_expand_from_half_hour() {
        let slots = next_slots("2020-01-01T23:30:00").unwrap();
        assert_eq!(slots.len(), HORIZON_HOURS);
        assert_eq!(slots[0], dt("2020-01-02T00:00:00"));
        assert_eq!(slots[23], dt("2020-01-02T23:00:00"));
    }

    #[test]
    fn test_expand_exact_hour_starts_at_next_hour() {
        let slots = next_slots("2020-01-01T10:00:00").unwrap();
        assert_eq!(slots[0], dt("2020-01-01T11:00:00"));
    }

    #[test]
    fn test_expand_slot_invariants() {
        for input in [
            "2020-02-28T22:59:59",
            "2020-12-31T23:00:01",
            "2021-03-28T01:15:00",
            "2019-06-15T00:00:00",
        ] {
            let current = dt(input);
            let slots = next_slots(input).unwrap();
            assert_eq!(slots.len(), 24);
            assert!(slots[0] > current);
            assert!(slots[0] - current <= Duration::hours(1));
            for slot in &slots {
                assert_eq!((slot.minute(), slot.second(), slot.nanosecond()), (0, 0, 0));
            }
            for pair in slots.windows(2) {
                assert_eq!(pair[1] - pair[0], Duration::hours(1));
            }
        }
    }

    #[test]
    fn test_expand_custom_horizon() {
        let slots = expand_slots(dt("2020-01-01T00:10:00"), 3).unwrap();
        assert_eq!(slots.len(), 3);
        assert!(expand_slots(dt("2020-01-01T00:10:00"), 0).unwrap().is_empty());
    }
}

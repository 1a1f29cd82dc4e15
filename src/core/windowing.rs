//! Hourly resampling of raw readings.
//!
//! Readings arrive at irregular times. For every whole hour between the
//! first and the last reading, each device is marked activated if at least
//! one activated reading fell inside that hour.

use crate::data::{DeviceRegistry, Reading};
use crate::error::DataError;
use chrono::{Duration, DurationRound, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Longest span of readings, in hours, that is resampled (ten years).
pub const MAX_RESAMPLE_HOURS: i64 = 24 * 366 * 10;

/// Activation state of one device during one hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyActivation {
    /// Start of the hour
    pub hour: NaiveDateTime,
    pub device: String,
    pub activated: bool,
}

/// A one-hour window `[start, start + 1h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    pub start: NaiveDateTime,
}

impl HourWindow {
    /// The window containing `time`, if it can be represented.
    pub fn containing(time: NaiveDateTime) -> Option<Self> {
        time.duration_trunc(Duration::hours(1))
            .ok()
            .map(|start| Self { start })
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.start.checked_add_signed(Duration::hours(1))
    }

    /// Check if a timestamp falls within this window.
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        time >= self.start && self.end().map_or(true, |end| time < end)
    }

    pub fn next(&self) -> Option<Self> {
        self.end().map(|start| Self { start })
    }
}

/// Resample readings into one row per (hour, device), time-major.
///
/// Devices outside `devices` are ignored. Empty input gives an empty table.
/// Readings spanning more than [`MAX_RESAMPLE_HOURS`] are rejected, since
/// the table grows with every hour between the first and last reading.
pub fn resample_hourly(
    readings: &[Reading],
    devices: &DeviceRegistry,
) -> Result<Vec<HourlyActivation>, DataError> {
    let windows: Vec<(HourWindow, &Reading)> = readings
        .iter()
        .filter_map(|r| HourWindow::containing(r.time).map(|w| (w, r)))
        .collect();

    let (Some(first), Some(last)) = (
        windows.iter().map(|(w, _)| w.start).min(),
        windows.iter().map(|(w, _)| w.start).max(),
    ) else {
        return Ok(Vec::new());
    };

    let hours = (last - first).num_hours();
    if hours > MAX_RESAMPLE_HOURS {
        return Err(DataError::SpanTooLarge {
            hours,
            max: MAX_RESAMPLE_HOURS,
        });
    }

    let activated: HashSet<(NaiveDateTime, &str)> = windows
        .iter()
        .filter(|(_, r)| r.activated)
        .map(|(w, r)| (w.start, r.device.as_str()))
        .collect();

    let mut table = Vec::new();
    let mut window = Some(HourWindow { start: first });
    while let Some(current) = window.filter(|w| w.start <= last) {
        for device in devices.iter() {
            table.push(HourlyActivation {
                hour: current.start,
                device: device.to_string(),
                activated: activated.contains(&(current.start, device)),
            });
        }
        window = current.next();
    }

    tracing::debug!(
        readings = readings.len(),
        rows = table.len(),
        "Resampled readings into hourly table"
    );

    Ok(table)
}

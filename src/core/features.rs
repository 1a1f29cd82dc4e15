//! Feature encoding for hourly slots.
//!
//! Each (slot, device) pair becomes one feature row of four categorical
//! values. Rows are laid out time-major, device-minor, and every row keeps
//! its `(time, device)` key so predictions can be matched back.

use crate::core::vocabulary::FeatureField;
use crate::data::DeviceRegistry;
use crate::error::PredictError;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Identifies one prediction unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub time: NaiveDateTime,
    pub device: String,
}

/// Categorical features derived from a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Day of the month (1-31)
    pub day_of_month: u32,
    /// Day of the week, Monday = 0 through Sunday = 6
    pub day_of_week: u32,
    /// Hour of the day (0-23)
    pub hour_of_day: u32,
    /// Device identifier, unchanged
    pub device: String,
}

impl FeatureRow {
    pub fn from_slot(time: NaiveDateTime, device: &str) -> Self {
        Self {
            day_of_month: time.day(),
            day_of_week: time.weekday().num_days_from_monday(),
            hour_of_day: time.hour(),
            device: device.to_string(),
        }
    }

    /// The value of `field` as a category string.
    pub fn category(&self, field: FeatureField) -> Cow<'_, str> {
        match field {
            FeatureField::DayOfMonth => Cow::Owned(self.day_of_month.to_string()),
            FeatureField::DayOfWeek => Cow::Owned(self.day_of_week.to_string()),
            FeatureField::HourOfDay => Cow::Owned(self.hour_of_day.to_string()),
            FeatureField::Device => Cow::Borrowed(&self.device),
        }
    }

    /// Compact `field=value` rendering for diagnostics.
    pub fn describe(&self) -> String {
        FeatureField::ALL
            .iter()
            .map(|&field| format!("{}={}", field, self.category(field)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Feature rows together with the slot key each row came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureTable {
    keys: Vec<SlotKey>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn keys(&self) -> &[SlotKey] {
        &self.keys
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consume the table, keeping only the keys.
    pub fn into_keys(self) -> Vec<SlotKey> {
        self.keys
    }

    /// A new table holding the rows at `indices`, in that order.
    #[cfg(test)]
    pub(crate) fn select(&self, indices: &[usize]) -> FeatureTable {
        FeatureTable {
            keys: indices.iter().map(|&i| self.keys[i].clone()).collect(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

/// Build the slots × devices feature table.
pub fn encode_features(
    slots: &[NaiveDateTime],
    devices: &DeviceRegistry,
) -> Result<FeatureTable, PredictError> {
    if devices.is_empty() {
        return Err(PredictError::EmptyDeviceRegistry);
    }

    let capacity = slots.len() * devices.len();
    let mut table = FeatureTable {
        keys: Vec::with_capacity(capacity),
        rows: Vec::with_capacity(capacity),
    };

    for &time in slots {
        for device in devices.iter() {
            table.keys.push(SlotKey {
                time,
                device: device.to_string(),
            });
            table.rows.push(FeatureRow::from_slot(time, device));
        }
    }

    tracing::debug!(
        slots = slots.len(),
        devices = devices.len(),
        rows = table.len(),
        "Encoded feature table"
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::slots::{next_slots, parse_timestamp};
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_feature_row_from_slot() {
        // 2020-01-02 is a Thursday
        let row = FeatureRow::from_slot(parse_timestamp("2020-01-02T05:00:00").unwrap(), "device_1");
        assert_eq!(row.day_of_month, 2);
        assert_eq!(row.day_of_week, 3);
        assert_eq!(row.hour_of_day, 5);
        assert_eq!(row.device, "device_1");
        assert_eq!(row.describe(), "day_of_month=2 day_of_week=3 hour_of_day=5 device=device_1");
    }

    #[test]
    fn test_monday_and_sunday_numbering() {
        let monday = FeatureRow::from_slot(parse_timestamp("2020-01-06T00:00:00").unwrap(), "d");
        let sunday = FeatureRow::from_slot(parse_timestamp("2020-01-05T00:00:00").unwrap(), "d");
        assert_eq!(monday.day_of_week, 0);
        assert_eq!(sunday.day_of_week, 6);
    }

    #[test]
    fn test_table_shape_per_device() {
        let slots = next_slots("2020-01-01T23:30:00").unwrap();
        for count in 1..=6 {
            let registry = DeviceRegistry::numbered(count);
            let table = encode_features(&slots, &registry).unwrap();
            assert_eq!(table.len(), 24 * count);
            assert_eq!(table.keys().len(), table.rows().len());

            let mut per_device: HashMap<&str, HashSet<NaiveDateTime>> = HashMap::new();
            for key in table.keys() {
                per_device.entry(key.device.as_str()).or_default().insert(key.time);
            }
            assert_eq!(per_device.len(), count);
            assert!(per_device.values().all(|times| times.len() == 24));
        }
    }

    #[test]
    fn test_table_is_time_major() {
        let slots = next_slots("2020-01-01T23:30:00").unwrap();
        let registry = DeviceRegistry::from_list(["device_1", "device_2"]);
        let table = encode_features(&slots, &registry).unwrap();

        assert_eq!(table.keys()[0].device, "device_1");
        assert_eq!(table.keys()[1].device, "device_2");
        assert_eq!(table.keys()[0].time, table.keys()[1].time);
        assert_eq!(table.keys()[2].time, slots[1]);
        for (key, row) in table.keys().iter().zip(table.rows()) {
            assert_eq!(key.device, row.device);
            assert_eq!(key.time.hour(), row.hour_of_day);
        }
    }

    #[test]
    fn test_empty_registry_fails() {
        let slots = next_slots("2020-01-01T23:30:00").unwrap();
        let err = encode_features(&slots, &DeviceRegistry::default()).unwrap_err();
        assert!(matches!(err, PredictError::EmptyDeviceRegistry));
    }

    #[test]
    fn test_select_reorders_keys_and_rows_together() {
        let slots = next_slots("2020-01-01T23:30:00").unwrap();
        let table = encode_features(&slots, &DeviceRegistry::numbered(2)).unwrap();
        let selected = table.select(&[3, 0]);
        assert_eq!(selected.keys(), &[table.keys()[3].clone(), table.keys()[0].clone()]);
        assert_eq!(selected.rows()[0], table.rows()[3]);
    }
}

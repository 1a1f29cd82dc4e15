//! Closed categorical vocabularies.
//!
//! Every feature is categorical: a value is compared by exact string match
//! against the list fixed when the model was built. Values outside the list
//! are rejected, never mapped to a default.

use crate::core::features::FeatureRow;
use crate::data::DeviceRegistry;
use crate::error::PredictError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The categorical feature columns, in model column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureField {
    DayOfMonth,
    DayOfWeek,
    HourOfDay,
    Device,
}

impl FeatureField {
    pub const ALL: [FeatureField; 4] = [
        FeatureField::DayOfMonth,
        FeatureField::DayOfWeek,
        FeatureField::HourOfDay,
        FeatureField::Device,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FeatureField::DayOfMonth => "day_of_month",
            FeatureField::DayOfWeek => "day_of_week",
            FeatureField::HourOfDay => "hour_of_day",
            FeatureField::Device => "device",
        }
    }
}

impl fmt::Display for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered list of the values one field may take.
///
/// Lists are short (at most 31 entries for calendar fields), so lookup is
/// a linear scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryList {
    values: Vec<String>,
}

impl CategoryList {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of `value` in the list, if present.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn duplicate(&self) -> Option<&str> {
        self.values
            .iter()
            .enumerate()
            .find(|(i, v)| self.values[..*i].contains(*v))
            .map(|(_, v)| v.as_str())
    }
}

/// Index of each field's value within its category list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedRow {
    pub day_of_month: usize,
    pub day_of_week: usize,
    pub hour_of_day: usize,
    pub device: usize,
}

impl EncodedRow {
    pub fn index(&self, field: FeatureField) -> usize {
        match field {
            FeatureField::DayOfMonth => self.day_of_month,
            FeatureField::DayOfWeek => self.day_of_week,
            FeatureField::HourOfDay => self.hour_of_day,
            FeatureField::Device => self.device,
        }
    }
}

/// The full set of category lists a classifier was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub day_of_month: CategoryList,
    pub day_of_week: CategoryList,
    pub hour_of_day: CategoryList,
    pub device: CategoryList,
}

impl Vocabulary {
    /// The complete calendar vocabulary plus the given devices.
    pub fn calendar(devices: &DeviceRegistry) -> Self {
        Self {
            day_of_month: CategoryList::new((1..=31).map(|d: u32| d.to_string())),
            day_of_week: CategoryList::new((0..7).map(|d: u32| d.to_string())),
            hour_of_day: CategoryList::new((0..24).map(|h: u32| h.to_string())),
            device: CategoryList::new(devices.iter()),
        }
    }

    pub fn list(&self, field: FeatureField) -> &CategoryList {
        match field {
            FeatureField::DayOfMonth => &self.day_of_month,
            FeatureField::DayOfWeek => &self.day_of_week,
            FeatureField::HourOfDay => &self.hour_of_day,
            FeatureField::Device => &self.device,
        }
    }

    /// Check that every list is non-empty and free of duplicates.
    pub fn validate(&self) -> Result<(), String> {
        for field in FeatureField::ALL {
            let list = self.list(field);
            if list.is_empty() {
                return Err(format!("{field} vocabulary is empty"));
            }
            if let Some(value) = list.duplicate() {
                return Err(format!("{field} vocabulary lists '{value}' twice"));
            }
        }
        Ok(())
    }

    /// Encode a feature row, failing on the first value outside the
    /// vocabulary.
    pub fn encode(&self, row: &FeatureRow) -> Result<EncodedRow, PredictError> {
        let lookup = |field: FeatureField| {
            let value = row.category(field);
            self.list(field)
                .index_of(&value)
                .ok_or_else(|| PredictError::UnknownCategory {
                    field: field.name(),
                    value: value.into_owned(),
                })
        };

        Ok(EncodedRow {
            day_of_month: lookup(FeatureField::DayOfMonth)?,
            day_of_week: lookup(FeatureField::DayOfWeek)?,
            hour_of_day: lookup(FeatureField::HourOfDay)?,
            device: lookup(FeatureField::Device)?,
        })
    }
}

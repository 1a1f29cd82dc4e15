//! Source data types: raw activation readings and the device registry.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// A historical observation from an activation detector.
///
/// Readings are source data and are never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// When the detector reported
    pub time: NaiveDateTime,
    /// Identifier of the room/device
    pub device: String,
    /// Whether activation was detected (readings without the column count
    /// as activations)
    pub activated: bool,
}

impl Reading {
    pub fn new(time: NaiveDateTime, device: impl Into<String>) -> Self {
        Self {
            time,
            device: device.into(),
            activated: true,
        }
    }
}

/// The ordered, deduplicated set of devices a request predicts for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeviceRegistry {
    devices: Vec<String>,
}

impl DeviceRegistry {
    /// Build a registry from a configured list, keeping the first
    /// occurrence of each device in list order.
    pub fn from_list<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for device in devices {
            let device = device.into();
            if !unique.contains(&device) {
                unique.push(device);
            }
        }
        Self { devices: unique }
    }

    /// Derive a registry from historical readings: sorted and deduplicated.
    pub fn from_readings(readings: &[Reading]) -> Self {
        let mut devices: Vec<String> = readings.iter().map(|r| r.device.clone()).collect();
        devices.sort();
        devices.dedup();
        Self { devices }
    }

    /// The default configured devices, `device_1` through `device_n`.
    pub fn numbered(count: usize) -> Self {
        Self::from_list((1..=count).map(|i| format!("device_{i}")))
    }

    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.devices.iter().map(String::as_str)
    }
}

impl<'de> Deserialize<'de> for DeviceRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(Self::from_list)
    }
}

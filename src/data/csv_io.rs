//! CSV collaborators for the batch variant.
//!
//! Input files carry at least `time` (or `timestamp`) and `device` columns;
//! an optional `device_activated` column marks readings without activation.
//! Extra columns, such as a leading index, are ignored.

use crate::core::assembler::Prediction;
use crate::core::slots::{parse_timestamp, TIME_FORMAT};
use crate::core::windowing::HourlyActivation;
use crate::data::types::Reading;
use crate::error::DataError;
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawReading {
    #[serde(alias = "timestamp")]
    time: String,
    device: String,
    #[serde(default)]
    device_activated: Option<String>,
}

/// Read activation readings from CSV.
pub fn read_readings<R: Read>(input: R) -> Result<Vec<Reading>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let mut readings = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let raw: RawReading = record.deserialize(Some(&headers))?;

        let time = parse_timestamp(&raw.time).map_err(|e| DataError::InvalidReading {
            line,
            reason: e.to_string(),
        })?;
        let activated = match raw.device_activated.as_deref() {
            None | Some("") => true,
            Some(flag) => parse_flag(flag).ok_or_else(|| DataError::InvalidReading {
                line,
                reason: format!("invalid device_activated value '{flag}'"),
            })?,
        };

        readings.push(Reading {
            time,
            device: raw.device,
            activated,
        });
    }

    Ok(readings)
}

/// Read activation readings from a CSV file.
pub fn read_readings_from_path(path: &Path) -> Result<Vec<Reading>, DataError> {
    read_readings(File::open(path)?)
}

/// Write predictions as `time,device,activation_predicted`.
pub fn write_predictions<W: Write>(output: W, predictions: &[Prediction]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["time", "device", "activation_predicted"])?;
    for prediction in predictions {
        writer.write_record([
            prediction.time.format(TIME_FORMAT).to_string().as_str(),
            prediction.device.as_str(),
            bool_label(prediction.activation_predicted),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write an hourly activation table as `time,device,device_activated`.
pub fn write_hourly<W: Write>(output: W, table: &[HourlyActivation]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["time", "device", "device_activated"])?;
    for row in table {
        writer.write_record([
            row.hour.format(TIME_FORMAT).to_string().as_str(),
            row.device.as_str(),
            if row.activated { "1" } else { "0" },
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "1.0" => Some(true),
        "0" | "false" | "0.0" => Some(false),
        _ => None,
    }
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_read_readings_with_index_column() {
        let input = "\
,time,device,device_activated
0,2016-07-01 04:00:00,device_1,1
1,2016-07-01 04:15:00,device_2,0
";
        let readings = read_readings(input.as_bytes()).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].device, "device_1");
        assert!(readings[0].activated);
        assert!(!readings[1].activated);
        assert_eq!(
            readings[1].time,
            NaiveDate::from_ymd_opt(2016, 7, 1)
                .unwrap()
                .and_hms_opt(4, 15, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_read_readings_without_activation_column() {
        let input = "timestamp,device\n2016-07-01T04:00:00,device_9\n";
        let readings = read_readings(input.as_bytes()).unwrap();
        assert_eq!(readings.len(), 1);
        assert!(readings[0].activated);
    }

    #[test]
    fn test_read_readings_reports_bad_time() {
        let input = "time,device\nyesterday,device_1\n";
        let err = read_readings(input.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::InvalidReading { line: 2, .. }));
    }

    #[test]
    fn test_write_predictions_format() {
        let time = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let predictions = vec![Prediction {
            time,
            device: "device_1".to_string(),
            activation_predicted: true,
        }];

        let mut out = Vec::new();
        write_predictions(&mut out, &predictions).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "time,device,activation_predicted\n2020-01-02T00:00:00,device_1,True\n"
        );
    }
}

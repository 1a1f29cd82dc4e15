//! Source data and the batch CSV collaborators.
//!
//! This module contains:
//! - Reading and device registry types
//! - CSV input/output for the batch variant

pub mod csv_io;
pub mod types;

// Re-export commonly used types
pub use csv_io::{read_readings, read_readings_from_path, write_hourly, write_predictions};
pub use types::{DeviceRegistry, Reading};

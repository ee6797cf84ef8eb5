//! JSON serialization for measurement results.

use crate::result::Measurement;

/// Serialize a measurement to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `Measurement`).
pub fn to_json(measurement: &Measurement) -> Result<String, serde_json::Error> {
    serde_json::to_string(measurement)
}

/// Serialize a measurement to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `Measurement`).
pub fn to_json_pretty(measurement: &Measurement) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{LoopStats, MeasurementQuality};

    fn make_measurement() -> Measurement {
        Measurement {
            count: 2_000,
            short: LoopStats {
                wall_us: 25_000,
                ticks: Some(100_000_000),
            },
            long: LoopStats {
                wall_us: 25_050,
                ticks: Some(100_400_000),
            },
            cpu_mhz: Some(8_000.0),
            tsc_mhz: Some(8_000.0),
            quality: MeasurementQuality::Calibrated,
            counter: "rdtsc".to_string(),
        }
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&make_measurement()).unwrap();
        assert!(json.contains("\"count\":2000"));
        assert!(json.contains("\"cpu_mhz\":8000.0"));
        assert!(json.contains("\"quality\":\"Calibrated\""));
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json_pretty(&make_measurement()).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("cpu_mhz"));
    }
}

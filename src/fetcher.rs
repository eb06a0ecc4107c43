//! Fetches one reading for one sensor, isolating every failure.
//!
//! The collection pass must only ever observe "reading or no reading"
//! per sensor; nothing here may abort sibling fetches.

use crate::model::{Reading, Sensor, SensorKind};
use crate::source::TelemetrySource;
use log::warn;

/// Fetch the sensor's current state and convert it into a reading.
///
/// Returns `None` on transport failure, a non-numeric state string, or a
/// NaN value; each case is logged with the sensor id and skipped.
pub async fn fetch_reading(source: &dyn TelemetrySource, sensor: &Sensor) -> Option<Reading> {
    let state = match source.get_state(&sensor.entity_id).await {
        Ok(state) => state,
        Err(e) => {
            warn!("[Collect] {}: fetch failed: {}", sensor.id, e);
            return None;
        }
    };

    let value: f64 = match state.state.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(
                "[Collect] {}: state {:?} is not numeric, skipping",
                sensor.id, state.state
            );
            return None;
        }
    };

    if value.is_nan() {
        warn!("[Collect] {}: state parsed as NaN, skipping", sensor.id);
        return None;
    }

    let (temperature, humidity) = match sensor.kind {
        SensorKind::Temperature => (Some(value), None),
        SensorKind::Humidity => (None, Some(value)),
        SensorKind::Both => (Some(value), Some(value)),
    };

    Some(Reading {
        sensor_id: sensor.id.clone(),
        // Keep the source's last-update time, not collection time
        timestamp: state.last_updated,
        temperature,
        humidity,
    })
}

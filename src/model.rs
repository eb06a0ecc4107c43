//! Shared data types for sensors, readings, and location groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which values a sensor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Humidity,
    Both,
}

/// Health of a sensor or of a whole location group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Online,
    Offline,
    Error,
}

/// A discovered Home Assistant climate entity.
///
/// Identity is the stable `id` (the entity id minus its `sensor.` prefix).
/// Discovery upserts these records; they are never deleted by discovery
/// alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    /// Stable identifier, derived from the entity id.
    pub id: String,
    /// The source's native entity identifier (e.g. `sensor.buero_temperature`).
    pub entity_id: String,
    /// Human-readable display name; falls back to the entity id.
    pub name: String,
    pub kind: SensorKind,
    /// Unit string as reported by the source (`°C`, `%`, ...).
    pub unit: String,
    /// When the source last reported this entity.
    pub last_seen: DateTime<Utc>,
    pub status: SensorStatus,
}

/// One timestamped observation belonging to a sensor.
///
/// The timestamp is the source's `last_updated` field, not collection time.
/// At least one of `temperature`/`humidity` must be present; the fetcher
/// never constructs a value-less reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub sensor_id: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl Reading {
    /// A reading with neither value is invalid and must not be persisted.
    pub fn has_value(&self) -> bool {
        self.temperature.is_some() || self.humidity.is_some()
    }
}

/// A logical physical location, derived from sensor display names.
///
/// Recomputed on every read; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorGroup {
    pub location: String,
    /// Stable ids of the member sensors.
    pub sensor_ids: Vec<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub battery: Option<f64>,
    /// Most recent `last_seen` across members.
    pub last_seen: DateTime<Utc>,
    /// Merged status: any error wins, then any offline, else online.
    pub status: SensorStatus,
}

//! Groups sensors into logical locations for the dashboard.
//!
//! Pure recomputation over the current sensor set and the latest reading
//! per sensor; no write side effects, nothing persisted.

use crate::model::{Reading, Sensor, SensorGroup, SensorKind, SensorStatus};
use std::collections::{BTreeMap, HashMap};

/// What a sensor contributes to its group, derived from the display-name
/// suffix. Battery values arrive through the humidity field because the
/// classifier maps percent units to humidity-kind sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataRole {
    Temperature,
    Humidity,
    Battery,
}

/// Trailing descriptor suffixes stripped from display names.
const SUFFIXES: [(&str, DataRole); 4] = [
    ("temperature", DataRole::Temperature),
    ("humidity", DataRole::Humidity),
    ("battery", DataRole::Battery),
    ("power", DataRole::Battery),
];

/// Manufacturer/product tokens that mark an extracted "location" as a
/// device name rather than a room.
const DEVICE_NAME_TOKENS: [&str; 6] = ["dimmer", "ikea", "aqara", "sonoff", "tuya", "lumi"];

/// Group sensors by location, ordered lexicographically by location name.
pub fn group_by_location(
    sensors: &[Sensor],
    latest: &HashMap<String, Reading>,
) -> Vec<SensorGroup> {
    let mut groups: BTreeMap<String, SensorGroup> = BTreeMap::new();

    for sensor in sensors {
        let (location, role) = split_location(&sensor.name);
        if looks_like_device_name(&location) {
            continue;
        }

        let group = groups
            .entry(location.clone())
            .or_insert_with(|| SensorGroup {
                location,
                sensor_ids: Vec::new(),
                temperature: None,
                humidity: None,
                battery: None,
                last_seen: sensor.last_seen,
                status: SensorStatus::Online,
            });

        group.sensor_ids.push(sensor.id.clone());
        group.last_seen = group.last_seen.max(sensor.last_seen);
        group.status = merge_status(group.status, sensor.status);

        if let Some(reading) = latest.get(&sensor.id) {
            apply_reading(group, reading, role, sensor.kind);
        }
    }

    groups.into_values().collect()
}

/// Strip one trailing descriptor suffix, case-insensitive. No match means
/// the whole name is the location.
fn split_location(name: &str) -> (String, Option<DataRole>) {
    let trimmed = name.trim();

    for (suffix, role) in SUFFIXES {
        if trimmed.len() <= suffix.len() {
            continue;
        }
        let split_at = trimmed.len() - suffix.len();
        // get() rather than split_at: the boundary is only guaranteed to be
        // valid when the tail actually is the ASCII suffix
        let (Some(head), Some(tail)) = (trimmed.get(..split_at), trimmed.get(split_at..)) else {
            continue;
        };
        if tail.eq_ignore_ascii_case(suffix) && head.ends_with(' ') {
            return (head.trim_end().to_string(), Some(role));
        }
    }

    (trimmed.to_string(), None)
}

/// Reject extracted locations that are really manufacturer/product names,
/// e.g. "IKEA of Sweden RODRET Dimmer".
fn looks_like_device_name(location: &str) -> bool {
    let lower = location.to_lowercase();

    if DEVICE_NAME_TOKENS.iter().any(|t| lower.contains(t)) {
        return true;
    }

    // "<Vendor> of <Country>" phrasing
    if lower.split_whitespace().skip(1).any(|w| w == "of") && lower.split_whitespace().count() > 2 {
        return true;
    }

    // A bare "... Sensor" name describes hardware, not a room
    lower.split_whitespace().any(|w| w == "sensor")
}

/// Route the latest reading's values into the group slot the sensor's
/// suffix (or, absent one, its kind) selects.
fn apply_reading(group: &mut SensorGroup, reading: &Reading, role: Option<DataRole>, kind: SensorKind) {
    match role {
        Some(DataRole::Temperature) => {
            if let Some(t) = reading.temperature {
                group.temperature = Some(t);
            }
        }
        Some(DataRole::Humidity) => {
            if let Some(h) = reading.humidity {
                group.humidity = Some(h);
            }
        }
        Some(DataRole::Battery) => {
            // Percent values travel through the humidity field
            if let Some(b) = reading.humidity {
                group.battery = Some(b);
            }
        }
        None => match kind {
            SensorKind::Temperature => {
                if let Some(t) = reading.temperature {
                    group.temperature = Some(t);
                }
            }
            SensorKind::Humidity => {
                if let Some(h) = reading.humidity {
                    group.humidity = Some(h);
                }
            }
            SensorKind::Both => {
                if let Some(t) = reading.temperature {
                    group.temperature = Some(t);
                }
                if let Some(h) = reading.humidity {
                    group.humidity = Some(h);
                }
            }
        },
    }
}

/// Fixed precedence: error beats offline beats online, independent of the
/// order members are encountered in.
fn merge_status(current: SensorStatus, member: SensorStatus) -> SensorStatus {
    match (current, member) {
        (SensorStatus::Error, _) | (_, SensorStatus::Error) => SensorStatus::Error,
        (SensorStatus::Offline, _) | (_, SensorStatus::Offline) => SensorStatus::Offline,
        _ => SensorStatus::Online,
    }
}

//! Maps raw entity records to typed sensors.
//!
//! A record that does not look like a climate sensor is simply not a
//! sensor; absence of a match is a normal result, never an error.

use crate::model::{Sensor, SensorKind, SensorStatus};
use crate::source::{EntityAttributes, EntityState};

/// Entity namespace for sensor entities in Home Assistant.
const SENSOR_PREFIX: &str = "sensor.";

/// Classify one raw entity record.
///
/// Returns `None` for records outside the `sensor.` namespace and for
/// records lacking both a temperature-like and a humidity-like signal.
/// Battery sensors report percent and classify as humidity-kind; grouping
/// routes them into the battery slot by display-name suffix.
pub fn classify(entity: &EntityState) -> Option<Sensor> {
    let stable_id = entity.entity_id.strip_prefix(SENSOR_PREFIX)?;
    let kind = derive_kind(&entity.attributes)?;

    let name = entity
        .attributes
        .friendly_name
        .clone()
        .unwrap_or_else(|| entity.entity_id.clone());

    Some(Sensor {
        id: stable_id.to_string(),
        entity_id: entity.entity_id.clone(),
        name,
        kind,
        unit: entity
            .attributes
            .unit_of_measurement
            .clone()
            .unwrap_or_default(),
        last_seen: entity.last_updated,
        // A sensor that was just seen cannot be offline
        status: SensorStatus::Online,
    })
}

/// Device class wins over the unit heuristic; unrecognized device classes
/// fall through to the unit string.
fn derive_kind(attributes: &EntityAttributes) -> Option<SensorKind> {
    match attributes.device_class.as_deref() {
        Some("temperature") => return Some(SensorKind::Temperature),
        Some("humidity") => return Some(SensorKind::Humidity),
        // Battery sensors report percent and ride the humidity field
        Some("battery") => return Some(SensorKind::Humidity),
        _ => {}
    }

    let unit = attributes.unit_of_measurement.as_deref()?;
    if unit.contains('°') {
        Some(SensorKind::Temperature)
    } else if unit == "%" {
        Some(SensorKind::Humidity)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entity(entity_id: &str, attributes: EntityAttributes) -> EntityState {
        EntityState {
            entity_id: entity_id.to_string(),
            state: "21.5".to_string(),
            attributes,
            last_updated: Utc::now(),
        }
    }

    fn attrs(name: Option<&str>, unit: Option<&str>, class: Option<&str>) -> EntityAttributes {
        EntityAttributes {
            friendly_name: name.map(String::from),
            unit_of_measurement: unit.map(String::from),
            device_class: class.map(String::from),
        }
    }

    #[test]
    fn test_rejects_non_sensor_namespace() {
        let record = entity("light.buero", attrs(None, Some("°C"), None));
        assert!(classify(&record).is_none());
    }

    #[test]
    fn test_device_class_wins_over_unit() {
        let record = entity(
            "sensor.buero_temperature",
            attrs(Some("Büro Temperature"), Some("%"), Some("temperature")),
        );
        let sensor = classify(&record).unwrap();
        assert_eq!(sensor.kind, SensorKind::Temperature);
    }

    #[test]
    fn test_degree_unit_means_temperature() {
        let record = entity(
            "sensor.buero_temperature",
            attrs(Some("Büro Temperature"), Some("°C"), None),
        );
        assert_eq!(classify(&record).unwrap().kind, SensorKind::Temperature);

        let record = entity("sensor.outside", attrs(None, Some("°F"), None));
        assert_eq!(classify(&record).unwrap().kind, SensorKind::Temperature);
    }

    #[test]
    fn test_percent_unit_means_humidity() {
        let record = entity(
            "sensor.buero_humidity",
            attrs(Some("Büro Humidity"), Some("%"), None),
        );
        assert_eq!(classify(&record).unwrap().kind, SensorKind::Humidity);
    }

    #[test]
    fn test_battery_classifies_as_humidity_kind() {
        let record = entity(
            "sensor.rodret_battery",
            attrs(Some("RODRET Battery"), Some("%"), Some("battery")),
        );
        assert_eq!(classify(&record).unwrap().kind, SensorKind::Humidity);

        // Device class alone is enough; no unit required
        let record = entity(
            "sensor.rodret_battery",
            attrs(Some("RODRET Battery"), None, Some("battery")),
        );
        assert_eq!(classify(&record).unwrap().kind, SensorKind::Humidity);
    }

    #[test]
    fn test_rejects_unclassifiable_records() {
        // No unit, no device class
        let record = entity("sensor.sun_elevation", attrs(None, None, None));
        assert!(classify(&record).is_none());

        // Power meter: unit matches neither heuristic
        let record = entity("sensor.plug_power", attrs(None, Some("W"), None));
        assert!(classify(&record).is_none());
    }

    #[test]
    fn test_stable_id_strips_prefix() {
        let record = entity(
            "sensor.buero_temperature",
            attrs(Some("Büro Temperature"), Some("°C"), None),
        );
        let sensor = classify(&record).unwrap();
        assert_eq!(sensor.id, "buero_temperature");
        assert_eq!(sensor.entity_id, "sensor.buero_temperature");
    }

    #[test]
    fn test_name_falls_back_to_entity_id() {
        let record = entity("sensor.buero_temperature", attrs(None, Some("°C"), None));
        assert_eq!(classify(&record).unwrap().name, "sensor.buero_temperature");
    }

    #[test]
    fn test_fresh_sensor_is_online() {
        let record = entity("sensor.buero_temperature", attrs(None, Some("°C"), None));
        assert_eq!(classify(&record).unwrap().status, SensorStatus::Online);
    }
}

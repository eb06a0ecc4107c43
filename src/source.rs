//! Telemetry source boundary: wire types, the source trait, and the
//! Home Assistant REST client.

use crate::config::SourceConfig;
use crate::error::{HubError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One entity record as returned by `/api/states`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    /// Raw state string; numeric for climate sensors, but may be
    /// `"unavailable"` or `"unknown"`.
    pub state: String,
    #[serde(default)]
    pub attributes: EntityAttributes,
    pub last_updated: DateTime<Utc>,
}

/// The subset of entity attributes the classifier cares about.
/// Everything else in the payload is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityAttributes {
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub unit_of_measurement: Option<String>,
    #[serde(default)]
    pub device_class: Option<String>,
}

/// Read access to the external telemetry source.
///
/// `get_all_states` failing is fatal to the caller; `get_state` failures
/// are isolated per entity by the reading fetcher.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn get_all_states(&self) -> Result<Vec<EntityState>>;
    async fn get_state(&self, entity_id: &str) -> Result<EntityState>;
}

/// Home Assistant REST API client with bearer-token auth.
pub struct HaClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HaClient {
    /// Create a new client from configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(HubError::InvalidSourceUrl("empty base URL".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn states_url(&self) -> String {
        format!("{}/api/states", self.base_url)
    }

    fn state_url(&self, entity_id: &str) -> String {
        format!("{}/api/states/{}", self.base_url, entity_id)
    }
}

#[async_trait]
impl TelemetrySource for HaClient {
    async fn get_all_states(&self) -> Result<Vec<EntityState>> {
        let states = self
            .client
            .get(self.states_url())
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<EntityState>>()
            .await?;
        Ok(states)
    }

    async fn get_state(&self, entity_id: &str) -> Result<EntityState> {
        let response = self
            .client
            .get(self.state_url(entity_id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(HubError::EntityNotFound(entity_id.to_string()));
        }

        let state = response.error_for_status()?.json::<EntityState>().await?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building_strips_trailing_slash() {
        let client = HaClient::new(&SourceConfig {
            base_url: "http://ha.local:8123/".to_string(),
            token: "secret".to_string(),
            request_timeout_secs: 10,
        })
        .unwrap();

        assert_eq!(client.states_url(), "http://ha.local:8123/api/states");
        assert_eq!(
            client.state_url("sensor.buero_temperature"),
            "http://ha.local:8123/api/states/sensor.buero_temperature"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let result = HaClient::new(&SourceConfig {
            base_url: String::new(),
            token: String::new(),
            request_timeout_secs: 10,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_entity_state_parses_ha_payload() {
        let json = r#"{
            "entity_id": "sensor.buero_temperature",
            "state": "21.5",
            "attributes": {
                "friendly_name": "Büro Temperature",
                "unit_of_measurement": "°C",
                "device_class": "temperature",
                "state_class": "measurement"
            },
            "last_changed": "2024-05-01T10:00:00+00:00",
            "last_updated": "2024-05-01T10:00:00+00:00"
        }"#;

        let state: EntityState = serde_json::from_str(json).unwrap();
        assert_eq!(state.entity_id, "sensor.buero_temperature");
        assert_eq!(state.state, "21.5");
        assert_eq!(state.attributes.friendly_name.as_deref(), Some("Büro Temperature"));
        assert_eq!(state.attributes.unit_of_measurement.as_deref(), Some("°C"));
    }

    #[test]
    fn test_entity_state_tolerates_missing_attributes() {
        let json = r#"{
            "entity_id": "sun.sun",
            "state": "above_horizon",
            "last_updated": "2024-05-01T10:00:00+00:00"
        }"#;

        let state: EntityState = serde_json::from_str(json).unwrap();
        assert!(state.attributes.friendly_name.is_none());
        assert!(state.attributes.device_class.is_none());
    }
}

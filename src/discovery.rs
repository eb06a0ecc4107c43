//! Discovers climate sensors from the full source snapshot.

use crate::classify::classify;
use crate::error::Result;
use crate::model::Sensor;
use crate::source::TelemetrySource;
use log::info;
use std::sync::Arc;

/// Runs the full-snapshot fetch and classification.
///
/// A snapshot failure propagates to the caller; there is nothing
/// meaningful to discover without one. Retry timing belongs to the
/// collector's discovery interval, not here.
pub struct DiscoveryService {
    source: Arc<dyn TelemetrySource>,
}

impl DiscoveryService {
    pub fn new(source: Arc<dyn TelemetrySource>) -> Self {
        Self { source }
    }

    /// Fetch all entity states and return the ones that classify as sensors.
    pub async fn discover(&self) -> Result<Vec<Sensor>> {
        let states = self.source.get_all_states().await?;
        let total = states.len();

        let sensors: Vec<Sensor> = states.iter().filter_map(classify).collect();
        info!(
            "[Discovery] {} of {} entities classified as climate sensors",
            sensors.len(),
            total
        );
        Ok(sensors)
    }
}

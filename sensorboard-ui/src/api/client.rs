//! HTTP API Client
//!
//! Fetches reading batches from the page's own origin.

use async_trait::async_trait;
use gloo_net::http::Request;
use sensorboard::{ReadingBatch, SensorSource, SourceError, SENSOR_DATA_PATH};

/// `GET /sensor-data` relative to the page
#[derive(Debug, Clone, Default)]
pub struct GlooSource;

impl GlooSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl SensorSource for GlooSource {
    async fn fetch(&self) -> Result<ReadingBatch, SourceError> {
        let response = Request::get(SENSOR_DATA_PATH)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if !response.ok() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: response.status(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(ReadingBatch::from_json(&body)?)
    }

    fn describe(&self) -> String {
        SENSOR_DATA_PATH.to_string()
    }
}

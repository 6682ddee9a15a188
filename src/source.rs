//! Sensor sources
//!
//! Where reading batches come from. The poller only sees [`SensorSource`];
//! the terminal watcher plugs in [`HttpSource`], the browser dashboard its own
//! fetch-based source.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::reading::ReadingBatch;

/// Path of the sensor-data endpoint, relative to the server root
pub const SENSOR_DATA_PATH: &str = "/sensor-data";

/// A source of reading batches, newest first
#[async_trait(?Send)]
pub trait SensorSource {
    /// Fetch the latest batch
    async fn fetch(&self) -> Result<ReadingBatch, SourceError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

#[async_trait(?Send)]
impl<T: SensorSource + ?Sized> SensorSource for std::rc::Rc<T> {
    async fn fetch(&self) -> Result<ReadingBatch, SourceError> {
        (**self).fetch().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(feature = "native")]
pub use http::HttpSource;

#[cfg(feature = "native")]
mod http {
    use super::*;
    use reqwest::Client;

    /// Polls `GET {base_url}/sensor-data` over HTTP(S).
    ///
    /// No request timeout is set; a hung request simply never completes.
    pub struct HttpSource {
        client: Client,
        url: String,
    }

    impl HttpSource {
        /// Create a source for the server at `base_url`
        pub fn new(base_url: &str) -> Result<Self, SourceError> {
            Self::with_options(base_url, false)
        }

        /// Create a source, optionally accepting self-signed certificates
        pub fn with_options(base_url: &str, accept_invalid_certs: bool) -> Result<Self, SourceError> {
            let client = Client::builder()
                .danger_accept_invalid_certs(accept_invalid_certs)
                .build()
                .map_err(|e| SourceError::Config(e.to_string()))?;

            Ok(Self {
                client,
                url: endpoint_url(base_url),
            })
        }

        /// Full endpoint URL
        pub fn url(&self) -> &str {
            &self.url
        }
    }

    #[async_trait(?Send)]
    impl SensorSource for HttpSource {
        async fn fetch(&self) -> Result<ReadingBatch, SourceError> {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| SourceError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(SourceError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response
                .text()
                .await
                .map_err(|e| SourceError::Network(e.to_string()))?;

            let batch = ReadingBatch::from_json(&body)?;
            tracing::debug!(url = %self.url, readings = batch.len(), "Fetched sensor data");
            Ok(batch)
        }

        fn describe(&self) -> String {
            self.url.clone()
        }
    }
}

/// Join the endpoint path onto a server base URL
pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), SENSOR_DATA_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("https://localhost:5001"),
            "https://localhost:5001/sensor-data"
        );
        assert_eq!(
            endpoint_url("http://10.0.0.4:5001/"),
            "http://10.0.0.4:5001/sensor-data"
        );
        assert_eq!(endpoint_url(""), "/sensor-data");
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_http_source_url() {
        let source = HttpSource::new("http://127.0.0.1:5001/").unwrap();
        assert_eq!(source.url(), "http://127.0.0.1:5001/sensor-data");
        assert_eq!(source.describe(), "http://127.0.0.1:5001/sensor-data");
    }
}

/// Fetching the latest observation from the weather API
use log::debug;
use std::fmt;
use std::future::Future;
use tokio::time::Duration;
use url::Url;

use crate::observation::clamp::RawReading;

/// Every way a fetch can fail. All of them mean "no data" to the console.
#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Status(u16),
    InvalidShape,
    Incomplete(Vec<&'static str>),
    Timeout,
    Aborted,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "request failed: {}", e),
            FetchError::Status(code) => write!(f, "API returned status code {}", code),
            FetchError::InvalidShape => write!(f, "reading is not a field mapping"),
            FetchError::Incomplete(missing) => {
                write!(f, "reading is missing fields: {}", missing.join(", "))
            }
            FetchError::Timeout => write!(f, "fetch timed out"),
            FetchError::Aborted => write!(f, "fetch task aborted"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Http(e)
    }
}

/// Anything that can produce the latest raw reading
pub trait ObservationSource: Send + Sync + 'static {
    fn latest(&self) -> impl Future<Output = Result<RawReading, FetchError>> + Send;
}

/// Accept only a JSON object; anything else is an invalid shape
pub fn into_reading(value: serde_json::Value) -> Result<RawReading, FetchError> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(FetchError::InvalidShape),
    }
}

/// `GET <api_url>` against the station's REST API
pub struct HttpObservationSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpObservationSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpObservationSource { client, url })
    }
}

impl ObservationSource for HttpObservationSource {
    async fn latest(&self) -> Result<RawReading, FetchError> {
        debug!("Requesting latest observation from {}", self.url);
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        // A body that is not JSON at all is a shape problem, not a transport one
        let body = response.bytes().await?;
        let value = serde_json::from_slice(&body).map_err(|_| FetchError::InvalidShape)?;
        into_reading(value)
    }
}

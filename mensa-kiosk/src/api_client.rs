use mensa_model::{banner, Banner};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors surfaced by the kiosk API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server is gated behind maintenance mode; hold and poll
    #[error("server is in maintenance mode")]
    Maintenance,

    /// Transport-level failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Unexpected response status
    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Envelope decoded but carried no payload
    #[error("empty response from server")]
    EmptyResponse,
}

/// Standard JSON envelope returned by the mensa server
#[derive(Debug, serde::Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
}

/// API client for the mensa server
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_version: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        log::info!("[ApiClient] Creating new API client with base URL: {base_url}");

        Self {
            client,
            base_url,
            api_version: "v1".to_string(),
        }
    }

    /// Build a versioned API URL
    pub fn build_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/api/{}/{}", self.base_url, self.api_version, path)
    }

    /// Execute a request and handle common errors
    async fn execute_request<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;

        match response.status() {
            StatusCode::OK => {
                let api_response: ApiResponse<T> = response.json().await?;
                api_response.data.ok_or(ApiError::EmptyResponse)
            }
            StatusCode::SERVICE_UNAVAILABLE => Err(ApiError::Maintenance),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(ApiError::Status { status, body })
            }
        }
    }

    /// GET request against a versioned API path
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.build_url(path);
        log::debug!("[ApiClient] GET request to: {url}");
        self.execute_request(self.client.get(&url)).await
    }

    /// Fetch the banner rotation, sorted into display order.
    pub async fn fetch_banners(&self) -> Result<Vec<Banner>, ApiError> {
        let banners: Vec<Banner> = self.get("banners").await?;
        Ok(banner::ordered(banners))
    }

    /// Resolve the file-serving URL a banner's media is loaded from.
    pub fn media_url(&self, banner: &Banner) -> String {
        self.build_url(&format!("media/{}", banner.file.trim_start_matches('/')))
    }
}

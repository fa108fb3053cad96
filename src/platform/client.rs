//! RapidAPI-backed comment source

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::{CommentSource, Platform, PostTarget, facebook, instagram, youtube};
use crate::comment::CommentPage;
use crate::{Error, Result};

/// Credentials and endpoints for the upstream scraping APIs
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Shared RapidAPI key, sent with every request
    pub api_key: Option<SecretString>,
    pub instagram_endpoint: String,
    pub youtube_endpoint: String,
    pub facebook_endpoint: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            instagram_endpoint: instagram::DEFAULT_ENDPOINT.to_string(),
            youtube_endpoint: youtube::DEFAULT_ENDPOINT.to_string(),
            facebook_endpoint: facebook::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl UpstreamConfig {
    fn endpoint(&self, platform: Platform) -> &str {
        match platform {
            Platform::Instagram => &self.instagram_endpoint,
            Platform::YouTube => &self.youtube_endpoint,
            Platform::Facebook => &self.facebook_endpoint,
        }
    }
}

/// Comment source that talks to the three RapidAPI scrapers
pub struct RapidApiClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl RapidApiClient {
    /// Create a client from explicit upstream configuration
    #[must_use]
    pub fn new(config: UpstreamConfig) -> Self {
        if config.api_key.is_none() {
            tracing::warn!("RAPIDAPI_KEY not configured - upstream requests will likely be rejected");
        }
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// GET one endpoint and decode the body as JSON
    async fn get_json(&self, platform: Platform, params: &[(&str, String)]) -> Result<Value> {
        let endpoint = self.config.endpoint(platform);
        let host = rapidapi_host(endpoint)?;

        let mut request = self
            .client
            .get(endpoint)
            .query(params)
            .header("X-RapidAPI-Host", host);
        if let Some(key) = &self.config.api_key {
            request = request.header("X-RapidAPI-Key", key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("{platform} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Fetch(format!("{platform} API returned {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Fetch(format!("{platform} API returned invalid JSON: {e}")))
    }
}

#[async_trait]
impl CommentSource for RapidApiClient {
    async fn fetch_page(&self, target: &PostTarget, token: Option<&str>) -> Result<CommentPage> {
        let platform = target.platform();
        tracing::info!(%platform, id = target.identifier(), has_token = token.is_some(), "fetching comments");

        let page = match target {
            PostTarget::Instagram { shortcode } => {
                let payload = self
                    .get_json(platform, &instagram::query(shortcode, token))
                    .await?;
                instagram::parse_page(&payload)
            }
            PostTarget::YouTube { video_id } => {
                let payload = self
                    .get_json(platform, &youtube::query(video_id, token))
                    .await?;
                youtube::parse_page(&payload)
            }
            PostTarget::Facebook { link } => {
                let payload = self.get_json(platform, &facebook::query(link)).await?;
                facebook::parse_page(&payload)
            }
        };

        tracing::info!(
            %platform,
            count = page.comments.len(),
            next_token = ?page.next_token,
            "fetched comments"
        );
        Ok(page)
    }
}

/// Host header value RapidAPI routes on, taken from the endpoint URL
fn rapidapi_host(endpoint: &str) -> Result<String> {
    let url = url::Url::parse(endpoint)
        .map_err(|e| Error::Config(format!("invalid upstream endpoint {endpoint}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::Config(format!("upstream endpoint has no host: {endpoint}")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

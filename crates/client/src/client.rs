use std::time::Duration;

use async_trait::async_trait;
use photo_search_core::{LocationInfo, PhotoDescriptor, PhotoSource, SearchPage, SourceResult};
use serde::de::DeserializeOwned;

use crate::api_types::{LocationResponse, SearchResponse, Status};
use crate::error::ClientError;

/// Flickr error code for "photo has no location information".
pub const NO_LOCATION_CODE: i64 = 2;

/// Longest body excerpt kept in error messages.
const MAX_BODY_EXCERPT: usize = 200;

/// Client for the Flickr REST API and static image host.
pub struct FlickrClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) api_url: String,
    pub(crate) image_url: String,
}

impl std::fmt::Debug for FlickrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlickrClient")
            .field("client", &self.client)
            .field("api_key", &"***")
            .field("api_url", &self.api_url)
            .field("image_url", &self.image_url)
            .finish()
    }
}

impl FlickrClient {
    /// Creates a client against explicit endpoints.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_endpoints(
        api_key: String,
        api_url: impl Into<String>,
        image_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ClientError::ClientInit(e.to_string()))?;
        let image_url = image_url.into().trim_end_matches('/').to_owned();
        Ok(Self { client, api_key, api_url: api_url.into(), image_url })
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Full URL of the image for `descriptor`.
    #[must_use]
    pub fn image_url_for(&self, descriptor: &PhotoDescriptor) -> String {
        format!("{}/{}", self.image_url, descriptor.image_path())
    }

    /// Runs `flickr.photos.search` restricted to geotagged photos.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, malformed
    /// JSON or a `stat: fail` envelope.
    pub async fn search(
        &self,
        keyword: &str,
        per_page: u32,
        page: u32,
    ) -> Result<SearchPage, ClientError> {
        let per_page = per_page.to_string();
        let page = page.to_string();
        let body = self
            .call_method("flickr.photos.search", &[
                ("text", keyword),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
                ("has_geo", "1"),
            ])
            .await?;
        let status: Status = parse_json(&body, "search envelope")?;
        if !status.is_ok() {
            return Err(ClientError::Api { code: status.code, message: status.message });
        }
        let response: SearchResponse = parse_json(&body, "search response")?;
        Ok(response.photos.into())
    }

    /// Runs `flickr.photos.geo.getLocation`.
    ///
    /// `Ok(None)` means the photo carries no location.
    ///
    /// # Errors
    /// Returns an error on transport failure, malformed JSON, unparsable
    /// coordinates or any API failure other than "no location".
    pub async fn location(&self, photo_id: &str) -> Result<Option<LocationInfo>, ClientError> {
        let body = self.call_method("flickr.photos.geo.getLocation", &[("photo_id", photo_id)]).await?;
        let status: Status = parse_json(&body, "location envelope")?;
        if !status.is_ok() {
            if status.code == NO_LOCATION_CODE {
                tracing::debug!(photo_id, "photo has no location");
                return Ok(None);
            }
            return Err(ClientError::Api { code: status.code, message: status.message });
        }
        let response: LocationResponse = parse_json(&body, "location response")?;
        let location = response.photo.location;
        let latitude = location
            .latitude
            .to_f64()
            .ok_or_else(|| ClientError::InvalidCoordinate(format!("latitude of photo {photo_id}")))?;
        let longitude = location
            .longitude
            .to_f64()
            .ok_or_else(|| ClientError::InvalidCoordinate(format!("longitude of photo {photo_id}")))?;
        Ok(Some(LocationInfo::new(latitude, longitude)))
    }

    /// Downloads the raw image bytes for `descriptor`.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn image_bytes(&self, descriptor: &PhotoDescriptor) -> Result<Vec<u8>, ClientError> {
        let url = self.image_url_for(descriptor);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            return Err(ClientError::HttpStatus {
                code: status.as_u16(),
                body: truncate(&body, MAX_BODY_EXCERPT).to_owned(),
            });
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn call_method(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<String, ClientError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("method", method),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
                ("nojsoncallback", "1"),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            tracing::warn!(method, code = status.as_u16(), "Flickr call failed");
            return Err(ClientError::HttpStatus {
                code: status.as_u16(),
                body: truncate(&body, MAX_BODY_EXCERPT).to_owned(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PhotoSource for FlickrClient {
    async fn search_photos(
        &self,
        keyword: &str,
        per_page: u32,
        page: u32,
    ) -> SourceResult<SearchPage> {
        Ok(self.search(keyword, per_page, page).await?)
    }

    async fn fetch_location(&self, photo_id: &str) -> SourceResult<Option<LocationInfo>> {
        Ok(self.location(photo_id).await?)
    }

    async fn fetch_image_bytes(&self, descriptor: &PhotoDescriptor) -> SourceResult<Vec<u8>> {
        Ok(self.image_bytes(descriptor).await?)
    }
}

fn parse_json<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::JsonParse {
        context: format!("{context} (body: {})", truncate(body, MAX_BODY_EXCERPT)),
        source: e,
    })
}

/// Truncates a string to the given maximum length at a char boundary.
pub(crate) fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s.get(..end).unwrap_or_default()
}

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::video::VideoReference;

use super::{ClientIdentity, Extractor, FetchError, VideoMetadata};

const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// Wraps an extractor with a cheap existence check against the public
/// oEmbed endpoint, which answers non-200 for missing or private videos.
pub struct OembedCheck<E> {
  inner: E,
  endpoint: String,
}

impl<E> OembedCheck<E> {
  pub fn new(inner: E) -> Self {
    Self::with_endpoint(inner, OEMBED_ENDPOINT)
  }

  pub fn with_endpoint(inner: E, endpoint: impl Into<String>) -> Self {
    Self {
      inner,
      endpoint: endpoint.into(),
    }
  }
}

#[async_trait]
impl<E: Extractor> Extractor for OembedCheck<E> {
  async fn fetch(
    &self,
    video: &VideoReference,
    identity: &ClientIdentity,
  ) -> Result<VideoMetadata, FetchError> {
    let client = identity
      .client()
      .map_err(|e| FetchError::Other(e.into()))?;

    let status = client
      .get(&self.endpoint)
      .query(&[("url", video.watch_url().as_str()), ("format", "json")])
      .send()
      .await
      .map_err(|e| FetchError::Transient(e.to_string()))?
      .status();

    debug!(%status, "oembed check for {}", video);
    check_status(video, status)?;

    self.inner.fetch(video, identity).await
  }
}

fn check_status(
  video: &VideoReference,
  status: StatusCode,
) -> Result<(), FetchError> {
  if status.is_success() {
    Ok(())
  } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
  {
    Err(FetchError::Transient(format!("oembed returned {status}")))
  } else if status == StatusCode::UNAUTHORIZED
    || status == StatusCode::FORBIDDEN
  {
    // oembed answers 401 for private videos
    Err(FetchError::Private)
  } else {
    Err(FetchError::NotFound(video.id().to_string()))
  }
}

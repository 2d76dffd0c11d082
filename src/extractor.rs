mod oembed;
mod retry;
mod rustube;

use async_trait::async_trait;
use thiserror::Error;

use crate::{format::StreamCandidate, video::VideoReference};

pub use self::rustube::Rustube;
pub use oembed::OembedCheck;
pub use retry::{
  fetch_with_retry, ClientIdentity, IdentityProvider, RetryPolicy,
  RotatingIdentities,
};

#[derive(Clone, Debug, Default)]
pub struct VideoMetadata {
  pub title: String,
  pub author: String,
  pub thumbnail: String,
  pub duration_seconds: u64,
  pub candidates: Vec<StreamCandidate>,
}

#[derive(Debug, Error)]
pub enum FetchError {
  #[error("video not found: {0}")]
  NotFound(String),
  #[error("video is age restricted")]
  AgeRestricted,
  #[error("video is private")]
  Private,
  #[error("video has been removed: {0}")]
  Removed(String),
  #[error("network error: {0}")]
  Transient(String),
  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

impl FetchError {
  pub fn is_transient(&self) -> bool {
    matches!(self, FetchError::Transient(_))
  }

  /// Map an error from the scraping library onto a fetch failure kind.
  ///
  /// The library only reports most of these conditions through the
  /// playability message YouTube returns, so the message text decides.
  /// Transport errors anywhere in the source chain are transient.
  pub fn classify<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    if has_transport_source(&err) {
      return FetchError::Transient(err.to_string());
    }

    Self::from_message(&err.to_string())
      .unwrap_or_else(|| FetchError::Other(err.into()))
  }

  pub fn from_message(message: &str) -> Option<Self> {
    let lower = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["confirm your age", "age-restricted", "age restricted"]) {
      Some(FetchError::AgeRestricted)
    } else if has(&["private video", "video is private"]) {
      Some(FetchError::Private)
    } else if has(&["copyright", "removed", "terminated"]) {
      Some(FetchError::Removed(message.to_string()))
    } else if has(&["unavailable", "not found", "does not exist"]) {
      Some(FetchError::NotFound(message.to_string()))
    } else if has(&["timed out", "connection", "too many requests"]) {
      Some(FetchError::Transient(message.to_string()))
    } else {
      None
    }
  }
}

fn has_transport_source(err: &(dyn std::error::Error + 'static)) -> bool {
  let mut source = Some(err);
  while let Some(err) = source {
    if err.downcast_ref::<reqwest::Error>().is_some() {
      return true;
    }
    source = err.source();
  }
  false
}

/// Source of video metadata and stream urls.
#[async_trait]
pub trait Extractor: Send + Sync {
  async fn fetch(
    &self,
    video: &VideoReference,
    identity: &ClientIdentity,
  ) -> Result<VideoMetadata, FetchError>;
}

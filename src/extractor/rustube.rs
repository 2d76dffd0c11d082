use async_trait::async_trait;
use tracing::debug;

use crate::{format::StreamCandidate, video::VideoReference};

use super::{ClientIdentity, Extractor, FetchError, VideoMetadata};

pub struct Rustube;

#[async_trait]
impl Extractor for Rustube {
  async fn fetch(
    &self,
    video: &VideoReference,
    identity: &ClientIdentity,
  ) -> Result<VideoMetadata, FetchError> {
    use rustube::{Id, VideoFetcher};

    let id = Id::from_str(video.id())
      .map_err(|_| FetchError::NotFound(video.id().to_string()))?
      .as_owned();
    let client = identity
      .client()
      .map_err(|e| FetchError::Other(e.into()))?;

    let video = VideoFetcher::from_id_with_client(id, client)
      .fetch()
      .await
      .map_err(FetchError::classify)?
      .descramble()
      .map_err(FetchError::classify)?;

    let details = video.video_details();
    let thumbnail = details
      .thumbnails
      .iter()
      .max_by_key(|t| t.width)
      .map(|t| t.url.clone())
      .unwrap_or_default();

    let candidates: Vec<_> = video
      .streams()
      .iter()
      .map(|stream| StreamCandidate {
        has_video: stream.includes_video_track,
        has_audio: stream.includes_audio_track,
        height: stream.height.and_then(|h| u32::try_from(h).ok()),
        quality_label: stream.quality_label.as_ref().and_then(label_text),
        container: stream.mime.subtype().as_str().to_string(),
        url: stream.signature_cipher.url.to_string(),
      })
      .collect();

    debug!(count = candidates.len(), "extracted stream candidates");

    Ok(VideoMetadata {
      title: details.title.clone(),
      author: details.author.clone(),
      thumbnail,
      duration_seconds: details.length_seconds,
      candidates,
    })
  }
}

// Labels serialize to the text YouTube displays, e.g. `1080p60 HDR`.
fn label_text<L: serde::Serialize>(label: &L) -> Option<String> {
  match serde_json::to_value(label).ok()? {
    serde_json::Value::String(text) => Some(text),
    _ => None,
  }
}

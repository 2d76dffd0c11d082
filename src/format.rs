use std::cmp::Reverse;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
  #[error("no downloadable format found")]
  NoCandidates,
}

/// One downloadable rendition of a video, as reported by the extractor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCandidate {
  pub has_video: bool,
  pub has_audio: bool,
  pub height: Option<u32>,
  pub quality_label: Option<String>,
  pub container: String,
  pub url: String,
}

impl StreamCandidate {
  pub fn is_combined(&self) -> bool {
    self.has_video && self.has_audio
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionResult {
  pub stream: StreamCandidate,
  pub is_video_only: bool,
  /// Never empty.
  pub quality: String,
}

/// Pick the best stream out of `candidates`.
///
/// Combined audio+video streams are preferred, then video-only streams,
/// and as a last resort whatever is left. Inside the chosen tier the
/// highest resolution wins; equal candidates keep their input order.
pub fn select(
  candidates: &[StreamCandidate],
) -> Result<SelectionResult, SelectionError> {
  let combined: Vec<_> =
    candidates.iter().filter(|c| c.is_combined()).collect();
  let video: Vec<_> = candidates.iter().filter(|c| c.has_video).collect();

  let mut tier = if !combined.is_empty() {
    combined
  } else if !video.is_empty() {
    video
  } else {
    candidates.iter().collect()
  };

  // sort_by_key is stable, ties keep input order
  tier.sort_by_key(|c| {
    (Reverse(c.is_combined()), Reverse(c.height.unwrap_or(0)))
  });

  let stream = tier
    .first()
    .map(|c| (*c).clone())
    .ok_or(SelectionError::NoCandidates)?;

  Ok(SelectionResult {
    is_video_only: stream.has_video && !stream.has_audio,
    quality: quality_label(&stream),
    stream,
  })
}

pub fn quality_label(stream: &StreamCandidate) -> String {
  match (&stream.quality_label, stream.height) {
    (Some(label), _) if !label.is_empty() => label.clone(),
    (_, Some(height)) => format!("{height}p"),
    _ => String::from("unknown"),
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn candidate(
    height: Option<u32>,
    has_video: bool,
    has_audio: bool,
    url: &str,
  ) -> StreamCandidate {
    StreamCandidate {
      has_video,
      has_audio,
      height,
      quality_label: None,
      container: "mp4".into(),
      url: url.into(),
    }
  }

  #[test]
  fn test_combined_beats_higher_video_only() {
    let candidates = vec![
      candidate(Some(720), true, true, "combined"),
      candidate(Some(1080), true, false, "video"),
    ];
    let selected = select(&candidates).unwrap();
    assert_eq!(selected.stream.url, "combined");
    assert!(!selected.is_video_only);
    assert_eq!(selected.quality, "720p");
  }

  #[test]
  fn test_highest_combined_wins() {
    let candidates = vec![
      candidate(Some(360), true, true, "360"),
      candidate(None, true, true, "none"),
      candidate(Some(720), true, true, "720"),
      candidate(Some(2160), true, false, "video"),
    ];
    assert_eq!(select(&candidates).unwrap().stream.url, "720");
  }

  #[test]
  fn test_video_only_fallback() {
    let candidates = vec![
      candidate(Some(480), true, false, "video"),
      candidate(None, false, true, "audio"),
    ];
    let selected = select(&candidates).unwrap();
    assert_eq!(selected.stream.url, "video");
    assert!(selected.is_video_only);
    assert_eq!(selected.quality, "480p");
  }

  #[test]
  fn test_last_resort_tier() {
    let candidates = vec![
      candidate(None, false, true, "audio-1"),
      candidate(None, false, false, "broken"),
    ];
    let selected = select(&candidates).unwrap();
    assert_eq!(selected.stream.url, "audio-1");
    assert!(!selected.is_video_only);
    assert_eq!(selected.quality, "unknown");
  }

  #[test]
  fn test_ties_keep_input_order() {
    let candidates = vec![
      candidate(Some(720), true, true, "first"),
      candidate(Some(720), true, true, "second"),
    ];
    assert_eq!(select(&candidates).unwrap().stream.url, "first");
  }

  #[test]
  fn test_empty() {
    assert_eq!(select(&[]), Err(SelectionError::NoCandidates));
  }

  #[test]
  fn test_idempotent() {
    let candidates = vec![
      candidate(Some(240), true, true, "a"),
      candidate(Some(1080), true, false, "b"),
      candidate(Some(240), true, true, "c"),
    ];
    assert_eq!(select(&candidates), select(&candidates));
  }

  #[test]
  fn test_quality_label() {
    let mut stream = candidate(Some(360), true, true, "");
    assert_eq!(quality_label(&stream), "360p");

    stream.quality_label = Some("360p60".into());
    assert_eq!(quality_label(&stream), "360p60");

    stream.quality_label = Some(String::new());
    assert_eq!(quality_label(&stream), "360p");

    let stream = candidate(None, true, true, "");
    assert_eq!(quality_label(&stream), "unknown");
  }
}

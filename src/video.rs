use std::fmt;

use serde::Serialize;
use thiserror::Error;
use url::Url;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";
const SHORTS_URL_PREFIX: &str = "https://www.youtube.com/shorts/";
const EMBED_URL_PREFIX: &str = "https://www.youtube.com/embed/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
  #[error("malformed url: {0}")]
  MalformedUrl(String),
  #[error("unrecognized youtube url format: {0}")]
  UnrecognizedFormat(String),
}

/// A resolved video identifier.
///
/// The identifier is carried as extracted. Real ids are 11 characters of
/// `[A-Za-z0-9_-]`, but nothing here enforces that; a bad id only fails
/// once the extractor asks the platform for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoReference(String);

impl VideoReference {
  pub fn id(&self) -> &str {
    &self.0
  }

  pub fn watch_url(&self) -> String {
    format!("{WATCH_URL_PREFIX}{}", self.0)
  }

  pub fn shorts_url(&self) -> String {
    format!("{SHORTS_URL_PREFIX}{}", self.0)
  }

  pub fn embed_url(&self) -> String {
    format!("{EMBED_URL_PREFIX}{}", self.0)
  }
}

impl fmt::Display for VideoReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Resolve a watch, shorts or legacy `/v/` url into a video reference.
///
/// Rules are tried in order and the first matching one wins, even if it
/// yields nothing:
///
/// 1. `/shorts/<id>` in the path
/// 2. `/watch` in the path, id taken from the `v` query parameter
/// 3. `/v/<id>` in the path
pub fn resolve(raw_url: &str) -> Result<VideoReference, ResolutionError> {
  let url = Url::parse(raw_url.trim())
    .map_err(|e| ResolutionError::MalformedUrl(format!("{raw_url}: {e}")))?;
  let path = url.path();

  let id = if let Some((_, rest)) = path.split_once("/shorts/") {
    Some(path_segment(rest).to_string())
  } else if path.contains("/watch") {
    url
      .query_pairs()
      .find_map(|(k, v)| (k == "v").then(|| v.into_owned()))
  } else if let Some((_, rest)) = path.split_once("/v/") {
    Some(path_segment(rest).to_string())
  } else {
    None
  };

  match id {
    Some(id) if !id.is_empty() => Ok(VideoReference(id)),
    _ => Err(ResolutionError::UnrecognizedFormat(raw_url.to_string())),
  }
}

// everything up to the next path separator, with any stray query suffix cut
fn path_segment(rest: &str) -> &str {
  let end = rest.find(['/', '?']).unwrap_or(rest.len());
  &rest[..end]
}

#[cfg(test)]
mod test {
  use super::*;

  fn id_of(url: &str) -> String {
    resolve(url).unwrap().id().to_string()
  }

  #[test]
  fn test_resolve_shorts() {
    assert_eq!(
      id_of("https://www.youtube.com/shorts/abcDEF12_-3?extra=1"),
      "abcDEF12_-3"
    );
    assert_eq!(id_of("https://youtube.com/shorts/abcDEF12_-3"), "abcDEF12_-3");
    assert_eq!(
      id_of("https://m.youtube.com/shorts/abcDEF12_-3/?feature=share"),
      "abcDEF12_-3"
    );
  }

  #[test]
  fn test_resolve_watch() {
    assert_eq!(
      id_of("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=5"),
      "dQw4w9WgXcQ"
    );
    assert_eq!(
      id_of("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
      "dQw4w9WgXcQ"
    );
  }

  #[test]
  fn test_resolve_legacy_v() {
    assert_eq!(id_of("https://www.youtube.com/v/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
  }

  #[test]
  fn test_shorts_takes_precedence_over_watch() {
    assert_eq!(
      id_of("https://www.youtube.com/shorts/shortsid001?v=watchid0001"),
      "shortsid001"
    );
  }

  #[test]
  fn test_permissive_id_shape() {
    // no length or charset validation
    assert_eq!(id_of("https://www.youtube.com/shorts/x"), "x");
    assert_eq!(
      id_of("https://www.youtube.com/watch?v=not%20an%20id"),
      "not an id"
    );
  }

  #[test]
  fn test_malformed() {
    assert!(matches!(
      resolve("not a url at all"),
      Err(ResolutionError::MalformedUrl(_))
    ));
    assert!(matches!(resolve(""), Err(ResolutionError::MalformedUrl(_))));
  }

  #[test]
  fn test_unrecognized() {
    for url in [
      "https://example.com/",
      "https://www.youtube.com/channel/UC1yNl2E66ZzKApQdRuTQ4tw",
      "https://www.youtube.com/watch?list=abc",
      "https://www.youtube.com/watch?v=",
      "https://www.youtube.com/shorts/",
      "https://www.youtube.com/v/",
    ] {
      assert!(
        matches!(resolve(url), Err(ResolutionError::UnrecognizedFormat(_))),
        "{url}"
      );
    }
  }

  #[test]
  fn test_derived_urls() {
    let video = resolve("https://www.youtube.com/shorts/dQw4w9WgXcQ").unwrap();
    assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    assert_eq!(video.shorts_url(), "https://www.youtube.com/shorts/dQw4w9WgXcQ");
    assert_eq!(video.embed_url(), "https://www.youtube.com/embed/dQw4w9WgXcQ");
    assert_eq!(video.to_string(), "dQw4w9WgXcQ");
  }
}

use axum::{
  response::{IntoResponse, Response},
  Json,
};
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::{
  extractor::FetchError, format::SelectionError, video::ResolutionError,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("Please provide a YouTube video URL")]
  MissingUrl,
  #[error(transparent)]
  Resolution(#[from] ResolutionError),
  #[error(transparent)]
  Selection(#[from] SelectionError),
  #[error(transparent)]
  Fetch(#[from] FetchError),
  #[error("file exceeds the {limit} byte download limit")]
  TooLarge { limit: u64 },
  #[error(transparent)]
  Internal(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<reqwest::Error> for Error {
  fn from(err: reqwest::Error) -> Self {
    Error::Fetch(FetchError::Transient(err.to_string()))
  }
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::MissingUrl
      | Error::Resolution(_)
      | Error::Selection(_)
      | Error::TooLarge { .. } => StatusCode::BAD_REQUEST,
      Error::Fetch(FetchError::AgeRestricted | FetchError::Private) => {
        StatusCode::FORBIDDEN
      }
      Error::Fetch(FetchError::Removed(_)) => StatusCode::GONE,
      Error::Fetch(FetchError::NotFound(_)) => StatusCode::NOT_FOUND,
      Error::Fetch(FetchError::Transient(_) | FetchError::Other(_))
      | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Short title of the error kind, used as the `error` field.
  pub fn title(&self) -> &'static str {
    match self {
      Error::MissingUrl => "Missing URL",
      Error::Resolution(_) => "Invalid URL",
      Error::Selection(_) => "No Suitable Format",
      Error::TooLarge { .. } => "File Too Large",
      Error::Fetch(FetchError::AgeRestricted) => "Age Restricted",
      Error::Fetch(FetchError::Private) => "Private Video",
      Error::Fetch(FetchError::Removed(_)) => "Video Removed",
      Error::Fetch(FetchError::NotFound(_)) => "Video Not Found",
      Error::Fetch(FetchError::Transient(_)) => "Network Error",
      Error::Fetch(FetchError::Other(_)) | Error::Internal(_) => "Server Error",
    }
  }

  fn message(&self) -> String {
    match self {
      Error::MissingUrl => self.to_string(),
      Error::Resolution(_) => {
        "Could not extract a video ID from the URL".to_string()
      }
      Error::Selection(_) => "No downloadable format was found".to_string(),
      Error::TooLarge { .. } => {
        "The video exceeds the download size limit".to_string()
      }
      Error::Fetch(FetchError::AgeRestricted) => {
        "This video is age restricted and cannot be downloaded".to_string()
      }
      Error::Fetch(FetchError::Private) => "This video is private".to_string(),
      Error::Fetch(FetchError::Removed(_)) => {
        "This video has been removed".to_string()
      }
      Error::Fetch(FetchError::NotFound(_)) => {
        "The video does not exist or is not available".to_string()
      }
      Error::Fetch(FetchError::Transient(_)) => {
        "Could not reach YouTube, please try again later".to_string()
      }
      Error::Fetch(FetchError::Other(_)) | Error::Internal(_) => {
        "An error occurred while processing your request".to_string()
      }
    }
  }

  /// Attach diagnostic details to the rendered response.
  pub fn verbose(self, verbose: bool) -> ApiError {
    ApiError {
      error: self,
      verbose,
    }
  }
}

#[derive(Serialize)]
struct ErrorBody {
  error: &'static str,
  message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  details: Option<String>,
}

/// An [`Error`] rendered as a JSON response.
pub struct ApiError {
  error: Error,
  verbose: bool,
}

impl From<Error> for ApiError {
  fn from(error: Error) -> Self {
    error.verbose(false)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.error.status();
    if status.is_server_error() {
      tracing::error!("request failed: {:?}", self.error);
    } else {
      tracing::info!("request rejected: {}", self.error);
    }

    let body = ErrorBody {
      error: self.error.title(),
      message: self.error.message(),
      details: self.verbose.then(|| format!("{:?}", self.error)),
    };

    (status, Json(body)).into_response()
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    ApiError::from(self).into_response()
  }
}

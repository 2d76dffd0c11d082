use std::sync::Arc;

use axum::{
  body::{Body, StreamBody},
  extract::{Query, State},
  headers::ContentType,
  http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
  response::{IntoResponse, Response},
  routing::get,
  Json, Router, TypedHeader,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::{
  config::Config,
  error::ApiError,
  extractor::{
    fetch_with_retry, ClientIdentity, Extractor, RetryPolicy, VideoMetadata,
  },
  format::{select, SelectionResult},
  util::{attachment_disposition, ByteStream},
  video::{resolve, VideoReference},
  Error, Result,
};

pub const HOMEPAGE_HTML: &str = include_str!("../html/index.html");

#[derive(Clone)]
pub struct AppState {
  extractor: Arc<dyn Extractor>,
  retry: RetryPolicy,
  config: Arc<Config>,
}

impl AppState {
  pub fn new(
    extractor: Arc<dyn Extractor>,
    retry: RetryPolicy,
    config: Config,
  ) -> Self {
    Self {
      extractor,
      retry,
      config: Arc::new(config),
    }
  }

  fn reject(&self, err: Error) -> ApiError {
    err.verbose(self.config.verbose_errors)
  }
}

pub fn router(state: AppState) -> anyhow::Result<Router> {
  let origin = match state.config.cors_origin.as_str() {
    "*" => AllowOrigin::from(Any),
    origin => AllowOrigin::exact(HeaderValue::from_str(origin)?),
  };
  let cors = CorsLayer::new()
    .allow_methods([Method::GET, Method::OPTIONS])
    .allow_headers(Any)
    .allow_origin(origin);

  let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
    info_span!(
      "request",
      request_id = %Uuid::new_v4(),
      method = %req.method(),
      uri = %req.uri(),
    )
  });

  let app = Router::new()
    .route("/", get(homepage))
    .route("/health", get(health))
    .route("/video-info", get(video_info))
    .route("/download", get(download))
    .fallback(not_found)
    .with_state(state)
    .layer(cors)
    .layer(trace);

  Ok(app)
}

async fn homepage() -> impl IntoResponse {
  (
    TypedHeader::<ContentType>(ContentType::html()),
    HOMEPAGE_HTML,
  )
}

async fn health() -> impl IntoResponse {
  Json(json!({
    "status": "ok",
    "message": "API is working",
    "timestamp": chrono::Utc::now().to_rfc3339(),
  }))
}

async fn not_found() -> impl IntoResponse {
  (
    StatusCode::NOT_FOUND,
    Json(json!({
      "error": "Not Found",
      "message": "No such endpoint",
    })),
  )
}

#[derive(Debug, Deserialize)]
pub struct VideoQuery {
  url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
  title: String,
  thumbnail: String,
  duration: u64,
  download_url: String,
  quality: String,
  is_video_only: bool,
  container: String,
  video_id: String,
  author: String,
  watch_url: String,
  shorts_url: String,
  embed_url: String,
}

// everything a response needs after resolving, fetching and selecting
struct Lookup {
  video: VideoReference,
  metadata: VideoMetadata,
  identity: ClientIdentity,
  selection: SelectionResult,
}

async fn lookup(state: &AppState, query: VideoQuery) -> Result<Lookup> {
  let raw_url = query
    .url
    .as_deref()
    .map(str::trim)
    .filter(|url| !url.is_empty())
    .ok_or(Error::MissingUrl)?;

  let video = resolve(raw_url)?;
  info!(video_id = video.id(), "resolved video url");

  let (metadata, identity) =
    fetch_with_retry(state.extractor.as_ref(), &state.retry, &video).await?;

  let selection = select(&metadata.candidates)?;
  info!(
    quality = %selection.quality,
    video_only = selection.is_video_only,
    container = %selection.stream.container,
    candidates = metadata.candidates.len(),
    "selected stream"
  );

  Ok(Lookup {
    video,
    metadata,
    identity,
    selection,
  })
}

pub async fn video_info(
  State(state): State<AppState>,
  Query(query): Query<VideoQuery>,
) -> Result<Json<VideoInfo>, ApiError> {
  let Lookup {
    video,
    metadata,
    selection,
    ..
  } = lookup(&state, query).await.map_err(|e| state.reject(e))?;

  Ok(Json(VideoInfo {
    title: metadata.title,
    thumbnail: metadata.thumbnail,
    duration: metadata.duration_seconds,
    download_url: selection.stream.url,
    quality: selection.quality,
    is_video_only: selection.is_video_only,
    container: selection.stream.container,
    video_id: video.id().to_string(),
    author: metadata.author,
    watch_url: video.watch_url(),
    shorts_url: video.shorts_url(),
    embed_url: video.embed_url(),
  }))
}

#[axum::debug_handler]
pub async fn download(
  State(state): State<AppState>,
  Query(query): Query<VideoQuery>,
) -> Result<Response, ApiError> {
  stream_download(&state, query)
    .await
    .map_err(|e| state.reject(e))
}

async fn stream_download(
  state: &AppState,
  query: VideoQuery,
) -> Result<Response> {
  let Lookup {
    metadata,
    identity,
    selection,
    ..
  } = lookup(state, query).await?;

  let upstream = identity
    .client()?
    .get(&selection.stream.url)
    .send()
    .await?
    .error_for_status()?;

  let limit = state.config.max_download_bytes;
  let content_length = upstream.content_length();
  if let (Some(len), Some(limit)) = (content_length, limit) {
    if len > limit {
      return Err(Error::TooLarge { limit });
    }
  }

  let mut headers = HeaderMap::new();
  headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
  headers.insert(
    header::CONTENT_DISPOSITION,
    HeaderValue::from_str(&attachment_disposition(&metadata.title))
      .map_err(anyhow::Error::from)?,
  );
  if let Some(len) = content_length {
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
  }

  info!(bytes = ?content_length, "streaming {}", metadata.title);
  let stream =
    ByteStream::new(upstream.bytes_stream().boxed()).limit_bytes(limit);

  Ok((StatusCode::OK, headers, StreamBody::new(stream)).into_response())
}

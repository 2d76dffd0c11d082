use std::{net::SocketAddr, time::Duration};

use clap::Parser;

/// Web proxy that turns YouTube Shorts links into downloadable videos.
#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct Config {
  /// Address to listen on
  #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
  pub bind: String,

  #[arg(long, env = "PORT", default_value_t = 3005)]
  pub port: u16,

  /// Outbound proxy urls, rotated between fetch attempts
  #[arg(long, env = "PROXIES", value_delimiter = ',')]
  pub proxies: Vec<String>,

  /// Attempts per video before a network error is reported
  #[arg(long, env = "FETCH_MAX_ATTEMPTS", default_value_t = 3)]
  pub max_attempts: u32,

  #[arg(long, env = "FETCH_INITIAL_BACKOFF_MS", default_value_t = 1000)]
  pub initial_backoff_ms: u64,

  /// Check video existence through oEmbed before scraping the page
  #[arg(
    long,
    env = "VALIDATE_OEMBED",
    default_value_t = true,
    action = clap::ArgAction::Set
  )]
  pub validate_oembed: bool,

  /// Stop streaming a download after this many bytes
  #[arg(long, env = "MAX_DOWNLOAD_BYTES")]
  pub max_download_bytes: Option<u64>,

  /// Include diagnostic details in error responses. Development only.
  #[arg(
    long,
    env = "VERBOSE_ERRORS",
    default_value_t = cfg!(debug_assertions),
    action = clap::ArgAction::Set
  )]
  pub verbose_errors: bool,

  #[arg(long, env = "CORS_ORIGIN", default_value = "*")]
  pub cors_origin: String,
}

impl Config {
  pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", self.bind, self.port).parse()?)
  }

  pub fn initial_backoff(&self) -> Duration {
    Duration::from_millis(self.initial_backoff_ms)
  }
}

impl Default for Config {
  fn default() -> Self {
    Self::parse_from(["shorts-proxy"])
  }
}

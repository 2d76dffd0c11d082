use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod extractor;
mod format;
mod handler;
mod util;
mod video;

pub use error::{Error, Result};

use config::Config;
use extractor::{
  Extractor, OembedCheck, RetryPolicy, RotatingIdentities, Rustube,
};
use handler::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let config = Config::parse();
  let addr = config.listen_addr()?;

  let extractor: Arc<dyn Extractor> = if config.validate_oembed {
    Arc::new(OembedCheck::new(Rustube))
  } else {
    Arc::new(Rustube)
  };

  let retry = RetryPolicy {
    max_attempts: config.max_attempts,
    initial_backoff: config.initial_backoff(),
    identities: Arc::new(RotatingIdentities::new(config.proxies.clone())),
  };

  info!(
    proxies = config.proxies.len(),
    max_attempts = retry.max_attempts,
    oembed = config.validate_oembed,
    "starting server"
  );

  let app = handler::router(AppState::new(extractor, retry, config))?;

  info!("Listening on {}", addr);

  axum::Server::bind(&addr)
    .serve(app.into_make_service())
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!("failed to listen for shutdown signal: {}", e);
    std::future::pending::<()>().await;
  }
  info!("shutting down");
}

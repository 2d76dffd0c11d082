use std::{
  pin::Pin,
  task::{Context, Poll},
};

use bytes::Bytes;
use futures::Stream;

use crate::{Error, Result};

/// Pass-through byte stream with an optional size cap.
///
/// Once more than `limit_bytes` have come through, the stream yields
/// [`Error::TooLarge`] and ends, so the response body is aborted rather than
/// silently truncated.
pub struct ByteStream<T> {
  stream: T,
  // inclusive
  limit_bytes: Option<u64>,
  sent: u64,
  exceeded: bool,
}

impl<T> ByteStream<T> {
  pub fn new(stream: T) -> Self {
    ByteStream {
      stream,
      limit_bytes: None,
      sent: 0,
      exceeded: false,
    }
  }

  pub fn limit_bytes(self, bytes: Option<u64>) -> Self {
    ByteStream {
      limit_bytes: bytes,
      ..self
    }
  }
}

impl<T, E> Stream for ByteStream<T>
where
  T: Stream<Item = Result<Bytes, E>> + Unpin,
  E: Into<Error>,
{
  type Item = Result<Bytes>;

  fn poll_next(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Option<Self::Item>> {
    let this = &mut *self;
    if this.exceeded {
      return Poll::Ready(None);
    }

    match Pin::new(&mut this.stream).poll_next(cx) {
      Poll::Ready(Some(Ok(bytes))) => {
        this.sent += bytes.len() as u64;
        match this.limit_bytes {
          Some(limit) if this.sent > limit => {
            this.exceeded = true;
            Poll::Ready(Some(Err(Error::TooLarge { limit })))
          }
          _ => Poll::Ready(Some(Ok(bytes))),
        }
      }
      Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e.into()))),
      Poll::Ready(None) => Poll::Ready(None),
      Poll::Pending => Poll::Pending,
    }
  }
}

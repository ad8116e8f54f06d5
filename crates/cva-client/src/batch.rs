//! Bounded parallel fetch of single entities

use crate::query::QueryParams;
use crate::transport::{Endpoint, Request, Transport};
use cva_core::{Error, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use tracing::{debug, info};

/// Fetch `{base}/{id}` for every id with at most `concurrency` requests in flight.
///
/// Results keep the order of `ids`; an id the service does not know yields
/// `None`. The first fatal error aborts the whole batch.
pub async fn fetch_by_ids<S: AsRef<str>>(
  transport: &Transport,
  base: impl Into<Endpoint>,
  ids: &[S],
  concurrency: usize,
) -> Result<Vec<Option<Value>>> {
  fetch_by_ids_with(transport, base, ids, &QueryParams::new(), concurrency).await
}

/// [`fetch_by_ids`] sending `params` on every call
pub async fn fetch_by_ids_with<S: AsRef<str>>(
  transport: &Transport,
  base: impl Into<Endpoint>,
  ids: &[S],
  params: &QueryParams,
  concurrency: usize,
) -> Result<Vec<Option<Value>>> {
  let base = base.into();
  let concurrency = concurrency.max(1);
  info!("Fetching {} entities from {} ({} in flight)", ids.len(), base, concurrency);

  stream::iter(ids)
    .map(|id| {
      let id = id.as_ref();
      let request = Request::get(base.clone().join(id)).params(params.clone());
      async move {
        let mut results = transport.execute(request).await?.results;
        match results.len() {
          0 => {
            debug!("Nothing found for {}", id);
            Ok(None)
          }
          1 => Ok(results.pop()),
          n => Err(Error::Parse(format!("Expected a single result for {}, got {}", id, n))),
        }
      }
    })
    .buffered(concurrency)
    .try_collect()
    .await
}

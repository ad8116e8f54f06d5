//! Cursor pagination over listing endpoints
//!
//! A [`Paginator`] issues `GET` calls lazily as its stream is polled. The
//! `X-Pagination-Limit`/`X-Pagination-Marker` headers of each response become
//! the `limit`/`marker` parameters of the next call; a response without them
//! is the last page.

use crate::query::QueryParams;
use crate::transport::{Endpoint, Transport};
use cva_core::{Error, Result};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

type Transform<T> = Arc<dyn Fn(Value) -> Result<T> + Send + Sync>;

/// One page of results and its position in the whole listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
  /// Number of items yielded by the pages before this one
  pub offset: usize,
  /// Items of this page, in service order
  pub items: Vec<T>,
}

impl<T> Page<T> {
  /// Running indices covered by this page
  pub fn index(&self) -> Range<usize> {
    self.offset..self.offset + self.items.len()
  }

  /// Items with their running index
  pub fn rows(&self) -> impl Iterator<Item = (usize, &T)> {
    self.index().zip(self.items.iter())
  }

  /// Number of items on this page
  pub fn len(&self) -> usize {
    self.items.len()
  }

  /// Whether the page holds no items
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Consume the page, keeping only its items
  pub fn into_items(self) -> Vec<T> {
    self.items
  }
}

/// Either a scalar count or a stream of items, depending on `count=true`
pub enum Listing<T> {
  /// Scalar result of a `count=true` call
  Count(u64),
  /// Lazy stream over every page
  Items(BoxStream<'static, Result<T>>),
}

impl<T> std::fmt::Debug for Listing<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Listing::Count(n) => f.debug_tuple("Count").field(n).finish(),
      Listing::Items(_) => f.write_str("Items(..)"),
    }
  }
}

struct PageState {
  params: QueryParams,
  more: bool,
  yielded: usize,
}

/// Lazy, restartable listing of one endpoint
pub struct Paginator<T = Value> {
  transport: Arc<Transport>,
  endpoint: Endpoint,
  params: QueryParams,
  max_results: Option<usize>,
  transform: Transform<T>,
}

impl<T: DeserializeOwned + Send + 'static> Paginator<T> {
  /// Paginator deserializing every item into `T`
  pub fn new(transport: Arc<Transport>, endpoint: impl Into<Endpoint>, params: QueryParams) -> Self {
    Self {
      transport,
      endpoint: endpoint.into(),
      params,
      max_results: None,
      transform: Arc::new(|value: Value| -> Result<T> { Ok(serde_json::from_value(value)?) }),
    }
  }
}

impl<T: Send + 'static> Paginator<T> {
  /// Stop after `n` items
  pub fn max_results(mut self, n: usize) -> Self {
    self.max_results = Some(n);
    self
  }

  /// Replace the per-item conversion
  pub fn transformer<U, F>(self, transform: F) -> Paginator<U>
  where
    F: Fn(Value) -> Result<U> + Send + Sync + 'static,
  {
    Paginator {
      transport: self.transport,
      endpoint: self.endpoint,
      params: self.params,
      max_results: self.max_results,
      transform: Arc::new(transform),
    }
  }

  /// Parameters of the first call
  pub fn params(&self) -> &QueryParams {
    &self.params
  }

  /// Stream of pages. Each poll past the end of a page issues one call.
  pub fn pages(&self) -> BoxStream<'static, Result<Page<T>>> {
    let transport = Arc::clone(&self.transport);
    let endpoint = self.endpoint.clone();
    let transform = Arc::clone(&self.transform);
    let max_results = self.max_results;
    let initial = PageState { params: self.params.clone(), more: true, yielded: 0 };

    stream::try_unfold(initial, move |mut state| {
      let transport = Arc::clone(&transport);
      let endpoint = endpoint.clone();
      let transform = Arc::clone(&transform);
      async move {
        if !state.more || max_results.is_some_and(|max| state.yielded >= max) {
          return Ok(None);
        }

        let (results, next_page) = transport.get(&endpoint, state.params.clone()).await?.into_parts();
        let mut items = results.into_iter().map(|value| transform(value)).collect::<Result<Vec<T>>>()?;

        match next_page {
          Some(cursor) => {
            debug!(marker = %cursor.marker, "More results available for {}", endpoint);
            state.params.apply_cursor(&cursor);
          }
          None => state.more = false,
        }

        if let Some(max) = max_results {
          items.truncate(max - state.yielded);
        }

        let page = Page { offset: state.yielded, items };
        state.yielded += page.len();
        Ok(Some((page, state)))
      }
    })
    .boxed()
  }

  /// Stream of items across all pages
  pub fn items(&self) -> BoxStream<'static, Result<T>> {
    self
      .pages()
      .map_ok(|page| stream::iter(page.items.into_iter().map(Ok::<T, Error>)))
      .try_flatten()
      .boxed()
  }

  /// Drain every item into a vector
  pub async fn collect(&self) -> Result<Vec<T>> {
    self.items().try_collect().await
  }

  /// The count when the parameters ask for one, otherwise the items
  pub async fn list(&self) -> Result<Listing<T>> {
    if self.params.is_count() {
      let count = self.transport.count(&self.endpoint, self.params.clone()).await?;
      return Ok(Listing::Count(count));
    }
    Ok(Listing::Items(self.items()))
  }
}

impl<T> Clone for Paginator<T> {
  fn clone(&self) -> Self {
    Self {
      transport: Arc::clone(&self.transport),
      endpoint: self.endpoint.clone(),
      params: self.params.clone(),
      max_results: self.max_results,
      transform: Arc::clone(&self.transform),
    }
  }
}

impl<T> std::fmt::Debug for Paginator<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Paginator")
      .field("endpoint", &self.endpoint)
      .field("params", &self.params)
      .field("max_results", &self.max_results)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_page_rows_use_running_index() {
    let page = Page { offset: 4, items: vec!["a", "b"] };
    assert_eq!(page.index(), 4..6);
    assert_eq!(page.rows().collect::<Vec<_>>(), vec![(4, &"a"), (5, &"b")]);
  }

  #[tokio::test]
  async fn test_zero_max_results_makes_no_call() {
    // mock host is unreachable; a call would surface as an error
    let transport = Arc::new(Transport::new_mock());
    let paginator = Paginator::<Value>::new(transport, "cases", QueryParams::new()).max_results(0);
    assert!(paginator.collect().await.unwrap().is_empty());
  }
}

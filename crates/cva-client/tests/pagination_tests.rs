//! Cursor pagination against a mock CVA service

use cva_client::{Config, CvaClient, Listing, Paginator, QueryParams, Transport};
use cva_core::{LIMIT_HEADER, MARKER_HEADER};
use futures::{StreamExt, TryStreamExt};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(ids: &[&str]) -> ResponseTemplate {
  let results: Vec<Value> = ids.iter().map(|id| json!({ "_id": id })).collect();
  ResponseTemplate::new(200).set_body_json(json!({ "response": [{ "result": results }] }))
}

fn transport(server: &MockServer) -> Arc<Transport> {
  let mut config = Config::with_token(server.uri(), "tok");
  config.rate_limit = 0;
  config.retry_backoff_ms = 1;
  Arc::new(Transport::new(&config).unwrap())
}

/// Three pages of two cases each, chained by markers m1 and m2
async fn mount_three_pages(server: &MockServer, first_page_calls: u64, later_page_calls: u64) {
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .and(query_param("limit", "2"))
    .and(query_param_is_missing("marker"))
    .respond_with(page(&["c1", "c2"]).insert_header(LIMIT_HEADER, "2").insert_header(MARKER_HEADER, "m1"))
    .expect(first_page_calls)
    .mount(server)
    .await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .and(query_param("marker", "m1"))
    .respond_with(page(&["c3", "c4"]).insert_header(LIMIT_HEADER, "2").insert_header(MARKER_HEADER, "m2"))
    .expect(later_page_calls)
    .mount(server)
    .await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .and(query_param("marker", "m2"))
    .respond_with(page(&["c5", "c6"]).insert_header(LIMIT_HEADER, "2").insert_header(MARKER_HEADER, "m3"))
    .expect(later_page_calls)
    .mount(server)
    .await;
}

fn ids(items: &[Value]) -> Vec<&str> {
  items.iter().filter_map(|item| item["_id"].as_str()).collect()
}

#[tokio::test]
async fn test_max_results_truncates_third_page_and_stops() {
  let server = MockServer::start().await;
  mount_three_pages(&server, 1, 1).await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .and(query_param("marker", "m3"))
    .respond_with(page(&["c7"]))
    .expect(0)
    .mount(&server)
    .await;

  let paginator = Paginator::<Value>::new(transport(&server), "cases", QueryParams::new().limit(2)).max_results(5);
  let pages: Vec<_> = paginator.pages().try_collect().await.unwrap();

  assert_eq!(pages.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![2, 2, 1]);
  assert_eq!(pages.iter().map(|p| p.offset).collect::<Vec<_>>(), vec![0, 2, 4]);
  assert_eq!(ids(&pages[2].items), vec!["c5"]);
  assert_eq!(pages[2].rows().map(|(index, _)| index).collect::<Vec<_>>(), vec![4]);
}

#[tokio::test]
async fn test_pagination_ends_without_cursor() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/evidences/clinvar"))
    .and(query_param_is_missing("marker"))
    .respond_with(page(&["e1", "e2"]).insert_header(MARKER_HEADER, "next"))
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/evidences/clinvar"))
    .and(query_param("marker", "next"))
    .respond_with(page(&["e3"]))
    .expect(1)
    .mount(&server)
    .await;

  let paginator = Paginator::<Value>::new(transport(&server), "evidences/clinvar", QueryParams::new());
  let items = paginator.collect().await.unwrap();
  assert_eq!(ids(&items), vec!["e1", "e2", "e3"]);
}

#[tokio::test]
async fn test_empty_page_with_marker_keeps_paginating() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .and(query_param_is_missing("marker"))
    .respond_with(page(&["c1", "c2"]).insert_header(MARKER_HEADER, "m1"))
    .expect(2)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .and(query_param("marker", "m1"))
    .respond_with(page(&[]).insert_header(MARKER_HEADER, "m2"))
    .expect(2)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .and(query_param("marker", "m2"))
    .respond_with(page(&["c3"]))
    .expect(2)
    .mount(&server)
    .await;

  let paginator = Paginator::<Value>::new(transport(&server), "cases", QueryParams::new());
  let pages: Vec<_> = paginator.pages().try_collect().await.unwrap();
  assert_eq!(pages.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![2, 0, 1]);
  assert_eq!(pages[2].offset, 2);

  let items = paginator.collect().await.unwrap();
  assert_eq!(ids(&items), vec!["c1", "c2", "c3"]);
}

#[tokio::test]
async fn test_cursor_limit_replaces_requested_limit() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/variants"))
    .and(query_param("limit", "10"))
    .and(query_param_is_missing("marker"))
    .respond_with(page(&["v1"]).insert_header(LIMIT_HEADER, "3").insert_header(MARKER_HEADER, "abc"))
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/variants"))
    .and(query_param("limit", "3"))
    .and(query_param("marker", "abc"))
    .and(query_param("assembly", "GRCh38"))
    .respond_with(page(&["v2"]))
    .expect(1)
    .mount(&server)
    .await;

  let params = QueryParams::new().limit(10).with("assembly", "GRCh38");
  let paginator = Paginator::<Value>::new(transport(&server), "variants", params);
  assert_eq!(ids(&paginator.collect().await.unwrap()), vec!["v1", "v2"]);
}

#[tokio::test]
async fn test_repaginating_yields_the_same_items() {
  let server = MockServer::start().await;
  mount_three_pages(&server, 2, 2).await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .and(query_param("marker", "m3"))
    .respond_with(page(&[]))
    .expect(2)
    .mount(&server)
    .await;

  let paginator = Paginator::<Value>::new(transport(&server), "cases", QueryParams::new().limit(2));
  let first = paginator.collect().await.unwrap();
  let second = paginator.clone().collect().await.unwrap();

  assert_eq!(ids(&first), vec!["c1", "c2", "c3", "c4", "c5", "c6"]);
  assert_eq!(first, second);
}

#[tokio::test]
async fn test_stream_is_lazy() {
  let server = MockServer::start().await;
  mount_three_pages(&server, 1, 0).await;

  let paginator = Paginator::<Value>::new(transport(&server), "cases", QueryParams::new().limit(2));
  let first_two: Vec<Value> = paginator.items().take(2).try_collect().await.unwrap();
  assert_eq!(ids(&first_two), vec!["c1", "c2"]);
}

#[tokio::test]
async fn test_transformer_and_count_listing() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/transactions"))
    .and(query_param("count", "true"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": [{ "result": [7] }] })))
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/transactions"))
    .and(query_param("status", "ERROR"))
    .respond_with(page(&["tx-1", "tx-2"]))
    .expect(1)
    .mount(&server)
    .await;

  let mut config = Config::with_token(server.uri(), "tok");
  config.rate_limit = 0;
  let client = CvaClient::new(config).unwrap();

  let listing = client.transactions().get_transactions(QueryParams::new().count(true)).list().await.unwrap();
  assert!(matches!(listing, Listing::Count(7)));

  let ids: Vec<String> = client
    .transactions()
    .get_transactions(QueryParams::new().with("status", "ERROR"))
    .transformer(|value| Ok(value["_id"].as_str().unwrap_or_default().to_uppercase()))
    .collect()
    .await
    .unwrap();
  assert_eq!(ids, vec!["TX-1", "TX-2"]);
}

#[tokio::test]
async fn test_errors_surface_through_the_stream() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "Invalid limit" })))
    .mount(&server)
    .await;

  let paginator = Paginator::<Value>::new(transport(&server), "cases", QueryParams::new());
  let mut items = paginator.items();
  assert!(matches!(items.next().await, Some(Err(cva_client::Error::Service(_)))));
}

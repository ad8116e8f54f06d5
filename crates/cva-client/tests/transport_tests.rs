//! Transport behaviour against a mock CVA service

use cva_client::{Config, Error, QueryParams, Request, Transport, fetch_by_ids};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(results: Value) -> Value {
  json!({ "time": 2, "response": [{ "result": results }] })
}

fn fast(mut config: Config) -> Config {
  config.rate_limit = 0;
  config.max_retries = 3;
  config.retry_backoff_ms = 1;
  config
}

fn token_transport(server: &MockServer) -> Transport {
  Transport::new(&fast(Config::with_token(server.uri(), "tok"))).unwrap()
}

fn user_transport(server: &MockServer) -> Transport {
  Transport::new(&fast(Config::with_user_password(server.uri(), "user", "secret"))).unwrap()
}

async fn mount_auth(server: &MockServer, token: &str, times: u64) {
  Mock::given(method("POST"))
    .and(path("/cva/api/0/authentication"))
    .and(body_json(json!({ "username": "user", "password": "secret" })))
    .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{ "token": token }]))))
    .expect(times)
    .mount(server)
    .await;
}

#[tokio::test]
async fn test_get_unwraps_envelope_with_bearer_token() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .and(header("Authorization", "Bearer tok"))
    .and(header("Accept", "application/json"))
    .and(query_param("program", "rare_disease"))
    .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{ "_id": "c1" }, { "_id": "c2" }]))))
    .expect(1)
    .mount(&server)
    .await;

  let transport = token_transport(&server);
  let response = transport.get("cases", QueryParams::new().with("program", "rare_disease")).await.unwrap();

  assert_eq!(response.results, vec![json!({ "_id": "c1" }), json!({ "_id": "c2" })]);
  assert!(response.next_page.is_none());
}

#[tokio::test]
async fn test_user_password_authenticates_before_first_call() {
  let server = MockServer::start().await;
  mount_auth(&server, "issued", 1).await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/variants"))
    .and(header("Authorization", "Bearer issued"))
    .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([1]))))
    .expect(2)
    .mount(&server)
    .await;

  let transport = user_transport(&server);
  transport.get("variants", QueryParams::new()).await.unwrap();
  transport.get("variants", QueryParams::new()).await.unwrap();

  assert_eq!(transport.token().await.as_deref(), Some("Bearer issued"));
  assert_eq!(transport.renewals(), 0);
}

#[tokio::test]
async fn test_token_renewed_once_then_call_succeeds() {
  let server = MockServer::start().await;
  mount_auth(&server, "fresh", 2).await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .respond_with(ResponseTemplate::new(401))
    .up_to_n_times(1)
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{ "_id": "c1" }]))))
    .expect(1)
    .mount(&server)
    .await;

  let transport = user_transport(&server);
  let response = transport.get("cases", QueryParams::new()).await.unwrap();

  assert_eq!(response.results.len(), 1);
  assert_eq!(transport.renewals(), 1);
  assert!(!transport.token_renewed());
}

#[tokio::test]
async fn test_second_forbidden_fails_after_single_renewal() {
  let server = MockServer::start().await;
  // initial authentication plus exactly one renewal
  mount_auth(&server, "t1", 2).await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
    .expect(2)
    .mount(&server)
    .await;

  let transport = user_transport(&server);
  let err = transport.get("cases", QueryParams::new()).await.unwrap_err();

  assert!(matches!(err, Error::Client { status: 403, ref body } if body == "forbidden"));
  assert_eq!(transport.renewals(), 1);
}

#[tokio::test]
async fn test_pre_issued_token_is_not_renewed() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .respond_with(ResponseTemplate::new(401))
    .expect(1)
    .mount(&server)
    .await;

  let transport = token_transport(&server);
  let err = transport.get("cases", QueryParams::new()).await.unwrap_err();

  assert_eq!(err.status(), Some(401));
  assert_eq!(transport.renewals(), 0);
}

#[tokio::test]
async fn test_rejected_credentials_are_an_authentication_error() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/cva/api/0/authentication"))
    .respond_with(ResponseTemplate::new(401))
    .expect(1)
    .mount(&server)
    .await;

  let transport = user_transport(&server);
  let err = transport.get("cases", QueryParams::new()).await.unwrap_err();
  assert!(matches!(err, Error::Authentication(_)));
}

#[tokio::test]
async fn test_not_found_is_empty_unless_existence_required() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases/missing/1"))
    .respond_with(ResponseTemplate::new(404))
    .expect(2)
    .mount(&server)
    .await;

  let transport = token_transport(&server);
  let response = transport.get("cases/missing/1", QueryParams::new()).await.unwrap();
  assert!(response.results.is_empty());
  assert!(response.next_page.is_none());

  let err = transport.execute(Request::get("cases/missing/1").require_existence()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(ref endpoint) if endpoint == "cases/missing/1"));
}

#[tokio::test]
async fn test_service_error_wins_over_results() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "error": "Invalid marker",
      "response": [{ "result": [{ "_id": "c1" }] }]
    })))
    .mount(&server)
    .await;

  let transport = token_transport(&server);
  let err = transport.get("cases", QueryParams::new()).await.unwrap_err();
  assert!(matches!(err, Error::Service(ref message) if message == "Invalid marker"));
}

#[tokio::test]
async fn test_warning_is_not_an_error() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "warning": "Results may be incomplete",
      "response": [{ "result": [{ "_id": "c1" }] }]
    })))
    .mount(&server)
    .await;

  let transport = token_transport(&server);
  assert_eq!(transport.get("cases", QueryParams::new()).await.unwrap().results.len(), 1);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/variants"))
    .respond_with(ResponseTemplate::new(503))
    .up_to_n_times(2)
    .expect(2)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/variants"))
    .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{ "_id": "v1" }]))))
    .expect(1)
    .mount(&server)
    .await;

  let transport = token_transport(&server);
  assert_eq!(transport.get("variants", QueryParams::new()).await.unwrap().results.len(), 1);
}

#[tokio::test]
async fn test_retries_are_bounded() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/variants"))
    .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
    .expect(3)
    .mount(&server)
    .await;

  let transport = token_transport(&server);
  let err = transport.get("variants", QueryParams::new()).await.unwrap_err();
  assert!(matches!(err, Error::Server { status: 500, .. }));
}

#[tokio::test]
async fn test_client_errors_and_patch_are_not_retried() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases"))
    .respond_with(ResponseTemplate::new(400).set_body_string("bad filter"))
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("PATCH"))
    .and(path("/cva/api/0/transactions/tx-1"))
    .respond_with(ResponseTemplate::new(503))
    .expect(1)
    .mount(&server)
    .await;

  let transport = token_transport(&server);
  let err = transport.get("cases", QueryParams::new()).await.unwrap_err();
  assert!(matches!(err, Error::Client { status: 400, .. }));

  let err = transport.patch("transactions/tx-1", QueryParams::new()).await.unwrap_err();
  assert!(matches!(err, Error::Server { status: 503, .. }));
}

#[tokio::test]
async fn test_invalid_params_are_rejected_before_dispatch() {
  let server = MockServer::start().await;
  let transport = token_transport(&server);

  let err = transport.get("cases", QueryParams::new().with("limit", "-1")).await.unwrap_err();
  assert!(matches!(err, Error::InvalidParameter(_)));
  assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_count_returns_scalar() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/report-events"))
    .and(query_param("count", "true"))
    .and(query_param("type", "reported"))
    .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([42]))))
    .expect(1)
    .mount(&server)
    .await;

  let transport = token_transport(&server);
  let count = transport.count("report-events", QueryParams::new().with("type", "reported")).await.unwrap();
  assert_eq!(count, 42);
}

#[tokio::test]
async fn test_list_params_repeat_the_key() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/cva/api/0/cases/phenotypes/similar-cases"))
    .and(query_param("hpoIds", "HP:0000118"))
    .and(query_param("hpoIds", "HP:0001250"))
    .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
    .expect(1)
    .mount(&server)
    .await;

  let transport = token_transport(&server);
  let params = QueryParams::new().with_list("hpoIds", ["HP:0000118", "HP:0001250"]);
  assert!(transport.get("cases/phenotypes/similar-cases", params).await.unwrap().results.is_empty());
}

#[tokio::test]
async fn test_fetch_by_ids_keeps_input_order() {
  let server = MockServer::start().await;
  for id in ["a", "c"] {
    Mock::given(method("GET"))
      .and(path(format!("/cva/api/0/variants/{}", id)))
      .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{ "_id": id }]))))
      .expect(1)
      .mount(&server)
      .await;
  }
  Mock::given(method("GET"))
    .and(path("/cva/api/0/variants/b"))
    .respond_with(ResponseTemplate::new(404))
    .expect(1)
    .mount(&server)
    .await;

  let transport = Arc::new(token_transport(&server));
  let results = fetch_by_ids(&transport, "variants", &["a", "b", "c"], 2).await.unwrap();

  assert_eq!(results, vec![Some(json!({ "_id": "a" })), None, Some(json!({ "_id": "c" }))]);
}

#[tokio::test]
async fn test_concurrent_expired_tokens_share_one_renewal() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/cva/api/0/authentication"))
    .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{ "token": "first" }]))))
    .up_to_n_times(1)
    .expect(1)
    .mount(&server)
    .await;
  mount_auth(&server, "second", 1).await;
  Mock::given(method("GET"))
    .and(path_regex(r"^/cva/api/0/variants/v\d$"))
    .and(header("Authorization", "Bearer first"))
    .respond_with(ResponseTemplate::new(401))
    .expect(1..=4)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path_regex(r"^/cva/api/0/variants/v\d$"))
    .and(header("Authorization", "Bearer second"))
    .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{ "ok": true }]))))
    .expect(4)
    .mount(&server)
    .await;

  let transport = Arc::new(user_transport(&server));
  let results = fetch_by_ids(&transport, "variants", &["v1", "v2", "v3", "v4"], 4).await.unwrap();

  assert_eq!(results.len(), 4);
  assert!(results.iter().all(Option::is_some));
  assert_eq!(transport.renewals(), 1);
  assert_eq!(transport.token().await.as_deref(), Some("Bearer second"));
}

#[tokio::test]
async fn test_connection_failures_are_network_errors() {
  let port = {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
  };
  let transport = Transport::new(&fast(Config::with_token(format!("http://127.0.0.1:{}", port), "tok"))).unwrap();

  let started = std::time::Instant::now();
  let result = transport.get("cases", QueryParams::new()).await;

  assert!(matches!(result, Err(Error::Network(_))));
  assert!(started.elapsed() < std::time::Duration::from_secs(10));
}

#[test]
fn test_missing_credentials_is_a_configuration_error() {
  let result = Config::from_lookup(|key| (key == "CVA_URL_BASE").then(|| "http://localhost:8090".to_string()));
  assert!(matches!(result, Err(Error::MissingCredentials)));

  let result = Config::from_lookup(|key| match key {
    "CVA_USER" => Some("user".to_string()),
    _ => None,
  });
  assert!(matches!(result, Err(Error::MissingCredentials)));
}

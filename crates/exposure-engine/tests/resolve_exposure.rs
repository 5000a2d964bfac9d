//! End-to-end exposure resolution against a mock breach corpus

use std::time::Duration;

use exposure_engine::{
    normalize, Credential, EngineSettings, ExposureClient, ResolveError, RiskTier,
};
use serde_json::json;
use wiremock::{
    matchers::{method, path, path_regex},
    Mock, MockServer, ResponseTemplate,
};

const USER_EMAIL_HASH: &str = "63A710569261A24B3766275B7000CE8D7B32E2F7";

fn client(server: &MockServer) -> ExposureClient {
    ExposureClient::new(EngineSettings::new(server.uri())).unwrap()
}

fn breach(id: &str, name: &str, date: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "firstSeenDate": date })
}

#[tokio::test]
async fn test_duplicate_breaches_are_merged() {
    let server = MockServer::start().await;

    let mut richer = breach("adobe", "Adobe", "2013-10-04");
    richer["exposedRecordCount"] = json!(152_445_165);
    richer["domain"] = json!("adobe.com");

    Mock::given(method("GET"))
        .and(path("/range/email/63A71"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "hash": USER_EMAIL_HASH, "breach": breach("adobe", "Adobe", "2013-10-04") },
            { "hash": USER_EMAIL_HASH, "breach": breach("linkedin", "LinkedIn", "2016-05-18") },
            { "hash": USER_EMAIL_HASH, "breach": richer },
            // Same prefix, different credential
            { "hash": "63A71FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF", "breach": breach("canva", "Canva", "2019-05-24") },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let report = client(&server)
        .resolve_exposure(Credential::email("  User@Example.com "), None)
        .await
        .unwrap();

    assert_eq!(report.query_key.hash(), USER_EMAIL_HASH);
    assert_eq!(report.total_exposures, 3);
    assert_eq!(report.risk_tier, RiskTier::Moderate);

    let ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["linkedin", "adobe"]);
    assert_eq!(report.records[1].domain.as_deref(), Some("adobe.com"));
    assert_eq!(report.summary.breach_count, 2);
}

#[tokio::test]
async fn test_only_the_prefix_leaves_the_process() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex("^/range/password/[0-9A-F]{5}$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let report = client(&server)
        .resolve_exposure(Credential::password("hunter2"), None)
        .await
        .unwrap();

    assert!(!report.is_breached());
    assert_eq!(report.risk_tier, RiskTier::Safe);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/range/password/F3BBB");
    assert!(requests[0].url.query().is_none());
    assert!(requests[0].body.is_empty());

    let serialized = serde_json::to_string(&report).unwrap();
    assert!(!serialized.contains("hunter2"));
}

#[tokio::test]
async fn test_cached_report_is_reused() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "hash": "0569261A24B3766275B7000CE8D7B32E2F7", "breach": breach("adobe", "Adobe", "2013-10-04") },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let first = client
        .resolve_exposure(Credential::email("user@example.com"), None)
        .await
        .unwrap();
    let second = client
        .resolve_exposure(Credential::email("USER@example.com"), None)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.risk_tier, RiskTier::Low);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let results = futures::future::join_all(
        (0..5).map(|_| client.resolve_exposure(Credential::email("user@example.com"), None)),
    )
    .await;

    assert!(results.iter().all(|r| r.is_ok()));
}

#[tokio::test]
async fn test_slow_corpus_is_unavailable_and_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let settings = EngineSettings {
        request_timeout_ms: 100,
        ..EngineSettings::new(server.uri())
    };
    let client = ExposureClient::new(settings).unwrap();

    let err = client
        .resolve_exposure(Credential::email("user@example.com"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::CorpusUnavailable(_)));
    assert!(err.is_retryable());

    let key = normalize(Credential::email("user@example.com")).unwrap();
    assert!(!client.cache().contains(&key));
}

#[tokio::test]
async fn test_rejected_query_is_not_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = client(&server)
        .resolve_exposure(Credential::email("user@example.com"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::CorpusRejected(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_invalid_credential_never_reaches_the_corpus() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);

    for credential in [
        Credential::password(""),
        Credential::password("   "),
        Credential::email("not-an-email"),
    ] {
        let err = client.resolve_exposure(credential, None).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCredential(_)));
    }
}

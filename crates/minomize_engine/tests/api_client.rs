use minomize_core::{ApiErrorKind, JobStatus};
use minomize_engine::{ApiSettings, ProcessingApi, ReqwestApiClient};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VIDEO: &str = "https://www.youtube.com/watch?v=ABC";

fn client_for(server: &MockServer) -> ReqwestApiClient {
    ReqwestApiClient::new(ApiSettings::with_base_url(server.uri())).expect("client")
}

async fn start_with_status(code: u16) -> ApiErrorKind {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process/youtube-url"))
        .respond_with(ResponseTemplate::new(code).set_body_string("nope"))
        .mount(&server)
        .await;
    client_for(&server).start_job(VIDEO).await.unwrap_err().kind
}

#[tokio::test]
async fn start_job_posts_url_and_returns_job_id() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process/youtube-url"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({ "youtubeUrl": VIDEO })))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({ "jobId": "J1" })))
        .expect(1)
        .mount(&server)
        .await;

    let job_id = client_for(&server).start_job(VIDEO).await.expect("start ok");
    assert_eq!(job_id, "J1");
}

#[tokio::test]
async fn start_job_maps_status_codes() {
    assert_eq!(start_with_status(409).await, ApiErrorKind::Conflict);
    assert_eq!(start_with_status(400).await, ApiErrorKind::InvalidInput);
    assert_eq!(
        start_with_status(500).await,
        ApiErrorKind::Server { status: 500 }
    );
    assert_eq!(
        start_with_status(404).await,
        ApiErrorKind::Server { status: 404 }
    );
}

#[tokio::test]
async fn start_conflict_message_is_user_facing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let err = client_for(&server).start_job(VIDEO).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "This video is already being processed. Please wait."
    );
}

#[tokio::test]
async fn start_job_with_unparsable_body_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).start_job(VIDEO).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Server { status: 200 });
    assert_eq!(err.message, "Failed to start processing");
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    // Nothing listens on port 1.
    let client = ReqwestApiClient::new(ApiSettings::with_base_url("http://127.0.0.1:1")).unwrap();

    let err = client.start_job(VIDEO).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Network);
    let err = client.get_status("J1").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Network);
    assert_eq!(err.message, "Network error while checking status");
}

#[tokio::test]
async fn get_status_parses_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/process/status/J1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "processing",
            "progress": 40,
            "message": "Transcribing audio"
        })))
        .mount(&server)
        .await;

    let report = client_for(&server).get_status("J1").await.expect("status ok");
    assert_eq!(report.status, JobStatus::Processing);
    assert_eq!(report.progress, Some(40));
    assert_eq!(report.message.as_deref(), Some("Transcribing audio"));
}

#[tokio::test]
async fn get_status_accepts_fractional_and_out_of_range_progress() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/process/status/half"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "processing", "progress": 42.5})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/process/status/over"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "processing", "progress": 150})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/process/status/odd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"status": "queued", "progress": "n/a", "message": null}),
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let half = client.get_status("half").await.expect("fractional progress");
    assert_eq!(half.status, JobStatus::Processing);
    assert_eq!(half.progress, Some(43));
    let over = client.get_status("over").await.expect("large progress");
    assert_eq!(over.progress, Some(100));
    let odd = client.get_status("odd").await.expect("non-numeric progress");
    assert_eq!(odd.status, JobStatus::Queued);
    assert_eq!(odd.progress, None);
}

#[tokio::test]
async fn get_status_escapes_job_id_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/process/status/a%2Fb%3Fc%23d"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "complete"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = client_for(&server).get_status("a/b?c#d").await.expect("escaped id");
    assert_eq!(report.status, JobStatus::Complete);
}

#[tokio::test]
async fn base_url_with_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/process/status/J1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "queued"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client =
        ReqwestApiClient::new(ApiSettings::with_base_url(format!("{}/api/", server.uri())))
            .expect("client");
    let report = client.get_status("J1").await.expect("status ok");
    assert_eq!(report.status, JobStatus::Queued);
}

#[test]
fn unparsable_base_url_is_rejected() {
    let err = ReqwestApiClient::new(ApiSettings::with_base_url("not a url")).unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::InvalidInput);
}

#[tokio::test]
async fn get_status_maps_status_codes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/process/status/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/process/status/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = client.get_status("gone").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::NotFound);
    assert_eq!(err.message, "Processing job not found");

    let err = client.get_status("broken").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Server { status: 503 });
    assert_eq!(err.message, "Failed to check processing status");
}

#[tokio::test]
async fn custom_source_kind_changes_endpoint_and_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process/vimeo-url"))
        .and(body_json(serde_json::json!({ "vimeoUrl": "https://vimeo.com/1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "jobId": "V1" })))
        .mount(&server)
        .await;

    let settings = ApiSettings {
        source_kind: "vimeo".to_string(),
        source_field: "vimeoUrl".to_string(),
        ..ApiSettings::with_base_url(format!("{}/", server.uri()))
    };
    let client = ReqwestApiClient::new(settings).unwrap();
    assert_eq!(client.start_job("https://vimeo.com/1").await.unwrap(), "V1");
}

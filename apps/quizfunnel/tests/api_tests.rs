//! Integration tests for the quiz funnel HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
// Allow holding MutexGuard across await in auth tests - tests are serialized
// intentionally to avoid env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use async_trait::async_trait;
use axum::http::HeaderValue;
use axum_test::TestServer;
use quizfunnel::api::{
    AppState, BookingResponse, ErrorResponse, GenerateResponse, HealthResponse, ResultSource,
    SubmitResponse, create_router,
};
use quizfunnel::generator::{GeneratorError, ResultGenerator};
use quizfunnel_core::{
    CompletionPrompt, FallbackRenderer, Stage, StatsReport, Storage, TemplateVersion,
    render::HEADING_CALL_TO_ACTION,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mutex to serialize tests since auth tests modify env vars.
static AUTH_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard wrapper that holds the mutex and ensures cleanup on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var("QUIZFUNNEL_API_KEY") };
    }
}

fn lock_env() -> TestGuard {
    let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var("QUIZFUNNEL_API_KEY") };
    TestGuard { _guard: guard }
}

/// Test server over fresh in-memory storage and no generator.
fn create_test_server() -> (TestServer, TestGuard) {
    let guard = lock_env();
    let state = AppState::new(Storage::in_memory());
    (TestServer::new(create_router(state)).unwrap(), guard)
}

fn create_server_with_state(state: AppState) -> (TestServer, TestGuard) {
    let guard = lock_env();
    (TestServer::new(create_router(state)).unwrap(), guard)
}

/// Generator stub returning a fixed outcome.
struct StubGenerator(Result<&'static str, u16>);

#[async_trait]
impl ResultGenerator for StubGenerator {
    async fn generate(&self, prompt: &CompletionPrompt) -> Result<String, GeneratorError> {
        assert!(!prompt.system.is_empty());
        match self.0 {
            Ok(text) => Ok(text.to_string()),
            Err(code) => Err(GeneratorError::Status(code, "upstream down".to_string())),
        }
    }
}

fn state_with_generator(outcome: Result<&'static str, u16>) -> AppState {
    AppState::new(Storage::in_memory()).with_generator(Some(Arc::new(StubGenerator(outcome))))
}

/// Generator stub that only counts how often it is called.
struct CountingGenerator(Arc<AtomicUsize>);

#[async_trait]
impl ResultGenerator for CountingGenerator {
    async fn generate(&self, _prompt: &CompletionPrompt) -> Result<String, GeneratorError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok("<p>ok</p>".to_string())
    }
}

fn state_with_counter() -> (AppState, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = AppState::new(Storage::in_memory())
        .with_generator(Some(Arc::new(CountingGenerator(Arc::clone(&calls)))));
    (state, calls)
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// SUBMIT ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_submit_classifies_and_stores() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/api/submit")
        .json(&json!({
            "answers": {"q0": "Анна", "q1": "B", "q2": "B", "q3": "A", "q10": "D"}
        }))
        .await;
    response.assert_status_ok();

    let body: SubmitResponse = response.json();
    assert!(body.success);
    let data = body.data.unwrap();
    assert_eq!(data.id, 1);
    assert_eq!(data.result, Stage::B);
}

#[tokio::test]
async fn test_submit_assigns_sequential_ids() {
    let (server, _guard) = create_test_server();

    for expected in 1..=3u64 {
        let response = server
            .post("/api/submit")
            .json(&json!({"answers": {"q1": "C"}}))
            .await;
        let body: SubmitResponse = response.json();
        assert_eq!(body.data.unwrap().id, expected);
    }
}

#[tokio::test]
async fn test_submit_empty_answers_rejected() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/api/submit")
        .json(&json!({"answers": {}}))
        .await;
    response.assert_status_bad_request();

    let body: SubmitResponse = response.json();
    assert!(!body.success);
    assert!(body.data.is_none());
    assert!(body.error.is_some());
}

#[tokio::test]
async fn test_submit_oversized_answer_rejected() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/api/submit")
        .json(&json!({"answers": {"q1": "x".repeat(5000)}}))
        .await;
    response.assert_status_bad_request();
}

// =============================================================================
// GENERATE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_generate_without_generator_falls_back() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/api/generate-result")
        .json(&json!({
            "name": "Мария",
            "answers": {"q1": "D", "q2": "D"},
            "questionTexts": {"q1": "Что вас радует?"},
            "answerTexts": {"q1": {"D": "Новые проекты"}}
        }))
        .await;
    response.assert_status_ok();

    let body: GenerateResponse = response.json();
    assert_eq!(body.source, ResultSource::Fallback);
    assert_eq!(body.stage, Stage::D);
    assert!(body.warning.is_some());
    assert!(body.result.contains("Мария"));
    assert!(body.result.contains("Что вас радует?"));
    assert!(body.result.contains("Новые проекты"));
}

#[tokio::test]
async fn test_generate_empty_body_still_succeeds() {
    let (server, _guard) = create_test_server();

    let response = server.post("/api/generate-result").json(&json!({})).await;
    response.assert_status_ok();

    let body: GenerateResponse = response.json();
    assert_eq!(body.stage, Stage::A);
    assert!(body.result.contains("Гость"));
}

#[tokio::test]
async fn test_generate_uses_model_text() {
    let (server, _guard) = create_server_with_state(state_with_generator(Ok(
        "<h3>Где вы сейчас</h3><p>Текст</p>\n",
    )));

    let response = server
        .post("/api/generate-result")
        .json(&json!({"name": "Анна", "answers": {"q1": "C"}}))
        .await;
    response.assert_status_ok();

    let body: GenerateResponse = response.json();
    assert_eq!(body.source, ResultSource::Model);
    assert_eq!(body.result, "<h3>Где вы сейчас</h3><p>Текст</p>");
    assert_eq!(body.stage, Stage::C);
    assert!(body.warning.is_none());
}

#[tokio::test]
async fn test_generate_blank_model_text_falls_back() {
    let (server, _guard) = create_server_with_state(state_with_generator(Ok("  \n ")));

    let response = server
        .post("/api/generate-result")
        .json(&json!({"answers": {"q1": "B"}}))
        .await;
    response.assert_status_ok();

    let body: GenerateResponse = response.json();
    assert_eq!(body.source, ResultSource::Fallback);
    assert!(body.result.contains(Stage::B.content().title));
}

#[tokio::test]
async fn test_generate_upstream_error_falls_back() {
    let (server, _guard) = create_server_with_state(state_with_generator(Err(502)));

    let response = server
        .post("/api/generate-result")
        .json(&json!({"answers": {"q1": "A"}}))
        .await;
    response.assert_status_ok();

    let body: GenerateResponse = response.json();
    assert_eq!(body.source, ResultSource::Fallback);
    assert!(body.warning.unwrap().contains("502"));
}

#[tokio::test]
async fn test_generate_respects_configured_template() {
    let state = AppState::new(Storage::in_memory())
        .with_renderer(FallbackRenderer::new(TemplateVersion::WithCallToAction));
    let (server, _guard) = create_server_with_state(state);

    let response = server
        .post("/api/generate-result")
        .json(&json!({"answers": {"q1": "A"}}))
        .await;
    let body: GenerateResponse = response.json();
    assert!(body.result.contains(HEADING_CALL_TO_ACTION));
}

#[tokio::test]
async fn test_generate_oversized_name_rejected_before_generator() {
    let (state, calls) = state_with_counter();
    let (server, _guard) = create_server_with_state(state);

    let response = server
        .post("/api/generate-result")
        .json(&json!({"name": "x".repeat(10_000), "answers": {"q1": "A"}}))
        .await;
    response.assert_status_bad_request();

    let body: ErrorResponse = response.json();
    assert!(body.error.contains("name"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generate_too_many_labels_rejected_before_generator() {
    let (state, calls) = state_with_counter();
    let (server, _guard) = create_server_with_state(state);

    let question_texts: serde_json::Map<String, serde_json::Value> = (0..1000)
        .map(|i| (format!("q{}", i), json!("label")))
        .collect();
    let response = server
        .post("/api/generate-result")
        .json(&json!({"answers": {"q1": "A"}, "questionTexts": question_texts}))
        .await;
    response.assert_status_bad_request();

    let body: ErrorResponse = response.json();
    assert!(body.error.contains("labels"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generate_within_limits_reaches_generator() {
    let (state, calls) = state_with_counter();
    let (server, _guard) = create_server_with_state(state);

    let response = server
        .post("/api/generate-result")
        .json(&json!({"name": "Анна", "answers": {"q1": "A"}}))
        .await;
    response.assert_status_ok();

    let body: GenerateResponse = response.json();
    assert_eq!(body.source, ResultSource::Model);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_submit_too_many_answers_rejected() {
    let (server, _guard) = create_test_server();

    let answers: serde_json::Map<String, serde_json::Value> = (0..200)
        .map(|i| (format!("q{}", i), json!("A")))
        .collect();
    let response = server
        .post("/api/submit")
        .json(&json!({"answers": answers}))
        .await;
    assert!(response.status_code().is_client_error());

    let stats = server.get("/api/stats").await;
    let report: StatsReport = stats.json();
    assert_eq!(report.total_responses, 0);
}

// =============================================================================
// BOOKING ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_booking_stored_with_defaults() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/api/booking")
        .json(&json!({"name": "Ольга", "contact": "@olga"}))
        .await;
    response.assert_status_ok();

    let body: BookingResponse = response.json();
    assert!(body.success);
    let booking = body.data.unwrap();
    assert_eq!(booking.id, 1);
    assert_eq!(booking.source, "landing-page");
    assert_eq!(booking.status, "pending");
}

#[tokio::test]
async fn test_booking_missing_contact_rejected() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/api/booking")
        .json(&json!({"name": "Ольга", "contact": "   "}))
        .await;
    response.assert_status_bad_request();

    let body: BookingResponse = response.json();
    assert!(!body.success);
    assert!(body.error.unwrap().contains("contact"));
}

#[tokio::test]
async fn test_booking_missing_name_rejected() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/api/booking")
        .json(&json!({"contact": "+7 900 000 00 00"}))
        .await;
    response.assert_status_bad_request();
}

// =============================================================================
// STATS ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_stats_empty() {
    let (server, _guard) = create_test_server();

    let response = server.get("/api/stats").await;
    response.assert_status_ok();

    let report: StatsReport = response.json();
    assert_eq!(report.total_responses, 0);
    assert!(report.recent_responses.is_empty());
}

#[tokio::test]
async fn test_stats_after_submissions() {
    let (server, _guard) = create_test_server();

    for answers in [
        json!({"q0": "Анна", "q1": "A", "q10": "B"}),
        json!({"q0": "Мария", "q1": "C", "q2": "C"}),
        json!({"q1": "C"}),
    ] {
        server
            .post("/api/submit")
            .json(&json!({ "answers": answers }))
            .await
            .assert_status_ok();
    }

    let response = server.get("/api/stats").await;
    response.assert_status_ok();

    let raw: serde_json::Value = response.json();
    assert_eq!(raw["totalResponses"], 3);
    assert_eq!(raw["resultsDistribution"]["C"], 2);
    assert_eq!(raw["answersDistribution"]["q1"]["A"], 1);
    assert!(raw["answersDistribution"].get("q0").is_none());
    assert!(raw["answersDistribution"].get("q10").is_none());

    let report: StatsReport = response.json();
    assert_eq!(report.recent_responses.len(), 3);
    assert_eq!(report.recent_responses[0].id, 3);
    assert_eq!(report.recent_responses[0].name, "Гость");
}

#[tokio::test]
async fn test_stats_over_redb_storage() {
    let temp = tempfile::tempdir().unwrap();
    let state = AppState::new(Storage::with_redb(temp.path().join("funnel.redb")).unwrap());
    let (server, _guard) = create_server_with_state(state);

    server
        .post("/api/submit")
        .json(&json!({"answers": {"q1": "D"}}))
        .await
        .assert_status_ok();
    server
        .post("/api/booking")
        .json(&json!({"name": "Анна", "contact": "@anna", "source": "result-page"}))
        .await
        .assert_status_ok();

    let report: StatsReport = server.get("/api/stats").await.json();
    assert_eq!(report.total_responses, 1);
    assert_eq!(report.results_distribution.get(&Stage::D), Some(&1));
}

// =============================================================================
// ERROR HANDLING TESTS
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/api/unknown").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (server, _guard) = create_test_server();

    let response = server.get("/api/submit").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

// =============================================================================
// AUTHENTICATION MIDDLEWARE TESTS
// =============================================================================

/// Create a test server with authentication enabled.
/// Must be called while holding AUTH_TEST_MUTEX.
fn create_auth_test_server(api_key: &str) -> TestServer {
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::set_var("QUIZFUNNEL_API_KEY", api_key) };
    let state = AppState::new(Storage::in_memory());
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let _guard = lock_env();
    let api_key = "test-secret-key-12345";
    let server = create_auth_test_server(api_key);

    let response = server
        .get("/api/stats")
        .add_header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", api_key)
                .parse::<HeaderValue>()
                .unwrap(),
        )
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_valid_raw_token() {
    let _guard = lock_env();
    let api_key = "test-raw-key-67890";
    let server = create_auth_test_server(api_key);

    let response = server
        .get("/api/stats")
        .add_header(
            axum::http::header::AUTHORIZATION,
            api_key.parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let _guard = lock_env();
    let server = create_auth_test_server("correct-key");

    let response = server
        .get("/api/stats")
        .add_header(
            axum::http::header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .await;

    assert_eq!(
        response.status_code().as_u16(),
        401,
        "Invalid token should return 401 Unauthorized"
    );
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let _guard = lock_env();
    let server = create_auth_test_server("correct-key");

    let response = server.get("/api/stats").await;

    assert_eq!(
        response.status_code().as_u16(),
        401,
        "Missing Authorization header should return 401 Unauthorized"
    );
}

#[tokio::test]
async fn test_auth_funnel_endpoints_stay_public() {
    let _guard = lock_env();
    let server = create_auth_test_server("correct-key");

    server.get("/health").await.assert_status_ok();
    server
        .post("/api/submit")
        .json(&json!({"answers": {"q1": "A"}}))
        .await
        .assert_status_ok();
    server
        .post("/api/generate-result")
        .json(&json!({"answers": {"q1": "A"}}))
        .await
        .assert_status_ok();
    server
        .post("/api/booking")
        .json(&json!({"name": "Анна", "contact": "anna@example.com"}))
        .await
        .assert_status_ok();
}

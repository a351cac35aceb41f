// tests/api_tests.rs

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};

use evaluator::api::{Backend, FileUpload, HttpBackend, Method, as_json, get_as};
use evaluator::config::Config;
use evaluator::controller::{BulkOutcome, DetailSlot, FilterChange};
use evaluator::error::AppError;
use evaluator::models::exam_result::ExamResultDetail;
use evaluator::pages::question_bank::QuestionBank;
use evaluator::routes;
use evaluator::state::AppState;
use evaluator::utils::notify::RecordingNotifier;
use evaluator::utils::storage::MemoryStore;

const TOKEN: &str = "test-token";

async fn list_questions(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    Json(json!({
        "data": [
            { "id": 1, "question": "<p>Echo</p>", "category": params.get("category") },
        ],
        "current_page": page,
        "per_page": params.get("per_page"),
        "total": "1",
        "last_page": 1,
    }))
}

async fn create_question(Json(body): Json<Value>) -> impl IntoResponse {
    if body["category"] == "Duplicate" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "The given data was invalid.",
                "errors": { "question": ["This question already exists."] },
            })),
        );
    }
    (StatusCode::CREATED, Json(json!({ "id": 99 })))
}

async fn bulk_archive(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthenticated." })),
        );
    }
    let count = body["ids"].as_array().map(Vec::len).unwrap_or(0);
    (StatusCode::OK, Json(json!({ "archived": count })))
}

async fn import(mut multipart: Multipart) -> Json<Value> {
    let mut seen = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        seen.push(json!({ "field": name, "file_name": file_name, "size": bytes.len() }));
    }
    Json(json!({ "message": "Imported.", "parts": seen }))
}

async fn result_detail(
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if params.get("as").map(String::as_str) != Some("json") {
        return (StatusCode::NOT_ACCEPTABLE, "html only").into_response();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "No such result." })))
            .into_response();
    }
    Json(json!({
        "result": { "id": id, "name": "Ana", "score_percentage": "88.5", "remark": "Passed" },
        "answers": [{ "question_id": 3, "is_correct": "0" }],
    }))
    .into_response()
}

async fn crash() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>Whoops</html>")
}

/// Spawns a stand-in exam backend on a random port, mounted under `/api`.
/// Returns the base URL (e.g., "http://127.0.0.1:12345/api").
async fn spawn_app() -> String {
    let evaluator = Router::new()
        .route("/evaluator/questions", get(list_questions).post(create_question))
        .route("/evaluator/questions/bulk-archive", post(bulk_archive))
        .route("/evaluator/questions/import", post(import))
        .route("/evaluator/exam-results/{id}", get(result_detail))
        .route("/evaluator/crash", get(crash));
    let app = Router::new().nest("/api", evaluator);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}/api", port)
}

fn state_for(address: &str, token: Option<&str>) -> (AppState, Arc<RecordingNotifier>) {
    let backend = HttpBackend::new(address, token.map(str::to_string)).unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let state = AppState::new(
        Arc::new(backend),
        notifier.clone(),
        Arc::new(MemoryStore::new()),
        Config::with_api_url(address),
    );
    (state, notifier)
}

#[tokio::test]
async fn list_query_reaches_the_backend() {
    // Arrange
    let address = spawn_app().await;
    let (state, _) = state_for(&address, None);
    let bank = QuestionBank::new(state);

    // Act
    bank.active
        .configure([
            FilterChange::Category(Some("Logic".to_string())),
            FilterChange::PerPage(25),
        ])
        .await;
    bank.active.fetch_page(2).await.expect("Failed to fetch questions");

    // Assert
    let rows = bank.active.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category, "Logic");
    let meta = bank.active.page().await;
    assert_eq!(meta.current_page, 2);
    assert_eq!(meta.per_page, 25);
    assert_eq!(meta.total, 1);
}

#[tokio::test]
async fn unprocessable_entity_maps_to_field_errors() {
    let address = spawn_app().await;
    let backend = HttpBackend::new(&address, None).unwrap();

    let err = backend
        .send(
            Method::Post,
            routes::QUESTIONS,
            Some(json!({ "category": "Duplicate" })),
        )
        .await
        .unwrap_err();

    match err {
        AppError::Validation(errors) => {
            assert_eq!(errors["question"], vec!["This question already exists."]);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn bulk_archive_carries_token_and_ids() {
    // Arrange
    let address = spawn_app().await;
    let (state, notifier) = state_for(&address, Some(TOKEN));
    let bank = QuestionBank::new(state);
    bank.active.toggle(5).await;
    bank.active.toggle(6).await;

    // Act
    let outcome = bank.archive_selected().await;

    // Assert
    assert_eq!(outcome, BulkOutcome::Applied(2));
    assert!(bank.active.selected().await.is_empty());
    assert!(notifier.notices()[0].message.starts_with("2 item(s)"));
}

#[tokio::test]
async fn missing_token_is_an_auth_error() {
    let address = spawn_app().await;
    let backend = HttpBackend::new(&address, None).unwrap();

    let err = backend
        .send(
            Method::Post,
            routes::QUESTIONS_BULK_ARCHIVE,
            Some(json!({ "ids": [1] })),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AuthError(msg) if msg == "Unauthenticated."));
}

#[tokio::test]
async fn upload_is_sent_as_multipart_file_field() {
    let address = spawn_app().await;
    let backend = HttpBackend::new(&address, None).unwrap();

    let body = backend
        .upload(
            routes::QUESTIONS_IMPORT,
            FileUpload {
                field: "file".to_string(),
                file_name: "bank.csv".to_string(),
                bytes: b"question,a,b\n".to_vec(),
            },
        )
        .await
        .expect("Upload failed");

    assert_eq!(body["parts"][0]["field"], "file");
    assert_eq!(body["parts"][0]["file_name"], "bank.csv");
    assert_eq!(body["parts"][0]["size"], 13);
}

#[tokio::test]
async fn detail_is_requested_as_json_and_decoded_leniently() {
    let address = spawn_app().await;
    let backend = HttpBackend::new(&address, None).unwrap();

    let detail: ExamResultDetail = get_as(&backend, &routes::exam_result(12), &as_json())
        .await
        .expect("Failed to load detail");

    assert_eq!(detail.result.id, 12);
    assert_eq!(detail.result.student_name, "Ana");
    assert_eq!(detail.result.score_percentage, 88.5);
    assert!(detail.result.passed());
    assert_eq!(detail.wrong_answers().count(), 1);
}

#[tokio::test]
async fn missing_detail_fails_the_slot() {
    let address = spawn_app().await;
    let (state, _) = state_for(&address, None);
    let page = evaluator::pages::exam_results::ExamResultsPage::new(state);

    let slot = page.open_detail(404).await;

    assert!(matches!(slot, DetailSlot::Failed(msg) if msg == "No such result."));
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_message() {
    let address = spawn_app().await;
    let backend = HttpBackend::new(&address, None).unwrap();

    let err = backend.get("evaluator/crash", &[]).await.unwrap_err();

    assert!(matches!(err, AppError::InternalServerError(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let backend = HttpBackend::new("http://127.0.0.1:9", None).unwrap();

    let err = backend.get(routes::QUESTIONS, &[]).await.unwrap_err();

    assert!(matches!(err, AppError::Network(_)));
}

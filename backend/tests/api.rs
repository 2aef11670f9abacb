//! HTTP API integration tests, driving the router in-process.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use datasweeper::api::{router, AppState};
use datasweeper::ServerConfig;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "datasweeper-test-boundary";

fn app() -> Router {
    router(AppState::new(ServerConfig::default()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec(), headers)
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body, _) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

fn multipart(uri: &str, files: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, content) in files {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n{}\r\n",
            BOUNDARY, name, content
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

async fn new_session(app: &Router) -> String {
    let (status, json) = send_json(app, empty(Method::POST, "/api/sessions")).await;
    assert_eq!(status, StatusCode::CREATED);
    json["sessionId"].as_str().unwrap().to_string()
}

/// Upload one CSV and return its file id.
async fn upload_csv(app: &Router, session: &str, name: &str, content: &str) -> String {
    let uri = format!("/api/sessions/{}/files", session);
    let (status, json) = send_json(app, multipart(&uri, &[(name, content)])).await;
    assert_eq!(status, StatusCode::OK);
    json["files"][0]["file"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, json) = send_json(&app(), empty(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_upload_reports_each_file() {
    let app = app();
    let session = new_session(&app).await;

    let uri = format!("/api/sessions/{}/files", session);
    let request = multipart(&uri, &[("notes.txt", "hello"), ("sales.csv", "item,qty\npen,3\ncup,\n")]);
    let (status, json) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);

    assert_eq!(files[0]["status"], "error");
    assert_eq!(files[0]["name"], "notes.txt");

    assert_eq!(files[1]["status"], "ok");
    let file = &files[1]["file"];
    assert_eq!(file["name"], "sales.csv");
    assert_eq!(file["rowCount"], 2);
    assert_eq!(file["columns"][1]["type"], "float");
    assert_eq!(file["preview"][1][1], Value::Null);
    assert_eq!(file["stages"], serde_json::json!(["uploaded", "previewed"]));

    let (status, json) = send_json(&app, empty(Method::GET, &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_clean_chart_and_export_excel() {
    let app = app();
    let session = new_session(&app).await;
    let file = upload_csv(&app, &session, "Scores.CSV", "name,score\na,1\na,1\nb,\nc,3\n").await;
    let base = format!("/api/sessions/{}/files/{}", session, file);

    let (status, json) = send_json(&app, empty(Method::POST, &format!("{}/dedup", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);
    assert_eq!(json["file"]["rowCount"], 3);

    let (status, json) = send_json(&app, empty(Method::POST, &format!("{}/fill-missing", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["report"]["columns"][0]["filled"], 1);
    assert_eq!(json["file"]["preview"][1][1], 2.0);

    let (status, json) = send_json(&app, empty(Method::GET, &format!("{}/chart", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "chart");
    assert_eq!(json["chart"]["column"], "score");

    let (status, body, headers) = send(&app, empty(Method::GET, &format!("{}/export?format=excel", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("Scores.xlsx"));
    assert_eq!(&body[..2], b"PK");
}

#[tokio::test]
async fn test_selection_applies_to_csv_export() {
    let app = app();
    let session = new_session(&app).await;
    let file = upload_csv(&app, &session, "people.csv", "name,age,city\nAnn,31,Paris\n").await;
    let base = format!("/api/sessions/{}/files/{}", session, file);

    let request = Request::builder()
        .method(Method::PUT)
        .uri(format!("{}/columns", base))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"columns":["city","name"]}"#))
        .unwrap();
    let (status, json) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["selectedColumns"], serde_json::json!(["name", "city"]));

    let (status, body, headers) = send(&app, empty(Method::GET, &format!("{}/export?format=csv", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    assert_eq!(String::from_utf8(body).unwrap(), "name,city\nAnn,Paris\n");

    let (status, json) = send_json(&app, empty(Method::POST, &format!("{}/reset", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["selectedColumns"], serde_json::json!(["name", "age", "city"]));
}

#[tokio::test]
async fn test_errors() {
    let app = app();

    let (status, json) = send_json(&app, empty(Method::GET, "/api/sessions/not-a-session/files")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], "error");

    let session = new_session(&app).await;
    let file = upload_csv(&app, &session, "t.csv", "label\nx\n").await;
    let base = format!("/api/sessions/{}/files/{}", session, file);

    let (status, json) = send_json(&app, empty(Method::GET, &format!("{}/chart", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "skipped");

    let mixed = upload_csv(&app, &session, "m.csv", "label,n\nx,1\n").await;
    let uri = format!("/api/sessions/{}/files/{}/chart?column=label", session, mixed);
    let (status, json) = send_json(&app, empty(Method::GET, &uri)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "Column 'label' is not numeric");

    let (status, _) = send_json(&app, empty(Method::GET, &format!("{}/export?format=pdf", base))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, empty(Method::DELETE, &format!("/api/sessions/{}", session))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(&app, empty(Method::GET, &base)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

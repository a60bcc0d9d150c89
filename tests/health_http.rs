mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_server;
use common::http::{assert_json_error, call, request, response_json};

#[tokio::test]
async fn it_health_live_and_ready() {
    let app = spawn_test_server().await;

    let (live_status, _) = call(&app.app, Method::GET, "/health/live", None).await;
    assert_eq!(live_status, StatusCode::OK);

    let (ready_status, body) = call(&app.app, Method::GET, "/health/ready", None).await;
    assert_eq!(ready_status, StatusCode::OK);
    assert_eq!(body["migrated"], true);
}

#[tokio::test]
async fn it_health_database_is_ok() {
    let app = spawn_test_server().await;
    let (status, body) = call(&app.app, Method::GET, "/health/database", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
}

#[tokio::test]
async fn it_request_id_is_echoed() {
    let app = spawn_test_server().await;
    let resp = request(
        &app.app,
        Method::GET,
        "/health",
        None,
        &[("x-request-id", "trace-abc_1".to_string())],
    )
    .await;
    let (status, headers, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-request-id"], "trace-abc_1");
    assert_eq!(body["service"], "quest-engine");
}

#[tokio::test]
async fn it_unknown_route_gets_json_error_with_trace_id() {
    let app = spawn_test_server().await;
    let (status, body) = call(&app.app, Method::GET, "/api/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");
}

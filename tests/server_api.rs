use std::{os::unix::fs::PermissionsExt as _, path::Path, time::Duration};

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use tower::ServiceExt as _;

use quizreel::server::{AppState, ServerConfig, app};

fn write_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Stands in for the renderer binary: records that it ran, then writes the
/// artifact. Invoked as `<renderer> render --props <p> --out <o>`, so the
/// artifact path is `$5`.
fn fake_renderer(dir: &Path) -> std::path::PathBuf {
    write_script(
        dir,
        "fake-renderer.sh",
        "#!/bin/sh\ntouch \"$(dirname \"$0\")/invoked\"\nprintf 'FAKE_MP4' > \"$5\"\n",
    )
}

fn failing_renderer(dir: &Path) -> std::path::PathBuf {
    write_script(
        dir,
        "failing-renderer.sh",
        "#!/bin/sh\necho 'renderer exploded' >&2\nexit 1\n",
    )
}

fn test_state(dir: &Path, renderer: std::path::PathBuf) -> AppState {
    let mut cfg = ServerConfig::new(0, dir.join("out"), renderer);
    cfg.public_base_url = "http://localhost:5000".to_string();
    cfg.render_timeout = Duration::from_secs(10);
    AppState::new(cfg)
}

fn render_body(questions: serde_json::Value) -> Body {
    Body::from(
        serde_json::json!({
            "questions": questions,
            "style": {
                "backgroundColor": "#1a1a1a",
                "textColor": "#ffffff",
                "accentColor": "#4f46e5",
                "font": "Inter"
            }
        })
        .to_string(),
    )
}

fn valid_questions() -> serde_json::Value {
    serde_json::json!([{
        "id": "q1",
        "text": "Capital of France?",
        "options": [
            { "text": "Paris", "correct": true },
            { "text": "Lyon", "correct": false }
        ],
        "duration": 5
    }])
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn status_returns_fixed_acknowledgment() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), fake_renderer(dir.path()));

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn empty_question_list_is_rejected_before_the_renderer_runs() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), fake_renderer(dir.path()));

    let response = app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/render")
                .header(header::CONTENT_TYPE, "application/json")
                .body(render_body(serde_json::json!([])))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("no questions"));
    // The renderer stub was never invoked.
    assert!(!dir.path().join("invoked").exists());
}

#[tokio::test]
async fn invalid_question_is_rejected_with_400() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), fake_renderer(dir.path()));

    let mut bad = valid_questions();
    bad[0]["duration"] = serde_json::json!(0);
    let response = app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/render")
                .header(header::CONTENT_TYPE, "application/json")
                .body(render_body(bad))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn successful_render_writes_props_and_serves_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), fake_renderer(dir.path()));

    let response = app(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/render")
                .header(header::CONTENT_TYPE, "application/json")
                .body(render_body(valid_questions()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["downloadLink"], "http://localhost:5000/video.mp4");

    // The props document landed next to the artifact, versioned.
    let props: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out/inputProps.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(props["version"], 1);
    assert_eq!(props["questions"][0]["duration"], 5);

    // And the artifact is downloadable.
    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/video.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "video/mp4"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"FAKE_MP4");
}

#[tokio::test]
async fn failing_renderer_surfaces_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), failing_renderer(dir.path()));

    let response = app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/render")
                .header(header::CONTENT_TYPE, "application/json")
                .body(render_body(valid_questions()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("renderer exited"));
    assert!(json["stderr"].as_str().unwrap().contains("renderer exploded"));
}

#[tokio::test]
async fn renderer_timeout_is_a_render_failure() {
    let dir = tempfile::tempdir().unwrap();
    let slow = write_script(dir.path(), "slow.sh", "#!/bin/sh\nsleep 30\n");
    let mut cfg = ServerConfig::new(0, dir.path().join("out"), slow);
    cfg.render_timeout = Duration::from_millis(200);
    let state = AppState::new(cfg);

    let response = app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/render")
                .header(header::CONTENT_TYPE, "application/json")
                .body(render_body(valid_questions()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn missing_artifact_is_404_with_an_error_payload() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), fake_renderer(dir.path()));

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/video.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("no rendered video"));
}

#[tokio::test]
async fn renderer_that_produces_no_artifact_is_a_render_failure() {
    let dir = tempfile::tempdir().unwrap();
    let noop = write_script(dir.path(), "noop.sh", "#!/bin/sh\nexit 0\n");
    let state = test_state(dir.path(), noop);

    let response = app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/render")
                .header(header::CONTENT_TYPE, "application/json")
                .body(render_body(valid_questions()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

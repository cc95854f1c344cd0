pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::ranking::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Session API
        .route("/api/v1/criteria", post(handlers::handle_create_criteria))
        .route(
            "/api/v1/sessions/:id/criteria",
            get(handlers::handle_get_criteria).put(handlers::handle_replace_criteria),
        )
        .route("/api/v1/sessions/:id", delete(handlers::handle_delete_session))
        .route(
            "/api/v1/sessions/:id/scores",
            post(handlers::handle_score_resumes),
        )
        // Single-session compatibility API
        .route("/extract_criteria/", post(handlers::handle_legacy_extract))
        .route("/score_resumes/", post(handlers::handle_legacy_score))
        .layer(upload_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::documents::docx::tests::make_docx;
    use crate::llm_client::testing::ScriptedBackend;
    use crate::ranking::scoring::tests::reply_for;
    use crate::ranking::scoring::BatchPolicy;
    use crate::session::SessionStore;

    const BOUNDARY: &str = "ranker-test-boundary";
    const CRITERIA_REPLY: &str = r#"{"criteria": ["Python", "AWS"]}"#;

    fn test_config(batch_policy: BatchPolicy) -> Config {
        Config {
            groq_api_key: "test-key".to_string(),
            groq_base_url: "http://127.0.0.1:9".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            llm_timeout_secs: 5,
            llm_json_mode: true,
            batch_policy,
            max_upload_bytes: 2 * 1024 * 1024,
        }
    }

    fn app_with(backend: Arc<ScriptedBackend>, batch_policy: BatchPolicy) -> Router {
        build_router(AppState {
            llm: backend,
            sessions: SessionStore::new(),
            config: test_config(batch_policy),
        })
    }

    fn docx(text: &str) -> Vec<u8> {
        make_docx(&[text])
    }

    fn multipart_request(
        method: &str,
        uri: &str,
        field: &str,
        files: &[(&str, Vec<u8>)],
    ) -> Request<Body> {
        let mut body = Vec::new();
        for (filename, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    fn header_value<'a>(response: &'a Response, name: &str) -> &'a str {
        response.headers()[name].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app_with(Arc::new(ScriptedBackend::default()), BatchPolicy::Continue);
        let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-ranker");
    }

    #[tokio::test]
    async fn test_extract_then_score_returns_ranked_csv() {
        let backend = Arc::new(ScriptedBackend::new([
            CRITERIA_REPLY.to_string(),
            reply_for("Ann", "15"),
            reply_for("Bob", "18"),
        ]));
        let app = app_with(backend.clone(), BatchPolicy::Continue);

        let response = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                "/api/v1/criteria",
                "file",
                &[("jd.docx", docx("Backend engineer. Python and AWS required."))],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["criteria"], json!(["Python", "AWS"]));
        assert_eq!(created["revision"], 1);
        let session_id = created["session_id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(multipart_request(
                "POST",
                &format!("/api/v1/sessions/{session_id}/scores"),
                "resumes",
                &[
                    ("ann.docx", docx("Ann, Python developer")),
                    ("bob.docx", docx("Bob, Python and AWS")),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_value(&response, "content-type"), "text/csv; charset=utf-8");
        assert_eq!(
            header_value(&response, "content-disposition"),
            "attachment; filename=resumes_scores.csv"
        );
        assert_eq!(header_value(&response, "x-scored-count"), "2");
        assert_eq!(header_value(&response, "x-failed-count"), "0");
        assert_eq!(
            body_text(response).await,
            "candidate_name,Python_development,total_score\nBob,4,18\nAnn,4,15\n"
        );

        let requests = backend.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].prompt.contains("Python and AWS required."));
        assert!(requests[1].prompt.contains("- Python\n- AWS"));
        assert!(requests[1].prompt.contains("Ann, Python developer"));
    }

    #[tokio::test]
    async fn test_unsupported_job_description_makes_no_model_call() {
        let backend = Arc::new(ScriptedBackend::new([CRITERIA_REPLY]));
        let app = app_with(backend.clone(), BatchPolicy::Continue);

        let response = app
            .oneshot(multipart_request(
                "POST",
                "/extract_criteria/",
                "file",
                &[("notes.txt", b"Python, AWS".to_vec())],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "UNSUPPORTED_FORMAT");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_job_description_is_a_server_error() {
        let backend = Arc::new(ScriptedBackend::new([CRITERIA_REPLY]));
        let app = app_with(backend.clone(), BatchPolicy::Continue);

        for (filename, bytes) in [
            ("jd.pdf", b"%PDF-1.4 garbage".to_vec()),
            ("jd.docx", b"not a zip".to_vec()),
        ] {
            let response = app
                .clone()
                .oneshot(multipart_request(
                    "POST",
                    "/extract_criteria/",
                    "file",
                    &[(filename, bytes)],
                ))
                .await
                .unwrap();

            assert_eq!(
                response.status(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "{filename}"
            );
            assert_eq!(body_json(response).await["error"]["code"], "PARSE_FAILURE");
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_scoring_before_extraction_makes_no_model_call() {
        let backend = Arc::new(ScriptedBackend::new([reply_for("Ann", "15")]));
        let app = app_with(backend.clone(), BatchPolicy::Continue);

        let response = app
            .oneshot(multipart_request(
                "POST",
                "/score_resumes/",
                "resumes",
                &[("ann.docx", docx("Ann resume"))],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "CRITERIA_NOT_SET");
        assert_eq!(
            body["error"]["message"],
            "No criteria found. Please extract criteria first."
        );
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_compatibility_routes_share_the_default_session() {
        let backend = Arc::new(ScriptedBackend::new([
            CRITERIA_REPLY.to_string(),
            reply_for("Jane Doe", "4"),
        ]));
        let app = app_with(backend, BatchPolicy::Continue);

        let response = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                "/extract_criteria/",
                "file",
                &[("jd.docx", docx("Python and AWS"))],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"criteria": ["Python", "AWS"]})
        );

        let response = app
            .oneshot(multipart_request(
                "POST",
                "/score_resumes/",
                "resumes",
                &[("jane.docx", docx("Jane Doe"))],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "candidate_name,Python_development,total_score\nJane Doe,4,4\n"
        );
    }

    #[tokio::test]
    async fn test_continue_policy_reports_failed_resume_as_last_row() {
        let backend = Arc::new(ScriptedBackend::new([
            CRITERIA_REPLY.to_string(),
            reply_for("Ann", "3"),
            "I cannot score this resume.".to_string(),
        ]));
        let app = app_with(backend, BatchPolicy::Continue);

        app.clone()
            .oneshot(multipart_request(
                "POST",
                "/extract_criteria/",
                "file",
                &[("jd.docx", docx("Python and AWS"))],
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(multipart_request(
                "POST",
                "/score_resumes/",
                "resumes",
                &[("ann.docx", docx("Ann")), ("bob.docx", docx("Bob"))],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_value(&response, "x-scored-count"), "1");
        assert_eq!(header_value(&response, "x-failed-count"), "1");
        let csv = body_text(response).await;
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "candidate_name,Python_development,total_score,scoring_error");
        assert_eq!(lines[1], "Ann,4,3,");
        assert_eq!(lines[2], "bob.docx,,,No JSON object found in the model reply");
    }

    #[tokio::test]
    async fn test_fail_fast_policy_names_the_failing_resume() {
        let backend = Arc::new(ScriptedBackend::new([
            CRITERIA_REPLY.to_string(),
            "I cannot score this resume.".to_string(),
        ]));
        let app = app_with(backend.clone(), BatchPolicy::FailFast);

        app.clone()
            .oneshot(multipart_request(
                "POST",
                "/extract_criteria/",
                "file",
                &[("jd.docx", docx("Python and AWS"))],
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(multipart_request(
                "POST",
                "/score_resumes/",
                "resumes",
                &[("bob.docx", docx("Bob")), ("ann.docx", docx("Ann"))],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NO_JSON_FOUND");
        assert!(body["error"]["message"].as_str().unwrap().contains("bob.docx"));
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let backend = Arc::new(ScriptedBackend::new([
            CRITERIA_REPLY,
            r#"{"criteria": ["Go"]}"#,
        ]));
        let app = app_with(backend, BatchPolicy::Continue);

        let response = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                "/api/v1/criteria",
                "file",
                &[("jd.docx", docx("Python and AWS"))],
            ))
            .await
            .unwrap();
        let session_id = body_json(response).await["session_id"]
            .as_str()
            .unwrap()
            .to_string();
        let criteria_uri = format!("/api/v1/sessions/{session_id}/criteria");

        let response = app
            .clone()
            .oneshot(multipart_request(
                "PUT",
                &criteria_uri,
                "file",
                &[("jd2.docx", docx("Go developer"))],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(empty_request("GET", &criteria_uri))
            .await
            .unwrap();
        let current = body_json(response).await;
        assert_eq!(current["criteria"], json!(["Go"]));
        assert_eq!(current["revision"], 2);

        let session_uri = format!("/api/v1/sessions/{session_id}");
        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &session_uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &session_uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(empty_request("GET", &criteria_uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_without_expected_field_is_rejected() {
        let backend = Arc::new(ScriptedBackend::new([CRITERIA_REPLY]));
        let app = app_with(backend.clone(), BatchPolicy::Continue);

        let response = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                "/extract_criteria/",
                "jd",
                &[("jd.docx", docx("Python"))],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");

        let response = app
            .oneshot(multipart_request(
                "POST",
                "/api/v1/criteria",
                "file",
                &[("a.docx", docx("Python")), ("b.docx", docx("Go"))],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.call_count(), 0);
    }
}

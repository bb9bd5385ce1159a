use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use nc_core::{
    ChatMessage, ChatRequest, Completion, Error, ImageStore, InferenceModel, NewsSnippet, NewsSource, Result,
};
use nc_inference::models::DummyModel;
use nc_news::StaticNewsSource;
use nc_storage::{MemoryBlogStorage, MemoryImageStore};
use nc_web::{create_app, AppState};

const BOUNDARY: &str = "newscheck-test-boundary";

/// Replies with a fixed text and remembers every request it was given.
#[derive(Debug, Default)]
struct RecordingModel {
    reply: String,
    requests: Mutex<Vec<ChatRequest>>,
}

#[async_trait]
impl InferenceModel for RecordingModel {
    fn name(&self) -> &str {
        "Recording"
    }

    async fn generate(&self, request: &ChatRequest) -> Result<Completion> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(Completion {
            text: self.reply.clone(),
            raw: json!({ "candidates": [] }),
        })
    }
}

#[derive(Debug)]
struct RateLimitedModel;

#[async_trait]
impl InferenceModel for RateLimitedModel {
    fn name(&self) -> &str {
        "RateLimited"
    }

    async fn generate(&self, _request: &ChatRequest) -> Result<Completion> {
        Err(Error::Upstream {
            status: 429,
            raw: json!({ "error": { "message": "quota exceeded" } }),
        })
    }
}

struct BrokenNews;

#[async_trait]
impl NewsSource for BrokenNews {
    fn name(&self) -> &str {
        "broken"
    }

    async fn fetch_snippets(&self, _query: &str, _count: usize) -> Result<Vec<NewsSnippet>> {
        Err(Error::News("Bing News API error".to_string()))
    }
}

fn state_with(model: Option<Arc<dyn InferenceModel>>, news: Arc<dyn NewsSource>) -> AppState {
    AppState {
        inference_model: model,
        news_source: news,
        page_fetcher: None,
        blog_storage: Arc::new(MemoryBlogStorage::new()),
        image_store: Arc::new(MemoryImageStore::new()),
    }
}

fn app_with_reply(reply: &str) -> Router {
    create_app(
        state_with(
            Some(Arc::new(DummyModel::with_reply(reply))),
            Arc::new(StaticNewsSource::empty()),
        ),
        None,
    )
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn multipart_request(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"uploadimage\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, filename, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/blog")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_analyze_returns_verdict() {
    let app = app_with_reply(
        r#"{"verdict":"Likely False","confidence":0.9,"rationale":"x","signals":["a","b"]}"#,
    );
    let (status, body) = send(&app, json_request(Method::POST, "/api/analyze", json!({"text": "claim"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"verdict": "Likely False", "confidence": 0.9, "rationale": "x", "signals": ["a", "b"]})
    );
}

#[tokio::test]
async fn test_analyze_salvages_prose_reply() {
    let app = app_with_reply("Sure!\n{\"verdict\":\"Likely True\",\"confidence\":3}\nBye");
    let (status, body) = send(&app, json_request(Method::POST, "/api/analyze", json!({"url": "https://x.test"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"verdict": "Likely True", "confidence": 0.5, "rationale": "", "signals": []})
    );

    let app = app_with_reply("I cannot answer that.");
    let (_, body) = send(&app, json_request(Method::POST, "/api/analyze", json!({"text": "claim"}))).await;
    assert_eq!(body["verdict"], "Uncertain");
    assert_eq!(body["rationale"], "I cannot answer that.");
}

#[tokio::test]
async fn test_analyze_requires_input() {
    let app = app_with_reply("{}");
    let (status, body) = send(&app, json_request(Method::POST, "/api/analyze", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Provide text or url"}));

    let (status, _) = send(&app, json_request(Method::POST, "/api/analyze", json!({"text": "", "url": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/analyze")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Provide text or url");
}

#[tokio::test]
async fn test_analyze_without_model() {
    let app = create_app(state_with(None, Arc::new(StaticNewsSource::empty())), None);
    let (status, body) = send(&app, json_request(Method::POST, "/api/analyze", json!({"text": "claim"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Missing GEMINI_API_KEY env var"}));
}

#[tokio::test]
async fn test_analyze_upstream_error() {
    let app = create_app(
        state_with(Some(Arc::new(RateLimitedModel)), Arc::new(StaticNewsSource::empty())),
        None,
    );
    let (status, body) = send(&app, json_request(Method::POST, "/api/analyze", json!({"text": "claim"}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Upstream error");
    assert_eq!(body["status"], 429);
    assert_eq!(body["raw"]["error"]["message"], "quota exceeded");
}

#[tokio::test]
async fn test_analyze_prompt_includes_news() {
    let model = Arc::new(RecordingModel {
        reply: "{}".to_string(),
        ..Default::default()
    });
    let news = StaticNewsSource::new(vec![NewsSnippet {
        name: "Fact check".to_string(),
        url: "https://news.test/1".to_string(),
        description: "Debunked".to_string(),
        provider: "Wire".to_string(),
    }]);
    let app = create_app(state_with(Some(model.clone()), Arc::new(news)), None);
    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/analyze", json!({"url": "https://x.test/a", "text": "claim"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let requests = model.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let prompt = &requests[0].messages[0].content;
    assert!(prompt.contains("  [1] Fact check (Wire): Debunked [https://news.test/1]"));
    assert!(prompt.ends_with("URL: https://x.test/a\n\nTEXT: claim"));
}

#[tokio::test]
async fn test_analyze_tolerates_news_failure() {
    let model = Arc::new(RecordingModel {
        reply: r#"{"verdict":"Uncertain","confidence":0.4}"#.to_string(),
        ..Default::default()
    });
    let app = create_app(state_with(Some(model.clone()), Arc::new(BrokenNews)), None);
    let (status, body) = send(&app, json_request(Method::POST, "/api/analyze", json!({"text": "claim"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["confidence"], 0.4);
    let requests = model.requests.lock().unwrap();
    assert!(requests[0].messages[0].content.contains("(No recent news found)"));
}

#[tokio::test]
async fn test_method_not_allowed() {
    let app = app_with_reply("{}");
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/analyze")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"error": "Method not allowed"}));

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/blog")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = app_with_reply("{}");
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/analyze")
        .header(header::ORIGIN, "https://frontend.test")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_chat() {
    let app = create_app(
        state_with(Some(Arc::new(DummyModel::new())), Arc::new(StaticNewsSource::empty())),
        None,
    );
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/gemini-chat",
            json!({"messages": [{"role": "user", "content": "Hello there"}], "system": "be nice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Hello there");
    assert_eq!(body["raw"]["candidates"][0]["content"]["parts"][0]["text"], "Hello there");
}

#[tokio::test]
async fn test_chat_requires_messages() {
    let app = app_with_reply("hi");
    for payload in [json!({}), json!({"messages": []}), json!({"messages": "hello"})] {
        let (status, body) = send(&app, json_request(Method::POST, "/api/gemini-chat", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "messages must be a non-empty array"}));
    }
}

#[tokio::test]
async fn test_chat_accepts_loose_fields() {
    let model = Arc::new(RecordingModel {
        reply: "ok".to_string(),
        ..Default::default()
    });
    let app = create_app(state_with(Some(model.clone()), Arc::new(StaticNewsSource::empty())), None);

    let payloads = [
        json!({"messages": [{"role": "user", "content": "hi"}], "system": 7}),
        json!({"messages": [{"role": "user", "content": "hi"}], "system": ""}),
        json!({"messages": ["hi"], "model": null}),
    ];
    for payload in payloads {
        let (status, body) = send(&app, json_request(Method::POST, "/api/gemini-chat", payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "ok");
    }

    let requests = model.requests.lock().unwrap();
    assert_eq!(requests[0].system.as_deref(), Some("7"));
    assert_eq!(requests[0].messages, vec![ChatMessage::user("hi")]);
    assert_eq!(requests[1].system, None);
    assert_eq!(requests[2].messages, vec![ChatMessage::model("")]);
    assert_eq!(requests[2].model, None);
}

#[tokio::test]
async fn test_analyze_accepts_loose_fields() {
    let model = Arc::new(RecordingModel {
        reply: "{}".to_string(),
        ..Default::default()
    });
    let app = create_app(state_with(Some(model.clone()), Arc::new(StaticNewsSource::empty())), None);

    let (status, _) = send(&app, json_request(Method::POST, "/api/analyze", json!({"text": 42, "url": null}))).await;
    assert_eq!(status, StatusCode::OK);
    let requests = model.requests.lock().unwrap();
    assert!(requests[0].messages[0].content.ends_with("TEXT: 42"));
    drop(requests);

    let (status, _) = send(&app, json_request(Method::POST, "/api/analyze", json!({"text": 0, "url": false}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = app_with_reply("{}");
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_blog_lifecycle() {
    let images = MemoryImageStore::new();
    let mut state = state_with(None, Arc::new(StaticNewsSource::empty()));
    state.image_store = Arc::new(images.clone()) as Arc<dyn ImageStore>;
    let app = create_app(state, None);

    let (status, body) = send(
        &app,
        multipart_request(
            &[("title", "First post"), ("date", "2024-05-01"), ("content", "Hello")],
            Some(("cat.png", "image/png", &[137, 80, 78, 71])),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Post created successfully");
    assert_eq!(body["post"]["title"], "First post");
    let id = body["post"]["id"].as_str().unwrap().to_string();
    let public_id = body["post"]["imagePublicId"].as_str().unwrap().to_string();
    assert!(images.contains(&public_id).await);

    let (status, _) = send(
        &app,
        multipart_request(&[("title", "Second"), ("date", "2024-05-02"), ("content", "More")], None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let list = Request::builder().uri("/api/blog").body(Body::empty()).unwrap();
    let (status, body) = send(&app, list).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);

    let delete = |id: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/blog?id={}", id))
            .body(Body::empty())
            .unwrap()
    };
    let (status, body) = send(&app, delete(&id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Post deleted successfully"}));
    assert!(!images.contains(&public_id).await);

    let (status, body) = send(&app, delete(&id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Post not found"}));

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/blog")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Post ID is required"}));
}

#[tokio::test]
async fn test_blog_validation() {
    let app = app_with_reply("{}");
    let (status, body) = send(&app, multipart_request(&[("date", "d"), ("content", "c")], None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "\"title\" is required"}));

    let long_title = "t".repeat(201);
    let (status, _) = send(
        &app,
        multipart_request(&[("title", &long_title), ("date", "d"), ("content", "c")], None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blog_rejects_non_images() {
    let app = app_with_reply("{}");
    let (status, body) = send(
        &app,
        multipart_request(
            &[("title", "t"), ("date", "d"), ("content", "c")],
            Some(("notes.txt", "text/plain", b"hello")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Only image files are allowed"}));

    // an empty file input is not an upload
    let (status, body) = send(
        &app,
        multipart_request(
            &[("title", "t"), ("date", "d"), ("content", "c")],
            Some(("", "application/octet-stream", b"")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["post"]["imageUrl"], Value::Null);
}

#[tokio::test]
async fn test_blog_rejects_large_images() {
    let app = app_with_reply("{}");
    let big = vec![0u8; 5 * 1024 * 1024 + 1];
    let (status, body) = send(
        &app,
        multipart_request(
            &[("title", "t"), ("date", "d"), ("content", "c")],
            Some(("big.png", "image/png", &big)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "File too large"}));
}

#[tokio::test]
async fn test_blog_rejects_bodies_over_the_limit() {
    let app = app_with_reply("{}");
    let huge = vec![0u8; nc_web::MAX_BODY_BYTES + 2 * 1024 * 1024];
    let (status, body) = send(
        &app,
        multipart_request(
            &[("title", "t"), ("date", "d"), ("content", "c")],
            Some(("huge.png", "image/png", &huge)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "File too large"}));
}

#[tokio::test]
async fn test_static_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("landing.html"), "<h1>Landing</h1>").unwrap();
    std::fs::create_dir(dir.path().join("detector")).unwrap();
    std::fs::write(dir.path().join("detector").join("index.html"), "<h1>Detector</h1>").unwrap();

    let app = create_app(
        state_with(None, Arc::new(StaticNewsSource::empty())),
        Some(dir.path()),
    );

    for (uri, expected) in [("/", "<h1>Landing</h1>"), ("/detector/", "<h1>Detector</h1>")] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], expected.as_bytes());
    }

    // API routes still win over the static fallback
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use skills_clients::LocalIdentity;
use skills_core::CoreResult;
use skills_core::feed::FeedHub;
use skills_core::memory::MemoryStore;
use skills_core::ports::{BoxFuture, ProfileStore, TaskStore, TextGenerator};
use skills_types::models::{NewTask, Profile};

use crate::routes;
use crate::state::AppStateInner;

const SECRET: &str = "test-secret";
const WAIT: Duration = Duration::from_secs(2);
const GOOD_VERDICT: &str = "Sure! ```json\n{\"match_score\": 0.876, \"comment\": \"Strong overlap\"}\n```";

struct Canned(&'static str);

impl TextGenerator for Canned {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, CoreResult<String>> {
        Box::pin(async move { Ok(self.0.to_string()) })
    }
}

struct TestApp {
    app: Router,
    store: Arc<MemoryStore>,
    identity: Arc<LocalIdentity>,
}

impl TestApp {
    fn new() -> Self {
        Self::build(GOOD_VERDICT, Duration::from_secs(3600))
    }

    fn build(verdict: &'static str, heartbeat: Duration) -> Self {
        let hub = FeedHub::new();
        let store = Arc::new(MemoryStore::with_feed(hub.clone()));
        let identity = Arc::new(LocalIdentity::new(store.clone(), SECRET));
        let state = AppStateInner::new(
            store.clone(),
            Arc::new(hub),
            identity.clone(),
            Arc::new(Canned(verdict)),
        )
        .with_heartbeat(heartbeat);
        Self {
            app: routes::router(Arc::new(state)),
            store,
            identity,
        }
    }

    fn token(&self, user: Uuid) -> String {
        self.identity
            .issue_token(user, &format!("{user}@example.com"), "authenticated")
            .expect("token")
    }

    fn admin_token(&self) -> String {
        self.identity
            .issue_token(Uuid::new_v4(), "ops@example.com", "admin")
            .expect("token")
    }

    async fn response(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.app.clone().oneshot(request).await.expect("response")
    }

    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.response(method, uri, token, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    async fn conversation(&self, a: Uuid, b: Uuid) -> String {
        let (status, body) = self
            .call("POST", "/conversations", Some(&self.token(a)), Some(json!({ "peer_id": b })))
            .await;
        assert!(status == StatusCode::CREATED || status == StatusCode::OK, "{status}");
        body["conversation"]["id"].as_str().expect("id").to_string()
    }

    async fn send(&self, sender: Uuid, conversation_id: &str, text: &str) -> (StatusCode, Value) {
        self.call(
            "POST",
            "/messages",
            Some(&self.token(sender)),
            Some(json!({ "conversation_id": conversation_id, "text": text })),
        )
        .await
    }
}

/// Reads body frames until one complete SSE event is buffered.
async fn next_sse_event(body: &mut Body) -> String {
    let mut buf = String::new();
    while !buf.contains("\n\n") {
        let frame = tokio::time::timeout(WAIT, body.frame())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("frame");
        if let Ok(data) = frame.into_data() {
            buf.push_str(std::str::from_utf8(&data).expect("utf8"));
        }
    }
    buf
}

fn sse_data(event: &str) -> Value {
    let data = event
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("data line");
    serde_json::from_str(data).expect("json data")
}

// -- Access gate --

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn unauthenticated_requests_never_reach_the_store() {
    let app = TestApp::new();
    let (status, body) = app.call("GET", "/conversations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing auth token");
    assert_eq!(app.store.query_count(), 0);

    let (status, body) = app.call("GET", "/conversations", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
    assert_eq!(app.store.query_count(), 0);
}

#[tokio::test]
async fn access_token_cookie_is_accepted() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/conversations")
        .header(header::COOKIE, format!("access_token={}", app.token(Uuid::new_v4())))
        .body(Body::empty())
        .expect("request");
    let response = app.app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Conversations --

#[tokio::test]
async fn resolving_a_pair_is_idempotent_in_both_directions() {
    let app = TestApp::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    let (status, created) = app
        .call("POST", "/conversations", Some(&app.token(a)), Some(json!({ "peer_id": b })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, existing) = app
        .call("POST", "/conversations", Some(&app.token(b)), Some(json!({ "peer_id": a })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["conversation"]["id"], existing["conversation"]["id"]);

    let (status, listed) = app.call("GET", "/conversations", Some(&app.token(b)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["conversations"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn bad_peers_are_rejected() {
    let app = TestApp::new();
    let me = Uuid::new_v4();
    let token = app.token(me);

    for (body, expected) in [
        (json!({}), "peer_id is required"),
        (json!({ "peer_id": "not-a-uuid" }), "peer_id must be a valid user id"),
        (json!({ "peer_id": me }), "Cannot create conversation with yourself"),
    ] {
        let (status, reply) = app.call("POST", "/conversations", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["error"], expected);
    }
}

#[tokio::test]
async fn malformed_json_body_is_a_json_400() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/conversations")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(Uuid::new_v4())))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = app.app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert!(body["error"].is_string());
}

// -- Messages --

#[tokio::test]
async fn history_pages_newest_first_and_chains_with_before() {
    let app = TestApp::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let cid = app.conversation(a, b).await;
    for i in 0..5 {
        let (status, _) = app.send(if i % 2 == 0 { a } else { b }, &cid, &format!("m{i}")).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let token = app.token(b);
    let (status, first) = app
        .call("GET", &format!("/messages?conversation_id={cid}&limit=3"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<_> = first["messages"]
        .as_array()
        .expect("messages")
        .iter()
        .map(|m| m["text"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(texts, ["m4", "m3", "m2"]);

    let cursor = first["messages"][2]["created_at"].as_str().expect("cursor");
    let uri = format!(
        "/messages?conversation_id={cid}&limit=3&before={}",
        cursor.replace('+', "%2B")
    );
    let (_, second) = app.call("GET", &uri, Some(&token), None).await;
    let texts: Vec<_> = second["messages"]
        .as_array()
        .expect("messages")
        .iter()
        .map(|m| m["text"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(texts, ["m1", "m0"]);

    let (status, defaulted) = app
        .call("GET", &format!("/messages?conversation_id={cid}&limit=abc"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(defaulted["messages"].as_array().map(Vec::len), Some(5));

    let (status, body) = app
        .call("GET", &format!("/messages?conversation_id={cid}&before=yesterday"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "before must be an RFC 3339 timestamp");
}

#[tokio::test]
async fn outsiders_cannot_read_write_or_watch() {
    let app = TestApp::new();
    let cid = app.conversation(Uuid::new_v4(), Uuid::new_v4()).await;
    let outsider = app.token(Uuid::new_v4());

    let (status, _) = app
        .call("GET", &format!("/messages?conversation_id={cid}"), Some(&outsider), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            "POST",
            "/messages",
            Some(&outsider),
            Some(json!({ "conversation_id": cid, "text": "let me in" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call("GET", &format!("/messages/stream?conversation_id={cid}"), Some(&outsider), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not a participant in this conversation");
}

#[tokio::test]
async fn unknown_or_missing_conversations() {
    let app = TestApp::new();
    let token = app.token(Uuid::new_v4());

    let (status, _) = app
        .call("GET", &format!("/messages?conversation_id={}", Uuid::new_v4()), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call("GET", "/messages?conversation_id=xyz", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.call("GET", "/messages/stream", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "conversation_id is required");
}

#[tokio::test]
async fn blank_text_creates_nothing() {
    let app = TestApp::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let cid = app.conversation(a, b).await;

    let (status, body) = app.send(a, &cid, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "text is required");

    let (_, history) = app
        .call("GET", &format!("/messages?conversation_id={cid}"), Some(&app.token(a)), None)
        .await;
    assert_eq!(history["messages"], json!([]));
}

#[tokio::test]
async fn sending_to_a_peer_opens_the_conversation() {
    let app = TestApp::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    let (status, sent) = app
        .call("POST", "/messages", Some(&app.token(a)), Some(json!({ "peer_id": b, "text": "hey" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let cid = app.conversation(b, a).await;
    assert_eq!(sent["message"]["conversation_id"], cid.as_str());
}

#[tokio::test]
async fn only_the_sender_deletes() {
    let app = TestApp::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let cid = app.conversation(a, b).await;
    let (_, sent) = app.send(a, &cid, "oops").await;
    let uri = format!("/messages/{}", sent["message"]["id"].as_str().expect("id"));

    let (status, _) = app.call("DELETE", &uri, Some(&app.token(b)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call("DELETE", &uri, Some(&app.token(a)), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.call("DELETE", &uri, Some(&app.token(a)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call("DELETE", "/messages/nope", Some(&app.token(a)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Live streams --

#[tokio::test]
async fn peer_sees_history_then_live_message() {
    let app = TestApp::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    let cid = app.conversation(a, b).await;
    app.send(a, &cid, "hi").await;

    let (status, history) = app
        .call("GET", &format!("/messages?conversation_id={cid}&limit=10"), Some(&app.token(b)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let messages = history["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["text"], "hi");

    let response = app
        .response("GET", &format!("/messages/stream?conversation_id={cid}"), Some(&app.token(b)), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );
    let mut body = response.into_body();

    let (status, sent) = app.send(a, &cid, "there").await;
    assert_eq!(status, StatusCode::CREATED);

    let event = next_sse_event(&mut body).await;
    assert!(event.starts_with("event: message\n"), "{event}");
    let row = sse_data(&event);
    assert_eq!(row, sent["message"]);
    assert_eq!(row["text"], "there");
}

#[tokio::test]
async fn conversation_stream_announces_new_pairs() {
    let app = TestApp::new();
    let (me, other) = (Uuid::new_v4(), Uuid::new_v4());

    let response = app
        .response("GET", "/conversations/stream", Some(&app.token(me)), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let mut body = response.into_body();

    let cid = app.conversation(other, me).await;
    let event = next_sse_event(&mut body).await;
    assert!(event.starts_with("event: conversation\n"), "{event}");
    assert_eq!(sse_data(&event)["id"], cid.as_str());
}

#[tokio::test]
async fn idle_streams_send_ping_comments() {
    let app = TestApp::build(GOOD_VERDICT, Duration::from_millis(50));
    let response = app
        .response("GET", "/conversations/stream", Some(&app.token(Uuid::new_v4())), None)
        .await;
    let mut body = response.into_body();
    assert_eq!(next_sse_event(&mut body).await, ": ping\n\n");
}

// -- Accounts --

#[tokio::test]
async fn signup_validates_input() {
    let app = TestApp::new();
    for (body, expected) in [
        (json!({ "email": "a@b.co" }), "Email and password are required"),
        (json!({ "email": "a@b.co", "password": "12345" }), "Password must be at least 6 characters long"),
        (json!({ "email": "nobody", "password": "123456" }), "Invalid email format"),
    ] {
        let (status, reply) = app.call("POST", "/auth/signup", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["error"], expected);
    }
}

#[tokio::test]
async fn signup_login_and_read_own_profile() {
    let app = TestApp::new();
    let (status, signup) = app
        .call(
            "POST",
            "/auth/signup",
            None,
            Some(json!({ "email": "dev@example.com", "password": "hunter22", "full_name": "  Dev One " })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(signup["message"], "Signup successful");
    let user_id = signup["userId"].as_str().expect("userId").to_string();

    let (status, again) = app
        .call("POST", "/auth/signup", None, Some(json!({ "email": "dev@example.com", "password": "hunter22" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(again["error"], "User already registered");

    let (status, wrong) = app
        .call("POST", "/auth/login", None, Some(json!({ "email": "dev@example.com", "password": "nope-nope" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong["error"], "Invalid login credentials");

    let (status, login) = app
        .call("POST", "/auth/login", None, Some(json!({ "email": "dev@example.com", "password": "hunter22" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["message"], "Login successful");
    assert_eq!(login["user"]["id"], user_id.as_str());
    let token = login["session"]["access_token"].as_str().expect("token").to_string();

    let (status, profile) = app
        .call("GET", &format!("/profiles/users/{user_id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["profile"]["name"], "Dev One");
    assert_eq!(profile["profile"]["email"], "dev@example.com");
}

// -- Profiles --

#[tokio::test]
async fn profiles_are_owner_or_admin_only() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    app.store
        .upsert_profile(Profile::new(owner, "o@example.com", "Owner"))
        .await
        .expect("seed");
    let uri = format!("/profiles/users/{owner}");

    let (status, body) = app.call("GET", &uri, Some(&app.token(Uuid::new_v4())), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    let (status, _) = app.call("GET", &uri, Some(&app.admin_token()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, listed) = app.call("GET", "/profiles/users", Some(&app.token(owner)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["users"], json!([owner]));

    let (status, _) = app
        .call("GET", &format!("/profiles/users/{}", Uuid::new_v4()), Some(&app.admin_token()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_update_whitelists_fields() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    app.store
        .upsert_profile(Profile::new(owner, "o@example.com", "Owner"))
        .await
        .expect("seed");
    let uri = format!("/profiles/users/{owner}");
    let token = app.token(owner);

    let (status, body) = app
        .call("PUT", &uri, Some(&token), Some(json!({ "role": "admin", "id": Uuid::new_v4() })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No updatable fields provided");

    let (status, body) = app
        .call(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "skills": ["rust", "sql"], "bio": "builder", "id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["profile"]["id"], owner.to_string());
    assert_eq!(body["profile"]["skills"], json!(["rust", "sql"]));
    assert_eq!(body["profile"]["name"], "Owner");
    assert_eq!(body["profile"]["bio"], "builder");

    let (status, body) = app.call("PUT", &uri, Some(&token), Some(json!({ "bio": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["bio"], Value::Null);
    assert_eq!(body["profile"]["skills"], json!(["rust", "sql"]));

    let (status, _) = app.call("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call("PUT", &uri, Some(&token), Some(json!({ "bio": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Tasks --

#[tokio::test]
async fn task_crud() {
    let app = TestApp::new();
    let token = app.token(Uuid::new_v4());

    let (status, body) = app
        .call("POST", "/tasks", Some(&token), Some(json!({ "description": "no title" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");

    let (status, task) = app
        .call(
            "POST",
            "/tasks",
            Some(&token),
            Some(json!({ "title": "API", "requirements": "rust, axum\nsql" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["requirements"], json!(["rust", "axum", "sql"]));
    let uri = format!("/tasks/{}", task["id"].as_str().expect("id"));

    app.call("POST", "/tasks", Some(&token), Some(json!({ "title": "Newer" }))).await;
    let (status, listed) = app.call("GET", "/tasks?limit=1", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["title"], "Newer");

    let (status, updated) = app
        .call("PUT", &uri, Some(&token), Some(json!({ "description": "backend" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "API");
    assert_eq!(updated["description"], "backend");

    let (status, _) = app.call("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.call("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");

    let (status, _) = app.call("GET", "/tasks/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Matching --

#[tokio::test]
async fn ai_match_clamps_and_rounds() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            "POST",
            "/ai/match",
            None,
            Some(json!({ "skills": ["rust", "", null], "requirements": "rust, tokio" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "match_score": 0.88, "comment": "Strong overlap" }));

    let (status, body) = app
        .call("POST", "/ai/match", None, Some(json!({ "skills": [], "requirements": "rust" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "skills and requirements are required");
}

#[tokio::test]
async fn malformed_ai_output_is_a_502_with_raw_text() {
    let app = TestApp::build("I think they match well", Duration::from_secs(3600));
    let (status, body) = app
        .call("POST", "/ai/match", None, Some(json!({ "skills": "rust", "requirements": "rust" })))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "AI response not in expected JSON format");
    assert_eq!(body["raw"], "I think they match well");
}

#[tokio::test]
async fn match_uses_stored_skills_and_requirements() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let mut profile = Profile::new(user, "u@example.com", "U");
    profile.skills = vec!["rust".into()];
    app.store.upsert_profile(profile).await.expect("seed profile");
    let task = app
        .store
        .insert_task(NewTask {
            title: "T".into(),
            description: None,
            requirements: vec!["rust".into()],
        })
        .await
        .expect("seed task");

    let (status, body) = app
        .call("POST", "/match", None, Some(json!({ "user_id": user, "task_id": task.id })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], user.to_string());
    assert_eq!(body["task_id"], task.id.to_string());
    assert_eq!(body["match_score"], 0.88);

    let (status, body) = app
        .call("POST", "/match", None, Some(json!({ "user_id": Uuid::new_v4(), "task_id": task.id })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = app
        .call("POST", "/match", None, Some(json!({ "user_id": user, "task_id": Uuid::new_v4() })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");

    let (status, _) = app.call("POST", "/match", None, Some(json!({ "user_id": user }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

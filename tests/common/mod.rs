#![allow(dead_code)]

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

pub const USER_TOKEN: &str = "user-token";

/// Every request the mock backend saw: URI plus headers.
#[derive(Clone, Default)]
pub struct Recorder {
    requests: Arc<Mutex<Vec<(String, HeaderMap)>>>,
}

impl Recorder {
    pub fn requests(&self) -> Vec<(String, HeaderMap)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> (String, HeaderMap) {
        self.requests().pop().expect("no request recorded")
    }
}

async fn record(State(recorder): State<Recorder>, request: Request, next: Next) -> Response {
    recorder
        .requests
        .lock()
        .unwrap()
        .push((request.uri().to_string(), request.headers().clone()));
    next.run(request).await
}

fn lead(id: i64, user_id: i64, username: Option<&str>, course: Option<&str>, status: &str, score: f64) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "username": username,
        "telegram_id": format!("tg{user_id}"),
        "phone_number": "+1 555 0100",
        "interested_course": course,
        "status": status,
        "lead_score": score,
        "created_at": "2026-01-04T10:30:00",
        "contacted_at": null,
        "enrolled_at": null,
        "conversation_id": 1
    })
}

fn leads() -> Value {
    json!([
        lead(1, 11, Some("ana"), Some("Python"), "enrolled", 80.0),
        lead(2, 12, None, Some("Python"), "new_lead", 60.0),
        lead(3, 13, Some("ben"), Some("Web Development"), "completed", 90.0),
        lead(4, 14, Some("cy"), Some("Python"), "contacted", 70.0),
        lead(5, 15, Some("di"), None, "churned", 40.0),
    ])
}

fn is_user(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {USER_TOKEN}"))
}

fn not_authenticated() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Not authenticated" }))).into_response()
}

pub fn mock_backend(recorder: Recorder) -> Router {
    Router::new()
        .route(
            "/api/analytics/overview",
            get(|| async {
                Json(json!({
                    "conversations_today": 12,
                    "leads_today": 3,
                    "active_conversations": 4,
                    "conversion_rate": 12.5,
                    "avg_lead_score": 66.0,
                    "messages_today": 140,
                    "date": "2026-01-05T09:00:00"
                }))
            }),
        )
        .route("/api/leads/", get(|| async { Json(leads()) }))
        .route(
            "/api/leads/:id",
            get(|Path(id): Path<i64>| async move {
                if id == 1 {
                    Json(lead(1, 11, Some("ana"), Some("Python"), "enrolled", 80.0)).into_response()
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Lead not found" }))).into_response()
                }
            }),
        )
        .route(
            "/api/analytics/faqs",
            get(|| async {
                Json(json!([{
                    "question": "How much does the Python course cost?",
                    "category": "pricing",
                    "count": 12,
                    "last_asked": "2026-01-05T08:00:00",
                    "common_course": "Python"
                }]))
            }),
        )
        .route(
            "/api/analytics/counts",
            get(|| async {
                Json(json!({
                    "total_courses": 2,
                    "total_faqs": 1,
                    "total_leads": 5,
                    "total_conversations": 1,
                    "total_enrolled": 2
                }))
            }),
        )
        .route(
            "/api/analytics/courses",
            get(|| async {
                Json(json!([
                    {
                        "course_name": "Rust",
                        "period_start": "2026-01-04T00:00:00",
                        "mentions_count": 10,
                        "questions_count": 4,
                        "leads_count": 5,
                        "enrollments_count": 1,
                        "avg_lead_score": 60.0,
                        "conversion_rate": 20.0
                    },
                    {
                        "course_name": "Rust",
                        "period_start": "2026-01-05T00:00:00",
                        "mentions_count": 6,
                        "questions_count": 2,
                        "leads_count": 7,
                        "enrollments_count": 2,
                        "avg_lead_score": 80.0,
                        "conversion_rate": 0.0
                    },
                    {
                        "course_name": "Go",
                        "period_start": "2026-01-05T00:00:00",
                        "mentions_count": 3,
                        "questions_count": 1,
                        "leads_count": 2,
                        "enrollments_count": 5,
                        "avg_lead_score": 50.0,
                        "conversion_rate": 0.0
                    }
                ]))
            }),
        )
        .route(
            "/api/analytics/messages",
            get(|| async {
                Json(json!([
                    { "period_start": "2026-01-04T00:00:00", "total_messages": 90 },
                    { "period_start": "2026-01-05T00:00:00", "total_messages": 140 }
                ]))
            }),
        )
        .route(
            "/api/conversations",
            get(|| async {
                Json(json!([{
                    "id": 1,
                    "session_id": "s-1",
                    "user_id": 11,
                    "username": "ana",
                    "current_stage": "qualification",
                    "current_agent": "sales",
                    "interested_course": "Python",
                    "message_count": 2,
                    "lead_score": 80.0,
                    "is_active": true,
                    "started_at": "2026-01-05T08:00:00",
                    "last_message_at": "2026-01-05T08:05:00"
                }]))
            }),
        )
        .route(
            "/api/conversations/:id/messages",
            get(|headers: HeaderMap| async move {
                if !is_user(&headers) {
                    return not_authenticated();
                }
                Json(json!([
                    { "id": 1, "role": "user", "content": "Hi", "agent_name": null, "created_at": "2026-01-05T08:00:00" },
                    { "id": 2, "role": "assistant", "content": "Hello!", "agent_name": "sales", "created_at": "2026-01-05T08:00:02" }
                ]))
                .into_response()
            }),
        )
        .route(
            "/api/auth/me",
            get(|headers: HeaderMap| async move {
                if !is_user(&headers) {
                    return not_authenticated();
                }
                Json(json!({ "id": 11, "email": "ana@example.com" })).into_response()
            }),
        )
        .route(
            "/api/auth/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "right" {
                    Json(json!({ "access_token": USER_TOKEN, "user": { "id": 11 } })).into_response()
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Invalid credentials" }))).into_response()
                }
            }),
        )
        .route(
            "/api/auth/signup",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "access_token": USER_TOKEN, "user": { "email": body["email"] } }))
            }),
        )
        .layer(middleware::from_fn_with_state(recorder.clone(), record))
        .with_state(recorder)
}

/// Serves the mock backend on the current runtime.
pub async fn spawn_backend() -> (String, Recorder) {
    let recorder = Recorder::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = mock_backend(recorder.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), recorder)
}

/// Serves the mock backend on its own thread so it outlives any single test runtime.
pub fn spawn_backend_thread() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock backend");
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("mock backend runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, mock_backend(Recorder::default()))
                .await
                .unwrap();
        });
    });

    format!("http://{addr}")
}

pub fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Base URL nothing is listening on.
pub fn closed_backend_url() -> String {
    format!("http://127.0.0.1:{}", pick_free_port())
}

use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/analytics/overview", get(handlers::get_overview))
        .route("/api/analytics/messages", get(handlers::get_messages))
        .route("/api/analytics/courses", get(handlers::get_courses))
        .route("/api/analytics/courses/raw", get(handlers::get_course_records))
        .route("/api/analytics/insights", get(handlers::get_insights))
        .route("/api/analytics/faqs", get(handlers::get_faqs))
        .route("/api/analytics/counts", get(handlers::get_counts))
        .route("/api/leads", get(handlers::list_leads))
        .route("/api/leads/:id", get(handlers::get_lead))
        .route("/api/conversations", get(handlers::list_conversations))
        .route("/api/conversations/:id/messages", get(handlers::get_conversation_messages))
        .route("/api/users/:id/conversations", get(handlers::list_user_conversations))
        .route("/api/auth/me", get(handlers::auth_me))
        .route("/api/auth/login", post(handlers::auth_login))
        .route("/api/auth/signup", post(handlers::auth_signup))
        .with_state(state)
}

use crate::dashboard::{fetch_course_records, fetch_course_shares, fetch_insights, fetch_message_points};
use crate::errors::{AppError, GatewayError};
use crate::gateway::{Gateway, Passthrough, SessionContext};
use crate::models::{
    AnalyticsCounts, AnalyticsOverview, ConversationMessage, ConversationQuery, ConversationSummary,
    CourseInterestRecord, CourseQuery, CourseShare, Faq, FaqQuery, InsightsQuery, InsightsResponse,
    LeadRecord, LeadView, MessagePoint,
};
use crate::refresh::DashboardSnapshot;
use crate::samples;
use crate::state::AppState;
use crate::ui::render_dashboard;
use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.dashboard.lock().await;
    Html(render_dashboard(&snapshot, state.config.refresh_interval.as_secs()))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.lock().await.clone())
}

pub async fn get_overview(State(state): State<AppState>, headers: HeaderMap) -> Json<AnalyticsOverview> {
    match gateway_for(&state, &headers).overview().await {
        Ok(overview) => Json(overview),
        Err(err) => {
            warn!("failed to fetch analytics overview: {err}");
            Json(samples::overview(Utc::now()))
        }
    }
}

pub async fn get_messages(State(state): State<AppState>, headers: HeaderMap) -> Json<Vec<MessagePoint>> {
    match fetch_message_points(&gateway_for(&state, &headers)).await {
        Ok(points) => Json(points),
        Err(err) => {
            warn!("failed to fetch message volume: {err}");
            Json(samples::message_points(Utc::now().date_naive()))
        }
    }
}

pub async fn get_courses(State(state): State<AppState>, headers: HeaderMap) -> Json<Vec<CourseShare>> {
    match fetch_course_shares(&gateway_for(&state, &headers), &state.config).await {
        Ok(shares) => Json(shares),
        Err(err) => {
            warn!("failed to fetch course shares: {err}");
            Json(samples::course_shares())
        }
    }
}

pub async fn get_course_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CourseQuery>,
) -> Result<Json<Vec<CourseInterestRecord>>, AppError> {
    let records = fetch_course_records(&gateway_for(&state, &headers), &state.config, &query).await?;
    Ok(Json(records))
}

pub async fn get_insights(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<InsightsResponse>, AppError> {
    let insights = fetch_insights(&gateway_for(&state, &headers), &state.config, &query).await?;
    Ok(Json(insights))
}

pub async fn get_faqs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FaqQuery>,
) -> Result<Json<Vec<Faq>>, AppError> {
    Ok(Json(gateway_for(&state, &headers).faqs(query.limit).await?))
}

pub async fn get_counts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalyticsCounts>, AppError> {
    Ok(Json(gateway_for(&state, &headers).analytics_counts().await?))
}

pub async fn list_leads(State(state): State<AppState>, headers: HeaderMap) -> Json<Vec<LeadView>> {
    match gateway_for(&state, &headers).leads(state.config.leads_limit).await {
        Ok(leads) => Json(leads.into_iter().map(LeadView::from).collect()),
        Err(err) => {
            warn!("failed to fetch leads: {err}");
            Json(samples::leads())
        }
    }
}

pub async fn get_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<LeadRecord>, AppError> {
    Ok(Json(gateway_for(&state, &headers).lead(id).await?))
}

pub async fn list_conversations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<ConversationSummary>>, AppError> {
    match gateway_for(&state, &headers).conversations(&query).await {
        Ok(conversations) => Ok(Json(conversations)),
        Err(GatewayError::Unreachable(err)) => {
            warn!("failed to fetch conversations: {err}");
            Ok(Json(Vec::new()))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn get_conversation_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ConversationMessage>>, AppError> {
    Ok(Json(gateway_for(&state, &headers).conversation_messages(id).await?))
}

/// The backend has no per-user conversation listing; callers reach
/// conversations through the lead's `conversation_id` instead.
pub async fn list_user_conversations(Path(user_id): Path<i64>) -> Json<Vec<ConversationSummary>> {
    debug!(user_id, "user conversations requested");
    Json(Vec::new())
}

pub async fn auth_me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Not authenticated" }))).into_response();
    };
    let gateway = state.gateway.with_session(SessionContext::with_token(token));
    match gateway.current_user().await {
        Ok(passthrough) => forwarded(passthrough),
        Err(err) => {
            warn!("failed to fetch current user: {err}");
            auth_failure("Failed to get user info.")
        }
    }
}

pub async fn auth_login(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    match state.gateway.forward_auth("/api/auth/login", &body).await {
        Ok(passthrough) => forwarded(passthrough),
        Err(err) => {
            warn!("login failed: {err}");
            auth_failure("Login failed. Please try again.")
        }
    }
}

pub async fn auth_signup(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    match state.gateway.forward_auth("/api/auth/signup", &body).await {
        Ok(passthrough) => forwarded(passthrough),
        Err(err) => {
            warn!("signup failed: {err}");
            auth_failure("Signup failed. Please try again.")
        }
    }
}

fn forwarded(passthrough: Passthrough) -> Response {
    let status = StatusCode::from_u16(passthrough.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(passthrough.body)).into_response()
}

fn auth_failure(detail: &str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": detail }))).into_response()
}

/// Gateway carrying the caller's bearer token, or the service session when
/// the request has none.
fn gateway_for(state: &AppState, headers: &HeaderMap) -> Gateway {
    match bearer_token(headers) {
        Some(token) => state.gateway.with_session(SessionContext::with_token(token)),
        None => state.gateway.clone(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok-123"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("tok-123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer user-token"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("user-token"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("BEARER x"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("x"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(bearer_token(&headers), None);
    }
}

use crate::errors::GatewayError;
use crate::models::{
    AnalyticsCounts, AnalyticsOverview, ConversationMessage, ConversationQuery, ConversationSummary,
    CourseInterestRecord, Faq, LeadRecord, MessageVolumeRecord, PeriodType,
};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Bearer credential used for upstream calls.
///
/// Clones share the same slot, so `refresh` and `clear` are seen by every
/// gateway built over this session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    token: Arc<RwLock<Option<String>>>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::default();
        session.refresh(token);
        session
    }

    pub fn refresh(&self, token: impl Into<String>) {
        let mut slot = self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(token.into());
    }

    pub fn clear(&self) {
        let mut slot = self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
    }

    pub fn bearer(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }
}

/// Upstream response forwarded as-is, status included.
#[derive(Debug, Clone, PartialEq)]
pub struct Passthrough {
    pub status: u16,
    pub body: Value,
}

/// Thin client over the backend API. Never retries and sets no timeout of its own.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Same connection pool, different credential.
    pub fn with_session(&self, session: SessionContext) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn overview(&self) -> Result<AnalyticsOverview, GatewayError> {
        self.get_json("/api/analytics/overview", &[]).await
    }

    pub async fn leads(&self, limit: u32) -> Result<Vec<LeadRecord>, GatewayError> {
        self.get_json("/api/leads/", &[("limit", limit.to_string())]).await
    }

    pub async fn lead(&self, id: i64) -> Result<LeadRecord, GatewayError> {
        self.get_json(&format!("/api/leads/{id}"), &[]).await
    }

    pub async fn faqs(&self, limit: u32) -> Result<Vec<Faq>, GatewayError> {
        self.get_json("/api/analytics/faqs", &[("limit", limit.to_string())]).await
    }

    pub async fn course_interest(
        &self,
        period: PeriodType,
        days_back: u32,
    ) -> Result<Vec<CourseInterestRecord>, GatewayError> {
        let query = [
            ("period_type", period.as_str().to_string()),
            ("days_back", days_back.to_string()),
        ];
        self.get_json("/api/analytics/courses", &query).await
    }

    pub async fn message_volume(&self, days_back: u32) -> Result<Vec<MessageVolumeRecord>, GatewayError> {
        let query = [
            ("period_type", PeriodType::Daily.as_str().to_string()),
            ("days_back", days_back.to_string()),
        ];
        self.get_json("/api/analytics/messages", &query).await
    }

    pub async fn analytics_counts(&self) -> Result<AnalyticsCounts, GatewayError> {
        self.get_json("/api/analytics/counts", &[]).await
    }

    pub async fn conversations(
        &self,
        query: &ConversationQuery,
    ) -> Result<Vec<ConversationSummary>, GatewayError> {
        let query = [
            ("skip", query.skip.to_string()),
            ("limit", query.limit.to_string()),
            ("active_only", query.active_only.to_string()),
        ];
        self.get_json("/api/conversations", &query).await
    }

    pub async fn conversation_messages(
        &self,
        conversation_id: i64,
    ) -> Result<Vec<ConversationMessage>, GatewayError> {
        self.get_json(&format!("/api/conversations/{conversation_id}/messages"), &[])
            .await
    }

    /// Profile of the session's user. Fails without a request when the session
    /// holds no credential.
    pub async fn current_user(&self) -> Result<Passthrough, GatewayError> {
        if !self.session.is_authenticated() {
            return Err(GatewayError::Unauthenticated);
        }
        let request = self.request(self.client.get(self.url("/api/auth/me")));
        self.passthrough(request).await
    }

    /// POSTs `body` to an auth endpoint and hands back whatever the backend said.
    pub async fn forward_auth(&self, path: &str, body: &Value) -> Result<Passthrough, GatewayError> {
        let request = self.request(self.client.post(self.url(path)).json(body));
        self.passthrough(request).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        debug!(path, "upstream request");
        let request = self.request(self.client.get(self.url(path)).query(query));
        let response = request.send().await.map_err(GatewayError::Unreachable)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(GatewayError::Decode)
    }

    async fn passthrough(&self, request: RequestBuilder) -> Result<Passthrough, GatewayError> {
        let response = request.send().await.map_err(GatewayError::Unreachable)?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.map_err(GatewayError::Decode)?;
        Ok(Passthrough { status, body })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(CACHE_CONTROL, "no-store")
            .header(ACCEPT, "application/json");
        match self.session.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AnalyticsOverview {
    pub conversations_today: u64,
    pub leads_today: u64,
    pub active_conversations: u64,
    pub conversion_rate: f64,
    pub avg_lead_score: f64,
    pub messages_today: u64,
    pub date: String,
}

/// One period's worth of engagement metrics for a single course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct CourseInterestRecord {
    pub course_name: String,
    pub period_start: String,
    #[serde(default)]
    pub mentions_count: u64,
    #[serde(default)]
    pub questions_count: u64,
    #[serde(default)]
    pub leads_count: u64,
    #[serde(default)]
    pub enrollments_count: u64,
    #[serde(default)]
    pub avg_lead_score: f64,
    #[serde(default)]
    pub conversion_rate: f64,
}

impl CourseInterestRecord {
    /// Clamps enrollments so they never exceed leads.
    pub fn normalized(mut self) -> Self {
        if self.enrollments_count > self.leads_count {
            warn!(
                course = %self.course_name,
                enrollments = self.enrollments_count,
                leads = self.leads_count,
                "enrollments exceed leads, clamping"
            );
            self.enrollments_count = self.leads_count;
        }
        self
    }
}

/// Per-course fold of every [`CourseInterestRecord`] sharing a course name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedCourse {
    pub course_name: String,
    pub period_start: String,
    pub mentions_count: u64,
    pub questions_count: u64,
    pub leads_count: u64,
    pub enrollments_count: u64,
    pub avg_lead_score: f64,
    pub conversion_rate: f64,
}

impl From<&CourseInterestRecord> for AggregatedCourse {
    fn from(record: &CourseInterestRecord) -> Self {
        Self {
            course_name: record.course_name.clone(),
            period_start: record.period_start.clone(),
            mentions_count: record.mentions_count,
            questions_count: record.questions_count,
            leads_count: record.leads_count,
            enrollments_count: record.enrollments_count,
            avg_lead_score: record.avg_lead_score,
            conversion_rate: record.conversion_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    NewLead,
    Contacted,
    Enrolled,
    Churned,
    Completed,
    Returning,
    #[serde(other)]
    Unknown,
}

impl LeadStatus {
    pub fn is_enrolled(self) -> bool {
        matches!(self, LeadStatus::Enrolled | LeadStatus::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct LeadRecord {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub telegram_id: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub interested_course: Option<String>,
    pub status: LeadStatus,
    #[serde(default)]
    pub lead_score: f64,
    pub created_at: String,
    #[serde(default)]
    pub contacted_at: Option<String>,
    #[serde(default)]
    pub enrolled_at: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<i64>,
}

/// Lead as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course: Option<String>,
    pub status: LeadStatus,
    pub score: f64,
    pub created_at: String,
}

impl From<LeadRecord> for LeadView {
    fn from(lead: LeadRecord) -> Self {
        let name = match lead.username {
            Some(username) if !username.is_empty() => username,
            _ => format!("User {}", lead.user_id),
        };
        Self {
            id: lead.id,
            name,
            // upstream does not expose emails
            email: format!("user{}@example.com", lead.user_id),
            phone: lead.phone_number,
            course: lead.interested_course,
            status: lead.status,
            score: lead.lead_score,
            created_at: lead.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaqCategory {
    CourseInfo,
    Pricing,
    Enrollment,
    Schedule,
    Technical,
    General,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Faq {
    pub question: String,
    pub category: FaqCategory,
    pub count: u64,
    #[serde(default)]
    pub last_asked: Option<String>,
    #[serde(default)]
    pub common_course: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AnalyticsCounts {
    #[serde(default)]
    pub total_courses: u64,
    #[serde(default)]
    pub total_faqs: u64,
    #[serde(default)]
    pub total_leads: u64,
    #[serde(default)]
    pub total_conversations: u64,
    #[serde(default)]
    pub total_enrolled: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ConversationSummary {
    pub id: i64,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub current_stage: Option<String>,
    #[serde(default)]
    pub current_agent: Option<String>,
    #[serde(default)]
    pub interested_course: Option<String>,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub lead_score: f64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ConversationMessage {
    pub id: i64,
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub agent_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageVolumeRecord {
    pub period_start: String,
    #[serde(default)]
    pub total_messages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePoint {
    pub date: String,
    pub messages: u64,
}

impl From<MessageVolumeRecord> for MessagePoint {
    fn from(record: MessageVolumeRecord) -> Self {
        let date = record
            .period_start
            .split('T')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            date,
            messages: record.total_messages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseShare {
    pub name: String,
    pub value: u64,
    pub percentage: u32,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub faqs: Vec<Faq>,
    pub courses: Vec<AggregatedCourse>,
    pub counts: AnalyticsCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl PeriodType {
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodType::Daily => "daily",
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseQuery {
    #[serde(default)]
    pub period_type: PeriodType,
    #[serde(default = "default_days_back")]
    pub days_back: u32,
}

impl Default for CourseQuery {
    fn default() -> Self {
        Self {
            period_type: PeriodType::Daily,
            days_back: default_days_back(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqQuery {
    #[serde(default = "default_faq_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsightsQuery {
    #[serde(default)]
    pub period_type: PeriodType,
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    #[serde(default = "default_faq_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_conversation_limit")]
    pub limit: u32,
    #[serde(default)]
    pub active_only: bool,
}

impl Default for ConversationQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_conversation_limit(),
            active_only: false,
        }
    }
}

fn default_days_back() -> u32 {
    30
}

fn default_faq_limit() -> u32 {
    20
}

fn default_conversation_limit() -> u32 {
    50
}

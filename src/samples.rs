//! Example data shown when the backend cannot be reached.

use crate::models::{AnalyticsOverview, CourseShare, LeadStatus, LeadView, MessagePoint};
use crate::synthesis::deterministic_metric;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

pub fn overview(now: DateTime<Utc>) -> AnalyticsOverview {
    AnalyticsOverview {
        conversations_today: 0,
        leads_today: 0,
        active_conversations: 0,
        conversion_rate: 0.0,
        avg_lead_score: 0.0,
        messages_today: 0,
        date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Seven days ending at `today`, oldest first. Counts are keyed on the date so
/// a page reload shows the same series.
pub fn message_points(today: NaiveDate) -> Vec<MessagePoint> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = (today - Duration::days(offset)).to_string();
            let messages = deterministic_metric(&format!("messages_{date}"), 50.0, 150.0) as u64;
            MessagePoint { date, messages }
        })
        .collect()
}

pub fn course_shares() -> Vec<CourseShare> {
    [
        ("Python Programming", 145, 45),
        ("Web Development", 97, 30),
        ("Data Science", 48, 15),
        ("Mobile Development", 32, 10),
    ]
    .into_iter()
    .map(|(name, value, percentage)| CourseShare {
        name: name.to_string(),
        value,
        percentage,
    })
    .collect()
}

pub fn leads() -> Vec<LeadView> {
    [
        (1, "John Smith", "john.smith@example.com", "+1 (555) 123-4567", "Web Development Bootcamp", LeadStatus::NewLead, 85.5, "2025-11-28T10:30:00Z"),
        (2, "Sarah Johnson", "sarah.j@example.com", "+1 (555) 234-5678", "Data Science Fundamentals", LeadStatus::Enrolled, 92.3, "2025-11-27T14:15:00Z"),
        (3, "Michael Chen", "mchen@example.com", "+1 (555) 345-6789", "Digital Marketing", LeadStatus::Churned, 45.8, "2025-11-26T18:45:00Z"),
        (4, "Emily Rodriguez", "emily.r@example.com", "+1 (555) 456-7890", "UI/UX Design", LeadStatus::NewLead, 78.2, "2025-11-28T11:20:00Z"),
        (5, "David Park", "david.park@example.com", "+1 (555) 567-8901", "Mobile App Development", LeadStatus::Enrolled, 88.7, "2025-11-27T15:50:00Z"),
        (6, "Lisa Anderson", "lisa.a@example.com", "+1 (555) 678-9012", "Cybersecurity Basics", LeadStatus::NewLead, 65.4, "2025-11-26T09:30:00Z"),
        (7, "James Wilson", "jwilson@example.com", "+1 (555) 789-0123", "Cloud Computing", LeadStatus::Enrolled, 94.1, "2025-11-25T16:00:00Z"),
        (8, "Maria Garcia", "maria.g@example.com", "+1 (555) 890-1234", "Python Programming", LeadStatus::Churned, 52.3, "2025-11-24T13:45:00Z"),
    ]
    .into_iter()
    .map(|(id, name, email, phone, course, status, score, created_at)| LeadView {
        id,
        name: name.to_string(),
        email: email.to_string(),
        phone: Some(phone.to_string()),
        course: Some(course.to_string()),
        status,
        score,
        created_at: created_at.to_string(),
    })
    .collect()
}

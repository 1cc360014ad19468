use crate::config::{Config, CourseSource};
use crate::errors::GatewayError;
use crate::gateway::Gateway;
use crate::insights::{ScoreFold, aggregate_with, course_shares, rank_by_mentions, records_from_leads};
use crate::models::{
    AggregatedCourse, CourseInterestRecord, CourseQuery, CourseShare, InsightsQuery, InsightsResponse,
    MessagePoint,
};
use crate::synthesis::synthesize_fallback;
use chrono::{DateTime, Duration, Utc};

/// Number of courses on the dashboard's share chart.
pub const TOP_COURSES: usize = 5;

const MESSAGE_DAYS: u32 = 7;

pub async fn fetch_message_points(gateway: &Gateway) -> Result<Vec<MessagePoint>, GatewayError> {
    let records = gateway.message_volume(MESSAGE_DAYS).await?;
    Ok(records.into_iter().map(MessagePoint::from).collect())
}

/// Raw per-course records from whichever source is configured.
pub async fn fetch_course_records(
    gateway: &Gateway,
    config: &Config,
    query: &CourseQuery,
) -> Result<Vec<CourseInterestRecord>, GatewayError> {
    let records = match config.course_source {
        CourseSource::Leads => {
            let leads = gateway.leads(config.leads_limit).await?;
            records_from_leads(&leads, period_start(Utc::now(), query.days_back))
        }
        CourseSource::Analytics => gateway.course_interest(query.period_type, query.days_back).await?,
    };
    Ok(records.into_iter().map(CourseInterestRecord::normalized).collect())
}

/// Start of a `days_back` window ending at `now`, pinned to the earliest
/// representable instant when the window reaches past it.
fn period_start(now: DateTime<Utc>, days_back: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(days_back)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Aggregates, fills missing metrics and ranks by mentions.
pub fn course_insights(records: &[CourseInterestRecord], fold: ScoreFold) -> Vec<AggregatedCourse> {
    let mut courses: Vec<AggregatedCourse> = aggregate_with(records, fold)
        .iter()
        .map(synthesize_fallback)
        .collect();
    rank_by_mentions(&mut courses);
    courses
}

pub async fn fetch_course_shares(gateway: &Gateway, config: &Config) -> Result<Vec<CourseShare>, GatewayError> {
    let records = fetch_course_records(gateway, config, &CourseQuery::default()).await?;
    let courses = aggregate_with(&records, config.score_fold);
    Ok(course_shares(&courses, TOP_COURSES))
}

pub async fn fetch_insights(
    gateway: &Gateway,
    config: &Config,
    query: &InsightsQuery,
) -> Result<InsightsResponse, GatewayError> {
    let course_query = CourseQuery {
        period_type: query.period_type,
        days_back: query.days_back,
    };
    let (faqs, records, counts) = tokio::try_join!(
        gateway.faqs(query.limit),
        fetch_course_records(gateway, config, &course_query),
        gateway.analytics_counts(),
    )?;

    Ok(InsightsResponse {
        faqs,
        courses: course_insights(&records, config.score_fold),
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(course: &str, leads: u64, mentions: u64) -> CourseInterestRecord {
        CourseInterestRecord {
            course_name: course.to_string(),
            period_start: "2026-01-01T00:00:00".to_string(),
            mentions_count: mentions,
            questions_count: 0,
            leads_count: leads,
            enrollments_count: 0,
            avg_lead_score: 0.0,
            conversion_rate: 0.0,
        }
    }

    #[test]
    fn insights_fill_and_rank_courses() {
        let records = vec![
            record("Quiet", 0, 0),
            record("Python", 5, 0),
            record("Python", 5, 0),
            record("Loud", 1, 500),
        ];
        let courses = course_insights(&records, ScoreFold::PairwiseRunning);

        assert_eq!(courses.len(), 3);
        assert_eq!(courses[0].course_name, "Loud");
        assert_eq!(courses[0].mentions_count, 500);
        assert_eq!(courses[1].course_name, "Python");
        assert_eq!(courses[1].leads_count, 10);
        assert!((30..70).contains(&courses[1].mentions_count));
        assert_eq!(courses[2].course_name, "Quiet");
        assert_eq!(courses[2].mentions_count, 0);
    }

    #[test]
    fn insights_are_stable_across_calls() {
        let records = vec![record("Data Science", 12, 0), record("Web", 3, 0)];
        assert_eq!(
            course_insights(&records, ScoreFold::WeightedMean),
            course_insights(&records, ScoreFold::WeightedMean)
        );
    }

    #[test]
    fn oversized_window_pins_to_earliest_instant() {
        let now = Utc::now();
        assert_eq!(period_start(now, 30), now - Duration::days(30));
        assert_eq!(period_start(now, u32::MAX), DateTime::<Utc>::MIN_UTC);
    }
}

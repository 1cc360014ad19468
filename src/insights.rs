use crate::models::{AggregatedCourse, CourseInterestRecord, CourseShare, LeadRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How `avg_lead_score` and `conversion_rate` are folded across periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFold {
    /// `new = (existing + incoming) / 2` for every non-zero incoming value.
    ///
    /// Order dependent and not a true mean: later records weigh more than
    /// earlier ones. Kept for parity with what the dashboard has always shown;
    /// flagged for product review. A zero first record still seeds the value,
    /// so 0 followed by 80 gives 40.
    #[default]
    PairwiseRunning,
    /// Lead-weighted mean score and `enrollments / leads * 100` rate.
    WeightedMean,
}

/// Folds records into one entry per course name, in first-occurrence order.
///
/// Course names are compared exactly (case-sensitive); they are free text from
/// upstream and no normalization is attempted.
pub fn aggregate(records: &[CourseInterestRecord]) -> Vec<AggregatedCourse> {
    aggregate_with(records, ScoreFold::default())
}

pub fn aggregate_with(records: &[CourseInterestRecord], fold: ScoreFold) -> Vec<AggregatedCourse> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut courses: Vec<AggregatedCourse> = Vec::new();
    let mut weights: Vec<WeightedScore> = Vec::new();

    for record in records {
        match index.get(record.course_name.as_str()) {
            Some(&slot) => {
                let course = &mut courses[slot];
                course.mentions_count = course.mentions_count.saturating_add(record.mentions_count);
                course.questions_count = course.questions_count.saturating_add(record.questions_count);
                course.leads_count = course.leads_count.saturating_add(record.leads_count);
                course.enrollments_count =
                    course.enrollments_count.saturating_add(record.enrollments_count);

                if fold == ScoreFold::PairwiseRunning {
                    if record.avg_lead_score > 0.0 {
                        course.avg_lead_score = (course.avg_lead_score + record.avg_lead_score) / 2.0;
                    }
                    if record.conversion_rate > 0.0 {
                        course.conversion_rate =
                            (course.conversion_rate + record.conversion_rate) / 2.0;
                    }
                }
                weights[slot].add(record);
            }
            None => {
                index.insert(record.course_name.as_str(), courses.len());
                courses.push(AggregatedCourse::from(record));
                let mut weight = WeightedScore::default();
                weight.add(record);
                weights.push(weight);
            }
        }
    }

    if fold == ScoreFold::WeightedMean {
        for (course, weight) in courses.iter_mut().zip(&weights) {
            course.avg_lead_score = weight.mean();
            course.conversion_rate = conversion_rate(course.enrollments_count, course.leads_count);
        }
    }

    courses
}

#[derive(Debug, Default)]
struct WeightedScore {
    weighted_sum: f64,
    weight: f64,
    plain_sum: f64,
    samples: u32,
}

impl WeightedScore {
    fn add(&mut self, record: &CourseInterestRecord) {
        let leads = record.leads_count as f64;
        self.weighted_sum += record.avg_lead_score * leads;
        self.weight += leads;
        self.plain_sum += record.avg_lead_score;
        self.samples += 1;
    }

    fn mean(&self) -> f64 {
        if self.weight > 0.0 {
            self.weighted_sum / self.weight
        } else if self.samples > 0 {
            self.plain_sum / f64::from(self.samples)
        } else {
            0.0
        }
    }
}

pub fn conversion_rate(enrollments: u64, leads: u64) -> f64 {
    if leads == 0 {
        0.0
    } else {
        enrollments as f64 / leads as f64 * 100.0
    }
}

/// Stable sort, most mentioned first. Ties keep their current order.
pub fn rank_by_mentions(courses: &mut [AggregatedCourse]) {
    courses.sort_by(|a, b| b.mentions_count.cmp(&a.mentions_count));
}

/// Builds course records from the lead list alone.
///
/// Leads are the only source of truth for lead and enrollment counts here;
/// mentions and questions are not observable from leads and stay zero.
pub fn records_from_leads(leads: &[LeadRecord], period_start: DateTime<Utc>) -> Vec<CourseInterestRecord> {
    #[derive(Default)]
    struct Tally {
        leads: u64,
        enrolled: u64,
        score_sum: f64,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, Tally> = HashMap::new();

    for lead in leads {
        let Some(course) = lead.interested_course.as_deref().filter(|name| !name.is_empty()) else {
            continue;
        };
        let tally = tallies.entry(course).or_insert_with(|| {
            order.push(course);
            Tally::default()
        });
        tally.leads += 1;
        tally.score_sum += lead.lead_score;
        if lead.status.is_enrolled() {
            tally.enrolled += 1;
        }
    }

    let period_start = period_start.to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut records: Vec<CourseInterestRecord> = order
        .into_iter()
        .map(|course| {
            let tally = &tallies[course];
            CourseInterestRecord {
                course_name: course.to_string(),
                period_start: period_start.clone(),
                mentions_count: 0,
                questions_count: 0,
                leads_count: tally.leads,
                enrollments_count: tally.enrolled,
                avg_lead_score: tally.score_sum / tally.leads as f64,
                conversion_rate: conversion_rate(tally.enrolled, tally.leads),
            }
        })
        .collect();

    records.sort_by(|a, b| b.leads_count.cmp(&a.leads_count));
    records
}

/// Share of leads per course, largest first, limited to `top` entries.
pub fn course_shares(courses: &[AggregatedCourse], top: usize) -> Vec<CourseShare> {
    let total: u64 = courses.iter().map(|course| course.leads_count).sum();

    let mut shares: Vec<CourseShare> = courses
        .iter()
        .map(|course| CourseShare {
            name: course.course_name.clone(),
            value: course.leads_count,
            percentage: if total > 0 {
                (course.leads_count as f64 / total as f64 * 100.0).round() as u32
            } else {
                0
            },
        })
        .collect();

    shares.sort_by(|a, b| b.value.cmp(&a.value));
    shares.truncate(top);
    shares
}

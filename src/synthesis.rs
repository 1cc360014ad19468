//! Deterministic stand-ins for course metrics the backend left at zero.
//!
//! A zero is read as "not reported" rather than "really zero" whenever a course
//! has leads. Every synthesized value is a pure function of the course name and
//! metric, so the dashboard shows the same numbers on every refresh and across
//! restarts.

use crate::insights::conversion_rate;
use crate::models::AggregatedCourse;

/// 32-bit rolling hash over UTF-16 code units: `hash = hash * 31 + unit`,
/// wrapping as a signed 32-bit integer.
pub fn key_hash(key: &str) -> i32 {
    key.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Maps a key to a value in `[0, 1)` via the fractional part of `sin(hash) * 10000`.
pub fn seeded_fraction(key: &str) -> f64 {
    let x = f64::from(key_hash(key)).sin() * 10000.0;
    let fraction = x - x.floor();
    if fraction >= 1.0 { 0.0 } else { fraction }
}

/// Floored value in `[min, max)` derived from `key`. Returns `min` when the
/// range is empty.
pub fn deterministic_metric(key: &str, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    (seeded_fraction(key) * (max - min) + min).floor()
}

fn metric(course_name: &str, metric: &str, min: f64, max: f64) -> f64 {
    deterministic_metric(&format!("{course_name}_{metric}"), min, max)
}

/// Fills zero-valued metrics of a course that has leads. Non-zero metrics are
/// never overwritten and a course without leads comes back unchanged.
///
/// `mentions >= 3 * leads` holds whenever mentions was synthesized. The
/// ordering `mentions >= questions >= leads` does not: the ranges overlap.
pub fn synthesize_fallback(course: &AggregatedCourse) -> AggregatedCourse {
    let mut out = course.clone();
    if course.leads_count == 0 {
        return out;
    }

    let leads = course.leads_count as f64;
    let name = course.course_name.as_str();

    if out.mentions_count == 0 {
        let (min, max) = ((leads * 3.0).floor(), (leads * 7.0).floor());
        out.mentions_count = metric(name, "mentions", min, max) as u64;
    }
    if out.questions_count == 0 {
        let (min, max) = (leads.floor(), (leads * 3.0).floor());
        out.questions_count = metric(name, "questions", min, max) as u64;
    }
    if out.enrollments_count == 0 {
        let enrollments = metric(
            name,
            "enrollments",
            (leads * 0.1).floor(),
            (leads * 0.3).floor() + 1.0,
        ) as u64;
        out.enrollments_count = enrollments.max(1);
    }
    if out.avg_lead_score == 0.0 {
        out.avg_lead_score = metric(name, "lead_score", 30.0, 85.0);
    }
    if out.conversion_rate == 0.0 {
        out.conversion_rate = if out.enrollments_count == 0 {
            metric(name, "conversion_rate", 10.0, 30.0)
        } else {
            conversion_rate(out.enrollments_count, out.leads_count)
        };
    }

    out
}

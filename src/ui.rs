use crate::models::{AnalyticsOverview, CourseShare, MessagePoint};
use crate::refresh::{DashboardSnapshot, Slot};
use std::fmt::Write;

pub fn render_dashboard(snapshot: &DashboardSnapshot, refresh_secs: u64) -> String {
    let date = snapshot
        .overview
        .value
        .as_ref()
        .map(|overview| overview.date.split('T').next().unwrap_or_default().to_string())
        .unwrap_or_else(|| "Loading analytics...".to_string());

    INDEX_HTML
        .replace("{{REFRESH}}", &refresh_secs.to_string())
        .replace("{{DATE}}", &escape_html(&date))
        .replace("{{ERRORS}}", &render_errors(snapshot))
        .replace("{{STATS}}", &render_stats(snapshot.overview.value.as_ref()))
        .replace("{{MESSAGES}}", &render_messages(&snapshot.messages))
        .replace("{{COURSES}}", &render_courses(&snapshot.courses))
}

fn render_errors(snapshot: &DashboardSnapshot) -> String {
    let failures = [
        ("overview", snapshot.overview.error.as_deref()),
        ("messages", snapshot.messages.error.as_deref()),
        ("courses", snapshot.courses.error.as_deref()),
    ];

    let mut html = String::new();
    for (slot, error) in failures {
        if let Some(error) = error {
            let _ = write!(
                html,
                r#"<div class="banner"><strong>Failed to load {slot}.</strong> {} Retrying automatically.</div>"#,
                escape_html(error)
            );
        }
    }
    html
}

fn render_stats(overview: Option<&AnalyticsOverview>) -> String {
    let Some(overview) = overview else {
        return r#"<p class="empty">Waiting for the first refresh.</p>"#.to_string();
    };

    let stats = [
        ("Conversations today", overview.conversations_today.to_string()),
        ("Leads today", overview.leads_today.to_string()),
        ("Active conversations", overview.active_conversations.to_string()),
        ("Conversion rate", format!("{:.1}%", overview.conversion_rate)),
        ("Avg lead score", format!("{:.1}", overview.avg_lead_score)),
        ("Messages today", overview.messages_today.to_string()),
    ];

    let mut html = String::new();
    for (label, value) in stats {
        let _ = write!(
            html,
            r#"<div class="stat"><span class="label">{label}</span><span class="value">{value}</span></div>"#
        );
    }
    html
}

fn render_messages(slot: &Slot<Vec<MessagePoint>>) -> String {
    let points = match &slot.value {
        Some(points) if !points.is_empty() => points,
        _ => return r#"<p class="empty">No message data yet.</p>"#.to_string(),
    };

    let peak = points.iter().map(|point| point.messages).max().unwrap_or(0).max(1);
    let mut html = String::new();
    for point in points {
        let width = point.messages * 100 / peak;
        let _ = write!(
            html,
            r#"<div class="bar-row"><span class="bar-label">{}</span><div class="bar" style="width: {width}%"></div><span class="bar-value">{}</span></div>"#,
            escape_html(&point.date),
            point.messages
        );
    }
    html
}

fn render_courses(slot: &Slot<Vec<CourseShare>>) -> String {
    let shares = match &slot.value {
        Some(shares) if !shares.is_empty() => shares,
        _ => return r#"<p class="empty">No course interest yet.</p>"#.to_string(),
    };

    let mut html = String::new();
    for share in shares {
        let _ = write!(
            html,
            r#"<div class="bar-row"><span class="bar-label">{}</span><div class="bar accent" style="width: {}%"></div><span class="bar-value">{} ({}%)</span></div>"#,
            escape_html(&share.name),
            share.percentage,
            share.value,
            share.percentage
        );
    }
    html
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <meta http-equiv="refresh" content="{{REFRESH}}" />
  <title>Dialogic Dashboard</title>
  <style>
    :root {
      --bg: #f1f5f9;
      --ink: #1e293b;
      --muted: #64748b;
      --accent: #2563eb;
      --accent-2: #7c3aed;
      --card: #ffffff;
      --shadow: 0 12px 32px rgba(15, 23, 42, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px;
    }

    .app {
      max-width: 1100px;
      margin: 0 auto;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: flex-end;
      flex-wrap: wrap;
      gap: 8px;
    }

    h1 {
      margin: 0;
      font-size: 2rem;
    }

    h2 {
      margin: 0 0 16px;
      font-size: 1.2rem;
    }

    .subtitle {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .banner {
      background: #fef2f2;
      border: 1px solid #fecaca;
      color: #991b1b;
      border-radius: 12px;
      padding: 14px 18px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    .stat,
    .card {
      background: var(--card);
      border-radius: 16px;
      box-shadow: var(--shadow);
      padding: 20px;
    }

    .stat span {
      display: block;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      margin-top: 8px;
      font-size: 1.8rem;
      font-weight: 600;
    }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 16px;
    }

    .bar-row {
      display: grid;
      grid-template-columns: 140px 1fr 90px;
      align-items: center;
      gap: 12px;
      margin-bottom: 10px;
    }

    .bar-label {
      overflow: hidden;
      text-overflow: ellipsis;
      white-space: nowrap;
    }

    .bar {
      height: 12px;
      border-radius: 999px;
      background: var(--accent);
    }

    .bar.accent {
      background: var(--accent-2);
    }

    .bar-value {
      text-align: right;
      color: var(--muted);
    }

    .empty {
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Dialogic Dashboard</h1>
        <p class="subtitle">Data for {{DATE}}</p>
      </div>
      <p class="subtitle">Auto-refreshes every {{REFRESH}} seconds</p>
    </header>

    {{ERRORS}}

    <section class="panel">
      {{STATS}}
    </section>

    <section class="charts">
      <div class="card">
        <h2>Messages, last 7 days</h2>
        {{MESSAGES}}
      </div>
      <div class="card">
        <h2>Top courses by leads</h2>
        {{COURSES}}
      </div>
    </section>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::Tagged;

    #[test]
    fn empty_snapshot_renders_placeholders() {
        let html = render_dashboard(&DashboardSnapshot::default(), 30);
        assert!(html.contains("Dialogic Dashboard"));
        assert!(html.contains("Waiting for the first refresh."));
        assert!(html.contains(r#"content="30""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn course_names_are_escaped() {
        let mut snapshot = DashboardSnapshot::default();
        snapshot.courses.apply(Tagged::new(
            1,
            Ok(vec![CourseShare {
                name: "<script>alert(1)</script>".into(),
                value: 3,
                percentage: 100,
            }]),
        ));
        let html = render_dashboard(&snapshot, 30);
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn errors_render_as_banners() {
        let mut snapshot = DashboardSnapshot::default();
        snapshot
            .overview
            .apply(Tagged::new(1, Err("API returned 503".to_string())));
        let html = render_dashboard(&snapshot, 30);
        assert!(html.contains("Failed to load overview."));
        assert!(html.contains("API returned 503"));
    }
}

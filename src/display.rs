use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;

use crate::types::{TimingRecord, format_centis, round_to_centis};

/// Renders a record as `<label> took: <d>. From Program Start: <e>.`
pub fn format_text(record: &TimingRecord) -> String {
    format!(
        "{} took: {}. From Program Start: {}.",
        record.label,
        format_centis(record.duration_centis()),
        format_centis(record.elapsed_centis()),
    )
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    label: &'a str,
    duration_secs: f64,
    elapsed_secs: f64,
    started_at: String,
}

/// Renders a record as a single-line JSON object.
pub fn format_json(record: &TimingRecord, started_at: DateTime<Utc>) -> String {
    let json = JsonRecord {
        label: &record.label,
        duration_secs: record.duration_centis() as f64 / 100.0,
        elapsed_secs: record.elapsed_centis() as f64 / 100.0,
        started_at: started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    serde_json::to_string(&json).unwrap_or_default()
}

fn style_scenario() -> Style {
    Style::new().cyan().bold()
}

/// Post-run summary written to stderr.
pub fn format_summary(scenario: &str, steps: usize, total: Duration) -> String {
    let name = scenario
        .if_supports_color(Stream::Stderr, |s| s.style(style_scenario()))
        .to_string();
    let total = format!("{}s", format_centis(round_to_centis(total)));
    let total = total
        .if_supports_color(Stream::Stderr, |s| s.yellow())
        .to_string();
    let steps = format!(
        "{} measured step{}",
        steps,
        if steps == 1 { "" } else { "s" }
    );
    let steps = steps
        .if_supports_color(Stream::Stderr, |s| s.dimmed())
        .to_string();

    format!("{} finished in {} ({})", name, total, steps)
}

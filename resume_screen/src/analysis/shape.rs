//! Normalization of loosely shaped scoring-service responses.
//!
//! Each endpoint has an ordered list of shape matchers. The first matcher
//! that finds a sequence wins; when none does the result is an empty
//! sequence. Nothing in here returns an error or panics on odd input.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::models::{AnalysisResult, EligibleHistoryItem, HistoryId, Verdict};
use crate::errors::ClientError;

type SequenceMatcher = fn(&Value) -> Option<&Vec<Value>>;

/// Lowest and highest valid match score.
pub const SCORE_RANGE: (f64, f64) = (0.0, 100.0);

fn bare_sequence(body: &Value) -> Option<&Vec<Value>> {
    body.as_array()
}

fn results_field(body: &Value) -> Option<&Vec<Value>> {
    body.get("results").and_then(Value::as_array)
}

fn eligible_resumes_field(body: &Value) -> Option<&Vec<Value>> {
    body.get("eligible_resumes").and_then(Value::as_array)
}

/// Shapes `POST /analyze` is known to answer with.
const ANALYSIS_SHAPES: &[(&str, SequenceMatcher)] = &[("results field", results_field)];

/// Shapes `GET /eligible/{email}` has answered with across service revisions.
const ELIGIBLE_SHAPES: &[(&str, SequenceMatcher)] = &[
    ("bare sequence", bare_sequence),
    ("results field", results_field),
    ("eligible_resumes field", eligible_resumes_field),
];

fn first_sequence<'a>(
    endpoint: &str,
    body: &'a Value,
    shapes: &[(&'static str, SequenceMatcher)],
) -> &'a [Value] {
    for (name, matcher) in shapes {
        if let Some(items) = matcher(body) {
            log::trace!("{endpoint} response matched {name}");
            return items;
        }
    }

    let err = ClientError::MalformedResponse(format!("{endpoint}: {}", describe(body)));
    log::warn!("{err}; using an empty list");
    &[]
}

fn describe(body: &Value) -> &'static str {
    match body {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object without a known list field",
    }
}

/// Normalize an analyze response into the result set to display.
pub fn analysis_results(body: &Value) -> Vec<AnalysisResult> {
    first_sequence("analyze", body, ANALYSIS_SHAPES)
        .iter()
        .filter_map(|item| match item.as_object() {
            Some(fields) => Some(analysis_result(fields)),
            None => {
                log::warn!("skipping analysis entry that is not an object: {}", describe(item));
                None
            }
        })
        .collect()
}

/// Normalize an eligible-history response.
pub fn eligible_history(body: &Value) -> Vec<EligibleHistoryItem> {
    first_sequence("eligible", body, ELIGIBLE_SHAPES)
        .iter()
        .filter_map(|item| match item.as_object() {
            Some(fields) => Some(history_item(fields)),
            None => {
                log::warn!("skipping history entry that is not an object: {}", describe(item));
                None
            }
        })
        .collect()
}

fn analysis_result(fields: &Map<String, Value>) -> AnalysisResult {
    let status = text(fields, "status")
        .map(Verdict::from_wire)
        .unwrap_or(Verdict::NotEligible);

    let matched_skills = match (status, fields.get("matched_skills")) {
        (Verdict::Eligible, Some(Value::Array(skills))) => skills
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => BTreeSet::new(),
    };

    AnalysisResult {
        resume_name: text(fields, "resume_name").unwrap_or_default().to_string(),
        status,
        matched_skills,
        match_score: score(fields),
        file_url: link(fields),
    }
}

fn history_item(fields: &Map<String, Value>) -> EligibleHistoryItem {
    let resume_name = text(fields, "resume_name").unwrap_or_default().to_string();

    let id = match fields.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        // Without an id the name is the only stable key the service offers.
        _ => resume_name.clone(),
    };

    EligibleHistoryItem {
        id: HistoryId(id),
        resume_name,
        match_score: score(fields),
        file_url: link(fields),
        created_at: text(fields, "created_at").map(str::to_string),
    }
}

fn text<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

fn link(fields: &Map<String, Value>) -> Option<String> {
    text(fields, "file_url")
        .filter(|url| !url.trim().is_empty())
        .map(str::to_string)
}

/// Read `match_score`, accepting integers, floats and numeric strings, and
/// clamp it into [`SCORE_RANGE`].
fn score(fields: &Map<String, Value>) -> f64 {
    let raw = match fields.get("match_score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    clamp_score(raw.unwrap_or(SCORE_RANGE.0))
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return SCORE_RANGE.0;
    }
    score.clamp(SCORE_RANGE.0, SCORE_RANGE.1)
}

//! Scraping of the evaluation tool's textual output.
//!
//! Output is one metric per line: a label token, optionally a query-id
//! column (`all` for the aggregate row), and the score as the last
//! whitespace-separated field. Label spellings vary across trec_eval
//! versions (`P_10` vs `P10`), so both are accepted. Per-query rows
//! produced by `-q` are ignored; only the aggregate row counts.

use crate::errors::EvalError;
use crate::model::RunScores;

const MAP_LABELS: &[&str] = &["map"];
const P10_LABELS: &[&str] = &["P_10", "P10"];
const P20_LABELS: &[&str] = &["P_20", "P20"];

pub(crate) fn scores_from_output(output: &str) -> Result<RunScores, EvalError> {
    Ok(RunScores {
        map: metric(output, MAP_LABELS, "map")?,
        p10: metric(output, P10_LABELS, "P@10")?,
        p20: metric(output, P20_LABELS, "P@20")?,
    })
}

fn metric(output: &str, labels: &[&str], canonical: &'static str) -> Result<f64, EvalError> {
    for line in output.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else { continue };
        if !labels.contains(&label) {
            continue;
        }
        let rest: Vec<&str> = fields.collect();
        let value = match rest.as_slice() {
            // old two-column layout: label and score only
            [value] => *value,
            // aggregate row of the query-id layout
            [query, .., value] if *query == "all" => *value,
            // per-query row or junk
            _ => continue,
        };
        let parsed = value.parse::<f64>().ok().filter(|v| v.is_finite());
        return parsed.ok_or_else(|| EvalError::BadNumber {
            label: canonical,
            value: value.to_string(),
        });
    }
    Err(EvalError::MissingMetric(canonical))
}

//! Year-over-year trend aggregation.
//!
//! Melts the wide quality table back to long form, drops missing scores,
//! and aggregates per (measure, year): distinct-provider count, mean and
//! median. Rows without a parseable snapshot year cannot be grouped by
//! year and are excluded.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::types::{TrendRow, WideQualityTable};

/// Aggregate the pre-join wide table into sorted [`TrendRow`]s.
pub fn summarize_trends(wide: &WideQualityTable) -> Vec<TrendRow> {
    let mut groups: BTreeMap<(&'static str, i32), Vec<(&str, f64)>> = BTreeMap::new();
    let mut dropped_null_year = 0_usize;

    for row in &wide.rows {
        for (measure_idx, &measure) in wide.measures.iter().enumerate() {
            let Some(score) = row.scores[measure_idx] else {
                continue;
            };
            match row.key.snapshot_year {
                Some(year) => groups
                    .entry((measure, year))
                    .or_default()
                    .push((row.key.provider_id.as_str(), score)),
                None => dropped_null_year += 1,
            }
        }
    }
    if dropped_null_year > 0 {
        debug!(
            "{} scored rows without a parseable snapshot year excluded from trends",
            dropped_null_year
        );
    }

    groups
        .into_iter()
        .map(|((measure, year), samples)| {
            let providers: HashSet<&str> = samples.iter().map(|(p, _)| *p).collect();
            let mut scores: Vec<f64> = samples.iter().map(|(_, s)| *s).collect();
            scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            TrendRow {
                measure: measure.to_string(),
                snapshot_year: year,
                facilities: providers.len(),
                avg_score: scores.iter().sum::<f64>() / scores.len() as f64,
                median_score: median(&scores),
            }
        })
        .collect()
}

/// Median of an already-sorted, non-empty slice.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

//! Percentile-rank composite across the measure columns present.
//!
//! Each measure column is ranked ascending over all wide rows (lower =
//! better; the catalog measures are rates of adverse events), expressed as
//! a percentile in (0, 1] with average ranks on ties. The composite is the
//! row-wise mean of those percentiles. How a missing score participates is
//! a policy choice, configurable because the historically shipped default
//! is not obviously intended.

use serde::Deserialize;

use crate::types::WideQualityTable;

/// What a missing measure value contributes to a row's composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Missing scores share the tied best (lowest) rank block for the
    /// column. Parity default.
    #[default]
    MostFavorable,
    /// Missing scores share the tied worst (highest) rank block.
    LeastFavorable,
    /// Missing scores are left out of the row's mean; present scores rank
    /// only among themselves.
    Exclude,
}

/// Append `composite` to every row: the mean of its per-measure percentile
/// ranks. Rows with nothing to contribute (no measure columns at all, or
/// every measure missing under [`MissingPolicy::Exclude`]) stay `None`.
pub fn score_composite(table: &mut WideQualityTable, policy: MissingPolicy) {
    let measure_count = table.measures.len();
    let row_count = table.rows.len();
    if measure_count == 0 || row_count == 0 {
        return;
    }

    let mut percentiles: Vec<Vec<Option<f64>>> = Vec::with_capacity(measure_count);
    for measure_idx in 0..measure_count {
        let values: Vec<Option<f64>> = table
            .rows
            .iter()
            .map(|row| row.scores[measure_idx])
            .collect();
        percentiles.push(percentile_ranks(&values, policy));
    }

    for (row_idx, row) in table.rows.iter_mut().enumerate() {
        let contributions: Vec<f64> = percentiles
            .iter()
            .filter_map(|column| column[row_idx])
            .collect();
        row.composite = if contributions.is_empty() {
            None
        } else {
            Some(contributions.iter().sum::<f64>() / contributions.len() as f64)
        };
    }
}

/// Ascending percentile ranks for one column, average ranks on ties.
/// Missing values are placed per the policy; under `Exclude` they yield
/// `None` and present values rank among themselves only.
fn percentile_ranks(values: &[Option<f64>], policy: MissingPolicy) -> Vec<Option<f64>> {
    let total = values.len();
    let mut order: Vec<usize> = (0..total).filter(|&i| values[i].is_some()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let present = order.len();
    let missing = total - present;

    // 1-based average ranks among the present values.
    let mut rank = vec![0.0_f64; total];
    let mut i = 0;
    while i < present {
        let mut j = i;
        while j + 1 < present && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + 1 + j + 1) as f64 / 2.0;
        for k in i..=j {
            rank[order[k]] = avg;
        }
        i = j + 1;
    }

    let total_f = total as f64;
    let missing_f = missing as f64;
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| match (value, policy) {
            (Some(_), MissingPolicy::MostFavorable) => {
                Some((missing_f + rank[idx]) / total_f)
            }
            (None, MissingPolicy::MostFavorable) => Some((missing_f + 1.0) / 2.0 / total_f),
            (Some(_), MissingPolicy::LeastFavorable) => Some(rank[idx] / total_f),
            (None, MissingPolicy::LeastFavorable) => {
                Some((total_f - (missing_f - 1.0) / 2.0) / total_f)
            }
            (Some(_), MissingPolicy::Exclude) => Some(rank[idx] / present as f64),
            (None, MissingPolicy::Exclude) => None,
        })
        .collect()
}

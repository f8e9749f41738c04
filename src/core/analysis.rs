// LogScope - core/analysis.rs
//
// Summary statistics over a batch of entries. Read-only over the entries;
// produces an independent `AnalysisResult`. Total: an empty or fully
// unparsed batch yields zeros, empty tables, and absent optional sections.

use crate::core::model::{AnalysisResult, Entry, ResponseSizes, Tally, TimeRange, Timestamp};
use crate::util::constants;
use chrono::Timelike;
use std::collections::HashMap;
use std::hash::Hash;

/// Compute summary statistics for `entries`.
pub fn analyze(entries: &[Entry]) -> AnalysisResult {
    let total_entries = entries.len();
    let parsed: Vec<&Entry> = entries.iter().filter(|e| e.is_parsed()).collect();
    let parsed_entries = parsed.len();

    let parse_rate = if total_entries == 0 {
        0.0
    } else {
        parsed_entries as f64 / total_entries as f64 * 100.0
    };

    let mut top_ips = rank(parsed.iter().filter_map(|e| e.ip()));
    let unique_ips = top_ips.len();
    top_ips.truncate(constants::TOP_N);

    let status_codes = rank(parsed.iter().filter_map(|e| e.status()).filter(|s| *s != 0));
    let http_methods = rank(parsed.iter().filter_map(|e| e.method()));
    let mut top_paths = rank(parsed.iter().filter_map(|e| e.path()));
    top_paths.truncate(constants::TOP_N);

    let sizes: Vec<u64> = parsed
        .iter()
        .filter_map(|e| e.size())
        .filter(|s| *s != 0)
        .collect();

    let timestamps: Vec<Timestamp> = parsed.iter().filter_map(|e| e.timestamp()).collect();
    let traffic_by_hour = rank(timestamps.iter().map(|ts| ts.hour()));

    let result = AnalysisResult {
        total_entries,
        parsed_entries,
        parse_rate,
        unique_ips,
        top_ips: into_owned(top_ips),
        status_codes,
        http_methods: into_owned(http_methods),
        top_paths: into_owned(top_paths),
        response_sizes: response_sizes(&sizes),
        time_range: time_range(&timestamps),
        traffic_by_hour,
    };

    tracing::debug!(
        total = result.total_entries,
        parsed = result.parsed_entries,
        unique_ips = result.unique_ips,
        "Analysis complete"
    );

    result
}

/// Frequency table ordered by descending count. The sort is stable, so
/// equal counts keep the order in which each value was first seen.
fn rank<K, I>(values: I) -> Vec<Tally<K>>
where
    K: Eq + Hash + Copy,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut table: Vec<Tally<K>> = Vec::new();

    for value in values {
        match index.get(&value) {
            Some(&slot) => table[slot].count += 1,
            None => {
                index.insert(value, table.len());
                table.push(Tally { value, count: 1 });
            }
        }
    }

    table.sort_by(|a, b| b.count.cmp(&a.count));
    table
}

fn into_owned(table: Vec<Tally<&str>>) -> Vec<Tally<String>> {
    table
        .into_iter()
        .map(|t| Tally {
            value: t.value.to_string(),
            count: t.count,
        })
        .collect()
}

fn response_sizes(sizes: &[u64]) -> Option<ResponseSizes> {
    let max_size = *sizes.iter().max()?;
    let min_size = *sizes.iter().min()?;
    let total_bytes: u64 = sizes.iter().sum();

    Some(ResponseSizes {
        total_bytes,
        avg_size: total_bytes as f64 / sizes.len() as f64,
        max_size,
        min_size,
    })
}

fn time_range(timestamps: &[Timestamp]) -> Option<TimeRange> {
    let start = *timestamps.iter().min()?;
    let end = *timestamps.iter().max()?;
    Some(TimeRange {
        start,
        end,
        duration: end - start,
    })
}

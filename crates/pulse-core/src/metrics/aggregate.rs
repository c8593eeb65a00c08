//! Rolling-window computations over buffer snapshots.
//!
//! Every function here operates on an owned snapshot of a ring buffer,
//! never a live view, so one query sees a consistent dataset even while
//! ingestion continues. Division-by-zero cases (empty buffers, empty
//! windows) uniformly produce `0` or an empty collection.

use ahash::AHashMap;
use chrono::{DateTime, Timelike, Utc};

use crate::types::{EndpointStats, HistogramBucket, HourlyTraffic, RequestSample};

/// Fixed response-time histogram buckets: upper bound (exclusive) and label,
/// in ascending order. Every sample lands in the first bucket whose upper
/// bound exceeds it, so placement is total even for garbage input.
const HISTOGRAM_BUCKETS: &[(f64, &str)] = &[
    (50.0, "0-50ms"),
    (100.0, "50-100ms"),
    (200.0, "100-200ms"),
    (500.0, "200-500ms"),
    (1000.0, "500-1000ms"),
    (2000.0, "1000-2000ms"),
    (f64::INFINITY, "2000ms+"),
];

/// Percentile by rank: `floor(count * pct)` into the sorted samples,
/// clamped into range. Returns `0` for an empty slice.
pub(crate) fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = ((sorted.len() as f64 * pct).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

/// Request count, mean response time, and error-rate percentage for the
/// requests newer than `cutoff`.
pub(crate) fn window_stats(
    requests: &[RequestSample],
    cutoff: DateTime<Utc>,
) -> (usize, f64, f64) {
    let mut count = 0usize;
    let mut errors = 0usize;
    let mut total_ms = 0.0f64;

    for sample in requests.iter().filter(|s| s.timestamp > cutoff) {
        count += 1;
        total_ms += sample.response_time_ms;
        if sample.is_error() {
            errors += 1;
        }
    }

    if count == 0 {
        return (0, 0.0, 0.0);
    }

    #[allow(clippy::cast_precision_loss)]
    let average = total_ms / count as f64;
    #[allow(clippy::cast_precision_loss)]
    let error_rate = errors as f64 / count as f64 * 100.0;

    (count, average, error_rate)
}

/// Groups the full buffer by `(method, endpoint)` and returns per-group
/// statistics, busiest group first, at most `limit` entries.
pub(crate) fn top_endpoints(requests: &[RequestSample], limit: usize) -> Vec<EndpointStats> {
    let mut groups: AHashMap<(&str, &str), Vec<&RequestSample>> = AHashMap::new();
    for sample in requests {
        groups
            .entry((sample.method.as_str(), sample.endpoint.as_str()))
            .or_default()
            .push(sample);
    }

    let mut stats: Vec<EndpointStats> = groups
        .into_iter()
        .map(|((method, endpoint), samples)| {
            let count = samples.len();
            let errors = samples.iter().filter(|s| s.is_error()).count();
            let total_ms: f64 = samples.iter().map(|s| s.response_time_ms).sum();

            let mut times: Vec<f64> = samples.iter().map(|s| s.response_time_ms).collect();
            times.sort_unstable_by(f64::total_cmp);

            #[allow(clippy::cast_precision_loss)]
            EndpointStats {
                endpoint: endpoint.to_string(),
                method: method.to_string(),
                request_count: count,
                average_response_time_ms: total_ms / count as f64,
                error_rate_percent: errors as f64 / count as f64 * 100.0,
                p95_response_time_ms: percentile(&times, 0.95),
                p99_response_time_ms: percentile(&times, 0.99),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.request_count
            .cmp(&a.request_count)
            .then_with(|| a.endpoint.cmp(&b.endpoint))
            .then_with(|| a.method.cmp(&b.method))
    });
    stats.truncate(limit);
    stats
}

/// Response-time distribution over the full buffer.
///
/// Returns an empty list for an empty buffer rather than zero-filled buckets.
pub(crate) fn response_time_histogram(requests: &[RequestSample]) -> Vec<HistogramBucket> {
    if requests.is_empty() {
        return Vec::new();
    }

    let mut counts = [0usize; HISTOGRAM_BUCKETS.len()];
    for sample in requests {
        for (i, (upper, _)) in HISTOGRAM_BUCKETS.iter().enumerate() {
            if sample.response_time_ms < *upper {
                counts[i] += 1;
                break;
            }
        }
    }

    let total = requests.len();
    HISTOGRAM_BUCKETS
        .iter()
        .zip(counts)
        .map(|((_, range), count)| {
            #[allow(clippy::cast_precision_loss)]
            HistogramBucket {
                range: (*range).to_string(),
                count,
                percentage: count as f64 / total as f64 * 100.0,
            }
        })
        .collect()
}

/// Request and error counts bucketed by hour of day (UTC).
///
/// Always returns exactly 24 entries, hours 0..=23 ascending, zero-filled
/// where no data exists.
pub(crate) fn hourly_traffic(requests: &[RequestSample]) -> Vec<HourlyTraffic> {
    let mut request_counts = [0usize; 24];
    let mut error_counts = [0usize; 24];

    for sample in requests {
        let hour = sample.timestamp.hour() as usize;
        request_counts[hour] += 1;
        if sample.is_error() {
            error_counts[hour] += 1;
        }
    }

    (0u32..24)
        .map(|hour| HourlyTraffic {
            hour,
            request_count: request_counts[hour as usize],
            error_count: error_counts[hour as usize],
        })
        .collect()
}

/// Approximates peak requests-per-minute as the busiest hourly bucket
/// divided by 60, rounded.
pub(crate) fn peak_requests_per_minute(hourly: &[HourlyTraffic]) -> u64 {
    let peak_hour = hourly.iter().map(|h| h.request_count).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let peak = (peak_hour as f64 / 60.0).round() as u64;
    peak
}

/// Formats a second count as `{d}d {h}h {m}m`.
pub(crate) fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    format!("{days}d {hours}h {minutes}m")
}

// Downsampling: resolution selection + reshaping of aggregate rows.
// DB access (the grouped range query) stays in results_repo::mod.

use std::num::NonZeroU32;

use crate::models::{AggregateRow, BucketWidth, QueryResult};

/// Picks a bucket width so that roughly `target_points` buckets cover the
/// query span. `start`/`end` are epoch seconds in either order; a zero span
/// clamps to a 1-second bin.
pub fn select_bucket_width(start: i64, end: i64, target_points: NonZeroU32) -> BucketWidth {
    let span_secs = end.abs_diff(start);
    let size = ((span_secs as f64 / target_points.get() as f64).round() as i64).max(1);
    BucketWidth::seconds(size)
}

/// Groups already-sorted aggregate rows by bucket start, preserving row
/// order within each bucket. Total: empty input yields an empty map.
pub fn assemble(rows: Vec<AggregateRow>) -> QueryResult {
    let mut out = QueryResult::new();
    for row in rows {
        out.entry(row.created_at).or_default().push(row);
    }
    out
}

//! Insight extraction from market data.

use crate::models::{Insights, MarketData, Segment, Trend};
use std::cmp::Ordering;
use tracing::{debug, warn, Span};

/// Derive insights from gathered market data.
///
/// Returns `None` when there are no trends or no segments.
pub fn process_data(market_data: &MarketData, span: &Span) -> Option<Insights> {
    span.in_scope(|| {
        let (Some(top), Some(target)) = (
            top_trend(&market_data.trends),
            target_segment(&market_data.customer_segments),
        ) else {
            warn!("Insufficient data for analysis");
            return None;
        };

        debug!("Top trend: {} ({})", top.name, top.score);

        Some(Insights {
            top_trend: top.name.clone(),
            target_segment: target.clone(),
        })
    })
}

/// The trend with the highest score. On ties the earliest trend wins.
pub fn top_trend(trends: &[Trend]) -> Option<&Trend> {
    first_max_by(trends, |t| t.score)
}

/// The segment with the largest size. On ties the earliest segment wins.
pub fn target_segment(segments: &[Segment]) -> Option<&Segment> {
    first_max_by(segments, Segment::size)
}

/// Maximum by key, keeping the first of equal elements.
///
/// `Iterator::max_by` keeps the last one, hence the fold.
fn first_max_by<T>(items: &[T], key: impl Fn(&T) -> f64) -> Option<&T> {
    items
        .iter()
        .fold(None::<(&T, f64)>, |best, item| {
            let score = key(item);
            match best {
                Some((_, best_score))
                    if score.partial_cmp(&best_score) != Some(Ordering::Greater) =>
                {
                    best
                }
                _ => Some((item, score)),
            }
        })
        .map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn trends(pairs: &[(&str, f64)]) -> Vec<Trend> {
        pairs
            .iter()
            .map(|(name, score)| Trend {
                name: name.to_string(),
                score: *score,
            })
            .collect()
    }

    fn segments(value: Value) -> Vec<Segment> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_top_trend() {
        let data = trends(&[("a", 1.0), ("b", 5.0), ("c", 3.0)]);
        assert_eq!(top_trend(&data).unwrap().name, "b");
    }

    #[test]
    fn test_target_segment() {
        let data = segments(json!([{"size": 2}, {"size": 9}, {"size": 1}]));
        assert_eq!(target_segment(&data).unwrap(), &segments(json!([{"size": 9}]))[0]);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let data = trends(&[("x", 2.0), ("y", 7.0), ("z", 7.0)]);
        assert_eq!(top_trend(&data).unwrap().name, "y");

        let data = segments(json!([
            {"name": "first", "size": 4},
            {"name": "second", "size": 4}
        ]));
        assert_eq!(target_segment(&data).unwrap().0["name"], "first");
    }

    #[test]
    fn test_missing_size_counts_as_zero() {
        let data = segments(json!([{"name": "unsized"}, {"size": -1}]));
        assert_eq!(target_segment(&data).unwrap().0["name"], "unsized");
    }

    #[test]
    fn test_nan_score_never_wins() {
        let data = trends(&[("a", 1.0), ("b", f64::NAN), ("c", 0.5)]);
        assert_eq!(top_trend(&data).unwrap().name, "a");
    }

    #[test]
    fn test_process_data() {
        let data = MarketData {
            trends: trends(&[("a", 1.0), ("b", 5.0), ("c", 3.0)]),
            customer_segments: segments(json!([{"size": 2}, {"size": 9}, {"size": 1}])),
            campaign_metrics: None,
        };

        let insights = process_data(&data, &Span::none()).unwrap();
        assert_eq!(insights.top_trend, "b");
        assert_eq!(insights.target_segment.size(), 9.0);
    }

    #[test]
    fn test_process_data_insufficient() {
        let no_trends = MarketData {
            customer_segments: segments(json!([{"size": 2}])),
            ..MarketData::default()
        };
        assert!(process_data(&no_trends, &Span::none()).is_none());

        let no_segments = MarketData {
            trends: trends(&[("a", 1.0)]),
            ..MarketData::default()
        };
        assert!(process_data(&no_segments, &Span::none()).is_none());
    }
}

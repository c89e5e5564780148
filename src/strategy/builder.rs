//! Strategy generation from insights.

use crate::models::{Insights, Objective, Strategy, StrategyType};
use tracing::{warn, Span};

/// Build a targeted campaign strategy from insights.
///
/// Returns `None` when no insights are available.
pub fn generate_strategy(insights: Option<&Insights>, span: &Span) -> Option<Strategy> {
    let Some(insights) = insights else {
        span.in_scope(|| warn!("No insights available for strategy generation"));
        return None;
    };

    Some(Strategy {
        kind: StrategyType::TargetedCampaign,
        objective: Objective::CustomerAcquisition,
        segments: vec![insights.target_segment.clone()],
        trend_focus: insights.top_trend.clone(),
    })
}

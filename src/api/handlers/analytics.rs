use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::require_ledger;
use crate::api::response::{ApiError, AppQuery, Data, Success};
use crate::ledger::models::{RankedPhoto, RecentLike, SummaryStats};
use crate::ledger::DEFAULT_LIMIT;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalyticsData {
    Summary(SummaryStats),
    Ranking {
        ranking: Vec<RankedPhoto>,
        total: usize,
    },
    Recent {
        recent: Vec<RecentLike>,
        total: usize,
    },
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn analytics(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<AnalyticsParams>,
) -> Result<Json<Success<Data<AnalyticsData>>>, ApiError> {
    let ledger = require_ledger(&state)?;

    let data = match params.kind.as_deref().unwrap_or("summary") {
        "summary" => AnalyticsData::Summary(ledger.summary().await?),
        "ranking" => {
            let ranking = ledger.ranking(parse_limit(params.limit.as_deref())).await?;
            AnalyticsData::Ranking {
                total: ranking.len(),
                ranking,
            }
        }
        "recent" => {
            let recent = ledger.recent(parse_limit(params.limit.as_deref())).await?;
            AnalyticsData::Recent {
                total: recent.len(),
                recent,
            }
        }
        _ => {
            return Err(ApiError::bad_request(
                "Invalid type parameter. Use: summary, ranking, or recent",
            ))
        }
    };

    Ok(Success::json(Data { data }))
}

/// Leading decimal digits of `raw` as a positive count; anything else falls
/// back to [`DEFAULT_LIMIT`].
fn parse_limit(raw: Option<&str>) -> usize {
    let Some(raw) = raw.map(str::trim_start) else {
        return DEFAULT_LIMIT;
    };
    let digits = raw
        .strip_prefix('+')
        .unwrap_or(raw)
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or_default();

    match digits.parse::<usize>() {
        Ok(limit) if limit > 0 => limit,
        _ => DEFAULT_LIMIT,
    }
}

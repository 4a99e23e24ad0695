//! Weekly weighted-average forecast feed.

use chrono::NaiveDate;
use dk_reconcile::WeeklyPoint;
use dk_schemas::SubmarketCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{clip_body, FeedError};

/// One record as the feed publishes it. The submarket is still free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyWeightedAverageRecord {
    pub submarket: String,
    pub week_start: NaiveDate,
    pub weighted_average: f64,
}

/// Resolve every record's submarket through the registry.
///
/// The first unknown submarket fails the whole batch.
pub fn parse_weekly(records: &[WeeklyWeightedAverageRecord]) -> Result<Vec<WeeklyPoint>, FeedError> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let submarket = SubmarketCode::from_mnemonic(&r.submarket).map_err(|source| {
                FeedError::Registry {
                    record_index: i,
                    source,
                }
            })?;
            Ok(WeeklyPoint {
                submarket,
                week_start: r.week_start,
                weighted_average: r.weighted_average,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
pub trait ForecastFeed: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Weekly points published for `product_date`, submarkets resolved.
    async fn fetch_weekly(&self, product_date: NaiveDate) -> Result<Vec<WeeklyPoint>, FeedError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Bearer token is resolved by the caller and passed in; do not log it.
#[derive(Clone)]
pub struct HttpForecastFeed {
    token: String,
    http: reqwest::Client,
    base_url: String,
    path: String,
}

impl std::fmt::Debug for HttpForecastFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpForecastFeed")
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl HttpForecastFeed {
    pub fn new(token: String) -> Self {
        Self::new_with_base_url(
            token,
            "http://localhost:8000/api/v2".to_string(),
            "decks/weol/weighted-average/week".to_string(),
        )
    }

    pub fn new_with_base_url(token: String, base_url: String, path: String) -> Self {
        Self {
            token,
            http: reqwest::Client::new(),
            base_url,
            path,
        }
    }

    fn build_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl ForecastFeed for HttpForecastFeed {
    fn source_name(&self) -> &'static str {
        "weol-weighted-average"
    }

    async fn fetch_weekly(&self, product_date: NaiveDate) -> Result<Vec<WeeklyPoint>, FeedError> {
        let url = self.build_url();
        let date_s = product_date.format("%Y-%m-%d").to_string();
        debug!(%url, product_date = %date_s, "feed request");

        let resp = self
            .http
            .get(&url)
            .query(&[("dataProduto", date_s.as_str())])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| FeedError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| FeedError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(FeedError::Http {
                url,
                status: status.as_u16(),
                body: clip_body(&body),
            });
        }

        let records: Vec<WeeklyWeightedAverageRecord> =
            serde_json::from_str(&body).map_err(|e| FeedError::Decode {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let points = parse_weekly(&records)?;
        info!(
            source = self.source_name(),
            product_date = %date_s,
            points = points.len(),
            "feed fetched"
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(sm: &str, v: f64) -> WeeklyWeightedAverageRecord {
        WeeklyWeightedAverageRecord {
            submarket: sm.to_string(),
            week_start: NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
            weighted_average: v,
        }
    }

    #[test]
    fn parse_resolves_mnemonics() {
        let pts = parse_weekly(&[rec("ne", 1.5), rec("SE", 2.0)]).unwrap();
        assert_eq!(pts[0].submarket, SubmarketCode::Ne);
        assert_eq!(pts[1].weighted_average, 2.0);
    }

    #[test]
    fn unknown_submarket_names_the_record() {
        let err = parse_weekly(&[rec("SE", 1.0), rec("XX", 1.0)]).unwrap_err();
        match err {
            FeedError::Registry { record_index, .. } => assert_eq!(record_index, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn url_join_tolerates_slashes() {
        let f = HttpForecastFeed::new_with_base_url(
            "t".into(),
            "http://h/api/v2/".into(),
            "/decks/weol".into(),
        );
        assert_eq!(f.build_url(), "http://h/api/v2/decks/weol");
        assert!(!format!("{f:?}").contains("\"t\""));
    }
}

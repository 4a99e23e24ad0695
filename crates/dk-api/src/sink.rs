//! Persistence sink: normalized rows out as JSON record arrays.
//!
//! The sink does no schema negotiation. [`NormalizedRow::to_record`] emits
//! the full column set per entity; the server expects exactly that.

use std::collections::BTreeMap;
use std::fmt;

use dk_schemas::{Entity, NormalizedRow, SubmarketCode};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{clip_body, SinkError};

pub type Record = Map<String, Value>;

/// Endpoint path (relative to the sink base URL) per entity.
pub fn endpoint_for(entity: Entity) -> &'static str {
    match entity {
        Entity::Sistema => "decks/newave/sistema",
        Entity::Cadic => "decks/newave/cadic",
        Entity::PatamarLoad => "decks/newave/patamar/carga",
        Entity::PatamarExchange => "decks/newave/patamar/intercambio",
    }
}

#[async_trait::async_trait]
pub trait RowSink: Send + Sync {
    /// Post one table's records to the entity's endpoint.
    async fn post_records(&self, entity: Entity, records: &[Record]) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct HttpRowSink {
    token: String,
    http: reqwest::Client,
    base_url: String,
}

impl fmt::Debug for HttpRowSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRowSink")
            .field("base_url", &self.base_url)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl HttpRowSink {
    pub fn new_with_base_url(token: String, base_url: String) -> Self {
        Self {
            token,
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url_for(&self, entity: Entity) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint_for(entity))
    }
}

#[async_trait::async_trait]
impl RowSink for HttpRowSink {
    async fn post_records(&self, entity: Entity, records: &[Record]) -> Result<(), SinkError> {
        let endpoint = self.url_for(entity);
        let resp = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.token)
            .json(records)
            .send()
            .await
            .map_err(|e| SinkError::Transport {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SinkError::Http {
            endpoint,
            status: status.as_u16(),
            body: clip_body(&body),
        })
    }
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

/// One (entity x submarket) table. CADIC has no submarket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId {
    pub entity: Entity,
    pub submarket: Option<SubmarketCode>,
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.submarket {
            Some(sm) => write!(f, "{}/{}", self.entity, sm),
            None => write!(f, "{}", self.entity),
        }
    }
}

/// Result for one table. Tables succeed or fail independently.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOutcome {
    pub table: TableId,
    pub rows: usize,
    pub result: Result<(), SinkError>,
}

impl TableOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Group `rows` by (entity, submarket), post each group, and report each
/// table separately. A failed table does not stop the others.
pub async fn publish_by_table(sink: &dyn RowSink, rows: &[NormalizedRow]) -> Vec<TableOutcome> {
    let mut tables: BTreeMap<TableId, Vec<Record>> = BTreeMap::new();
    for row in rows {
        let id = TableId {
            entity: row.entity,
            submarket: row.submarket,
        };
        tables.entry(id).or_default().push(row.to_record());
    }

    let mut outcomes = Vec::with_capacity(tables.len());
    for (table, records) in tables {
        let result = sink.post_records(table.entity, &records).await;
        match &result {
            Ok(()) => info!(table = %table, rows = records.len(), "table published"),
            Err(e) => warn!(table = %table, rows = records.len(), error = %e, "table publish failed"),
        }
        outcomes.push(TableOutcome {
            table,
            rows: records.len(),
            result,
        });
    }
    outcomes
}

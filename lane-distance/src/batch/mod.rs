//! Batch lane enrichment.
//!
//! Each row is validated, both endpoints are resolved, and the great-circle
//! distance is computed when both succeed. Failures stay on their row; a
//! batch always runs to completion.

mod config;

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info};

use crate::distance::great_circle_miles;
use crate::domain::{EnrichedLane, LaneRecord};
use crate::geocache::GeocodeStore;
use crate::geocoder::Geocoder;
use crate::resolver::Resolver;

pub use config::{BatchConfig, DEFAULT_BATCH_SIZE};

/// Counters for one processed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Rows received
    pub rows: usize,
    /// Rows with a distance
    pub resolved: usize,
    /// Rows with an error, rejected ones included
    pub failed: usize,
    /// Rows rejected before resolution for missing fields
    pub rejected: usize,
    /// Rows where both ends came from the code table
    pub code_lanes: usize,
    /// Calls made to the fallback geocoder, retries included
    pub geocoder_calls: usize,
}

/// Enriched rows in input order, plus counters.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub lanes: Vec<EnrichedLane>,
    pub summary: BatchSummary,
}

/// Outcome of one row.
struct RowResult {
    lane: EnrichedLane,
    rejected: bool,
    geocoder_calls: usize,
}

/// Runs lane rows through the resolver.
pub struct BatchProcessor<G, S> {
    resolver: Arc<Resolver<G, S>>,
    config: BatchConfig,
}

impl<G, S> BatchProcessor<G, S> {
    pub fn new(resolver: Arc<Resolver<G, S>>, config: BatchConfig) -> Self {
        Self { resolver, config }
    }

    pub fn resolver(&self) -> &Resolver<G, S> {
        &self.resolver
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

impl<G: Geocoder, S: GeocodeStore> BatchProcessor<G, S> {
    /// Enrich every row. Output order matches input order.
    pub async fn process(&self, records: Vec<LaneRecord>) -> BatchOutput {
        let mut summary = BatchSummary {
            rows: records.len(),
            ..BatchSummary::default()
        };
        let mut lanes = Vec::with_capacity(records.len());

        // Rows in a chunk run concurrently; the geocoder's rate limiter
        // still spaces the calls that reach it.
        let batch_size = self.config.batch_size.max(1);
        let mut records = records.into_iter().enumerate().peekable();
        while records.peek().is_some() {
            let chunk: Vec<_> = records.by_ref().take(batch_size).collect();
            let futures: Vec<_> = chunk
                .into_iter()
                .map(|(row, record)| self.process_row(row, record))
                .collect();

            for result in join_all(futures).await {
                summary.geocoder_calls += result.geocoder_calls;
                if result.rejected {
                    summary.rejected += 1;
                }
                if result.lane.is_ok() {
                    summary.resolved += 1;
                    if result.lane.used_code() {
                        summary.code_lanes += 1;
                    }
                } else {
                    summary.failed += 1;
                }
                lanes.push(result.lane);
            }
        }

        info!(
            rows = summary.rows,
            resolved = summary.resolved,
            failed = summary.failed,
            rejected = summary.rejected,
            code_lanes = summary.code_lanes,
            geocoder_calls = summary.geocoder_calls,
            "Batch complete"
        );

        BatchOutput { lanes, summary }
    }

    async fn process_row(&self, row: usize, record: LaneRecord) -> RowResult {
        let missing = record.missing_fields();
        if !missing.is_empty() {
            debug!(row, missing = ?missing, "Rejecting lane row");
            let message = format!("missing {}", missing.join(", "));
            return RowResult {
                lane: EnrichedLane::failed(record, None, message),
                rejected: true,
                geocoder_calls: 0,
            };
        }

        let origin_place = record.origin.clone().unwrap_or_default();
        let destination_place = record.destination.clone().unwrap_or_default();

        let origin = self
            .resolver
            .resolve_place_counted(&origin_place, record.origin_code.as_deref())
            .await;
        let mut geocoder_calls = origin.geocoder_calls;

        let origin = match origin.result {
            Ok(resolution) => resolution,
            Err(e) => {
                debug!(row, origin = %origin_place, error = %e, "Origin unresolved");
                return RowResult {
                    lane: EnrichedLane::failed(record, None, format!("origin: {e}")),
                    rejected: false,
                    geocoder_calls,
                };
            }
        };

        let destination = self
            .resolver
            .resolve_place_counted(&destination_place, record.destination_code.as_deref())
            .await;
        geocoder_calls += destination.geocoder_calls;

        let destination = match destination.result {
            Ok(resolution) => resolution,
            Err(e) => {
                debug!(row, destination = %destination_place, error = %e, "Destination unresolved");
                return RowResult {
                    lane: EnrichedLane::failed(record, Some(origin), format!("destination: {e}")),
                    rejected: false,
                    geocoder_calls,
                };
            }
        };

        let miles = great_circle_miles(origin.coordinates, destination.coordinates);
        debug!(row, miles, "Lane resolved");

        RowResult {
            lane: EnrichedLane::resolved(record, origin, destination, miles),
            rejected: false,
            geocoder_calls,
        }
    }
}

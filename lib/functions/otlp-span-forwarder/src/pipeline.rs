//! One invocation's worth of work: decompress, unpack, transform, group,
//! encode, deliver.
//!
//! Per-record problems are counted and logged here and never stop the run.
//! Only a failed delivery is returned to the caller.

use serde::Serialize;
use tracing::instrument;

use crate::app_state::AppState;
use crate::batch::unpack_batch;
use crate::config::{DEFAULT_COMPRESSION_LEVEL, ExportCompression};
use crate::envelope::{TransportRecord, decompress_records};
use crate::error::{DeliveryError, TransformError};
use crate::processing::export;
use crate::resource::{ResourceAggregator, ResourceGroup};
use crate::span::transform;
use crate::telemetry::TelemetryData;

/// Counters for one run. Logged, never used for control flow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub undecodable_records: usize,
    pub undecodable_batches: usize,
    pub control_batches: usize,
    pub invalid_spans: usize,
    pub valid_spans: usize,
    pub resource_groups: usize,
    pub response_status: Option<u16>,
}

/// Output of the synchronous part of a run.
#[derive(Debug, Default)]
pub struct Collected {
    pub groups: Vec<ResourceGroup>,
    pub summary: RunSummary,
}

/// Decodes and converts every record. Never fails.
pub fn collect_spans(records: &[TransportRecord]) -> Collected {
    let mut summary = RunSummary {
        records: records.len(),
        ..Default::default()
    };

    let decompressed = decompress_records(records);
    summary.undecodable_records = decompressed.failed;

    let mut aggregator = ResourceAggregator::new();

    for text in &decompressed.batches {
        let batch = match unpack_batch(text) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!("Could not decode log batch: {}", e);
                summary.undecodable_batches += 1;
                continue;
            }
        };

        if batch.is_control_message() {
            tracing::debug!("Skipping CloudWatch Logs control message");
            summary.control_batches += 1;
            continue;
        }

        for message in batch.messages() {
            match transform(message) {
                Ok((resource, span)) => aggregator.push(resource, span),
                Err(e) => {
                    summary.invalid_spans += 1;
                    log_transform_error(&e);
                }
            }
        }
    }

    if aggregator.is_empty() && !decompressed.batches.is_empty() {
        tracing::debug!(
            "No span lines in {} decoded batches",
            decompressed.batches.len()
        );
    }

    summary.valid_spans = aggregator.span_count();
    summary.resource_groups = aggregator.len();

    Collected {
        groups: aggregator.into_groups(),
        summary,
    }
}

fn log_transform_error(error: &TransformError) {
    match error {
        // Runtime START/END/REPORT lines and other plain output.
        TransformError::NotJson { .. } => {
            tracing::debug!("Skipping non-JSON log line: {}", error.message());
        }
        _ => {
            tracing::warn!(
                "Got valid JSON but could not convert it to OTel tracing format: {}. Original message: {}",
                error,
                error.message()
            );
        }
    }
}

/// Runs the whole pipeline for one invocation.
///
/// A run without spans sends nothing. Otherwise every group goes out in a
/// single request.
#[instrument(skip_all, fields(records = records.len()))]
pub async fn run(
    records: &[TransportRecord],
    state: &AppState,
) -> Result<RunSummary, DeliveryError> {
    let Collected { groups, mut summary } = collect_spans(records);

    tracing::info!(
        "Found {} valid spans and {} invalid spans.",
        summary.valid_spans,
        summary.invalid_spans
    );

    if groups.is_empty() {
        tracing::info!("No valid spans to export");
        log_summary(&summary);
        return Ok(summary);
    }

    let mut telemetry = TelemetryData::from_groups(groups);
    if state.config.compression == ExportCompression::Gzip {
        telemetry
            .compress(DEFAULT_COMPRESSION_LEVEL)
            .map_err(DeliveryError::Compression)?;
    }

    let status = export(
        &state.http_client,
        state.config.endpoint.as_str(),
        &state.config.key_header,
        &state.api_key,
        &telemetry,
    )
    .await?;

    summary.response_status = Some(status);
    log_summary(&summary);
    Ok(summary)
}

fn log_summary(summary: &RunSummary) {
    tracing::info!(
        records = summary.records,
        undecodable_records = summary.undecodable_records,
        undecodable_batches = summary.undecodable_batches,
        control_batches = summary.control_batches,
        invalid_spans = summary.invalid_spans,
        valid_spans = summary.valid_spans,
        resource_groups = summary.resource_groups,
        response_status = summary.response_status,
        "Run complete"
    );
}

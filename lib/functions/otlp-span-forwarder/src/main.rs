//! AWS Lambda function that forwards spans printed by the OpenTelemetry console
//! exporter to an OTLP/HTTP backend.
//!
//! This Lambda function:
//! 1. Receives Kinesis records carrying CloudWatch Logs subscription batches
//! 2. Decodes and decompresses each batch
//! 3. Converts every span line into an OTLP span, grouped by service
//! 4. Sends everything in one protobuf request to the backend

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use otlp_span_forwarder::{AppState, TransportEvent, pipeline};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

async fn function_handler(
    event: LambdaEvent<TransportEvent>,
    state: Arc<AppState>,
) -> Result<(), LambdaError> {
    tracing::debug!("Function handler started");

    let records = event.payload.records;
    tracing::info!("Received {} records", records.len());

    if let Err(e) = pipeline::run(&records, &state).await {
        tracing::error!("Failed to export spans: {}", e);
        return Err(e.into());
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    init_tracing();

    // Initialize shared application state
    let state = Arc::new(AppState::new().await?);

    lambda_runtime::run(service_fn(|event| {
        let state = Arc::clone(&state);
        async move { function_handler(event, state).await }
    }))
    .await
}

use reqwest::{Client as ReqwestClient, header::HeaderMap};
use tracing::instrument;

use crate::error::DeliveryError;
use crate::headers::ExportHeaders;
use crate::telemetry::TelemetryData;

/// Sends one encoded export request to the collector endpoint.
///
/// Any non-2xx response is an error; nothing is retried here.
#[instrument(skip_all, fields(
    otel.status_code,
    http.method = "POST",
    http.url = %endpoint,
    http.status_code,
    error,
    error.kind,
))]
pub async fn send_telemetry(
    client: &ReqwestClient,
    endpoint: &str,
    telemetry: &TelemetryData,
    headers: HeaderMap,
) -> Result<u16, DeliveryError> {
    let current_span = tracing::Span::current();

    tracing::debug!(
        name = "sending telemetry request",
        bytes = telemetry.payload.len(),
        spans = telemetry.span_count,
        "Request details"
    );

    let response = match client
        .post(endpoint)
        .headers(headers)
        .body(telemetry.payload.clone())
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            current_span.record("otel.status_code", "ERROR");
            current_span.record("error", true);
            current_span.record(
                "error.kind",
                if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection_failed"
                } else if e.is_request() {
                    "request_failed"
                } else {
                    "network_error"
                },
            );

            tracing::warn!(
                name = "error sending telemetry request",
                endpoint = %endpoint,
                error = %e,
                is_timeout = e.is_timeout(),
                is_connect = e.is_connect(),
                "Failed to send telemetry"
            );

            return Err(DeliveryError::Transport(e));
        }
    };

    let status = response.status();
    current_span.record("http.status_code", status.as_u16());

    if !status.is_success() {
        current_span.record("otel.status_code", "ERROR");
        let error_body = match response.text().await {
            Ok(text) => text,
            Err(_) => "Could not read response body".to_string(),
        };
        tracing::warn!(
            name = "error posting telemetry data",
            endpoint = %endpoint,
            status = status.as_u16(),
            status_text = %status.canonical_reason().unwrap_or("Unknown status"),
            error = %error_body,
        );

        return Err(DeliveryError::Status {
            status: status.as_u16(),
            body: error_body,
        });
    }

    tracing::info!("Collector response code: {}", status.as_u16());
    Ok(status.as_u16())
}

/// Builds the headers for an export and posts it.
pub async fn export(
    client: &ReqwestClient,
    endpoint: &str,
    key_header: &str,
    api_key: &str,
    telemetry: &TelemetryData,
) -> Result<u16, DeliveryError> {
    let headers = ExportHeaders::new()
        .with_telemetry(telemetry)?
        .with_api_key(key_header, api_key)?
        .build();

    send_telemetry(client, endpoint, telemetry, headers).await
}

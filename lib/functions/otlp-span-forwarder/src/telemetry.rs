//! Encoding of one run's resource groups into an OTLP export request.
//!
//! Each group becomes one `ResourceSpans` entry holding a single scope-less
//! `ScopeSpans`. The request is serialized as binary protobuf and optionally
//! gzip-compressed before delivery.

use flate2::{Compression, write::GzEncoder};
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::resource::v1::Resource as ProtoResource;
use opentelemetry_proto::tonic::trace::v1::span::{Event as ProtoEvent, Link as ProtoLink};
use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span, Status};
use prost::Message;
use std::io::Write;

use crate::attributes::to_proto;
use crate::resource::{Resource, ResourceGroup};
use crate::span::{CanonicalEvent, CanonicalLink, CanonicalSpan, HexId};

pub const PROTOBUF_CONTENT_TYPE: &str = "application/protobuf";
pub const GZIP_ENCODING: &str = "gzip";

/// Encoded export request, ready to be posted.
#[derive(Clone, Debug)]
pub struct TelemetryData {
    /// The actual payload bytes
    pub payload: Vec<u8>,
    /// Content type of the payload
    pub content_type: String,
    /// Optional content encoding (e.g., gzip)
    pub content_encoding: Option<String>,
    /// Number of resource groups in the request
    pub group_count: usize,
    /// Number of spans in the request
    pub span_count: usize,
}

impl Default for TelemetryData {
    fn default() -> Self {
        Self {
            payload: Vec::new(),
            content_type: PROTOBUF_CONTENT_TYPE.to_string(),
            content_encoding: None,
            group_count: 0,
            span_count: 0,
        }
    }
}

impl TelemetryData {
    /// Encodes the groups of one run as a single binary protobuf request.
    pub fn from_groups(groups: Vec<ResourceGroup>) -> Self {
        let group_count = groups.len();
        let span_count = groups.iter().map(|group| group.spans.len()).sum();

        let request = build_export_request(groups);
        let payload = request.encode_to_vec();

        tracing::debug!(
            "Encoded {} spans in {} resource groups ({} bytes)",
            span_count,
            group_count,
            payload.len()
        );

        Self {
            payload,
            group_count,
            span_count,
            ..Default::default()
        }
    }

    /// Applies gzip compression to the payload
    pub fn compress(&mut self, compression_level: u32) -> std::io::Result<()> {
        // Only compress if not already compressed
        if self.content_encoding.as_deref() != Some(GZIP_ENCODING) {
            let original_len = self.payload.len();

            let mut encoder = GzEncoder::new(Vec::new(), Compression::new(compression_level));
            encoder.write_all(&self.payload)?;
            self.payload = encoder.finish()?;
            self.content_encoding = Some(GZIP_ENCODING.to_string());

            tracing::debug!(
                "Compressed payload from {} to {} bytes",
                original_len,
                self.payload.len()
            );
        }

        Ok(())
    }
}

/// Builds `resourceSpans[] -> scopeSpans[] -> spans[]`, one resource block
/// per group with a single scope block that carries no scope identity.
pub fn build_export_request(groups: Vec<ResourceGroup>) -> ExportTraceServiceRequest {
    ExportTraceServiceRequest {
        resource_spans: groups.into_iter().map(resource_spans).collect(),
    }
}

fn resource_spans(group: ResourceGroup) -> ResourceSpans {
    ResourceSpans {
        resource: Some(group.resource.into()),
        scope_spans: vec![ScopeSpans {
            spans: group.spans.into_iter().map(Span::from).collect(),
            ..Default::default()
        }],
        ..Default::default()
    }
}

impl From<Resource> for ProtoResource {
    fn from(resource: Resource) -> Self {
        ProtoResource {
            attributes: to_proto(resource.attributes),
            ..Default::default()
        }
    }
}

impl From<CanonicalSpan> for Span {
    fn from(span: CanonicalSpan) -> Self {
        Span {
            trace_id: span.trace_id.into_bytes(),
            span_id: span.span_id.into_bytes(),
            trace_state: span.trace_state.unwrap_or_default(),
            parent_span_id: span
                .parent_span_id
                .map(HexId::into_bytes)
                .unwrap_or_default(),
            name: span.name,
            kind: span.kind as i32,
            start_time_unix_nano: span.start_time_unix_nano,
            end_time_unix_nano: span.end_time_unix_nano,
            attributes: to_proto(span.attributes),
            dropped_attributes_count: span.dropped_attributes_count,
            events: span.events.into_iter().map(ProtoEvent::from).collect(),
            dropped_events_count: span.dropped_events_count,
            links: span.links.into_iter().map(ProtoLink::from).collect(),
            dropped_links_count: span.dropped_links_count,
            status: Some(Status {
                code: span.status.code as i32,
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl From<CanonicalEvent> for ProtoEvent {
    fn from(event: CanonicalEvent) -> Self {
        ProtoEvent {
            time_unix_nano: event.time_unix_nano,
            name: event.name,
            attributes: to_proto(event.attributes),
            dropped_attributes_count: event.dropped_attributes_count,
            ..Default::default()
        }
    }
}

impl From<CanonicalLink> for ProtoLink {
    fn from(link: CanonicalLink) -> Self {
        ProtoLink {
            trace_id: link.trace_id.into_bytes(),
            span_id: link.span_id.into_bytes(),
            trace_state: link.trace_state.unwrap_or_default(),
            attributes: to_proto(link.attributes),
            dropped_attributes_count: link.dropped_attributes_count,
            ..Default::default()
        }
    }
}

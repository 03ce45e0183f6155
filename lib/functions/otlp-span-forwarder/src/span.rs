//! Conversion of instrumentation-library span lines into OTLP spans.
//!
//! The OpenTelemetry Python console exporter writes one JSON object per span:
//!
//! ```json
//! {
//!     "name": "resize",
//!     "context": { "trace_id": "0x5b8aa5a2d2c872e8321cf37308d69df2", "span_id": "0x051581bf3cb55c13", "trace_state": "[]" },
//!     "kind": "SpanKind.INTERNAL",
//!     "parent_id": null,
//!     "start_time": "2022-06-05T18:11:50.887123Z",
//!     "end_time": "2022-06-05T18:11:51.013373Z",
//!     "status": { "status_code": "UNSET" },
//!     "attributes": { "image.width": 640 },
//!     "events": [],
//!     "links": [],
//!     "resource": { "service.name": "thumbnail" }
//! }
//! ```
//!
//! Each entity (span, event, link) goes through a projection function that
//! builds the canonical form from the recognized fields only. Anything else in
//! the input is dropped and never reaches the wire.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use opentelemetry_proto::tonic::trace::v1::{span::SpanKind, status::StatusCode};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::attributes::{KeyValue, coerce_attributes};
use crate::error::TransformError;
use crate::resource::Resource;

const TRACE_ID_LEN: usize = 16;
const SPAN_ID_LEN: usize = 8;

/// Length of the `SpanKind.` prefix the Python SDK puts on kind names.
const SPAN_KIND_PREFIX_LEN: usize = 9;

#[derive(Debug, Deserialize)]
pub struct RawSpanRecord {
    pub name: String,
    pub context: RawSpanContext,
    pub kind: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub status: RawStatus,
    pub attributes: Map<String, Value>,
    pub events: Vec<RawEvent>,
    pub links: Vec<RawLink>,
    pub resource: Map<String, Value>,
    #[serde(default, rename = "traceState")]
    pub trace_state: Option<String>,
    #[serde(default, rename = "droppedAttributesCount")]
    pub dropped_attributes_count: Option<u32>,
    #[serde(default, rename = "droppedEventsCount")]
    pub dropped_events_count: Option<u32>,
    #[serde(default, rename = "droppedLinksCount")]
    pub dropped_links_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RawSpanContext {
    pub trace_id: String,
    pub span_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RawStatus {
    pub status_code: String,
}

#[derive(Debug, Deserialize)]
pub struct RawEvent {
    pub name: String,
    pub timestamp: String,
    pub attributes: Map<String, Value>,
    #[serde(default, rename = "droppedAttributesCount")]
    pub dropped_attributes_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RawLink {
    pub context: RawSpanContext,
    pub attributes: Map<String, Value>,
    #[serde(default, rename = "traceState")]
    pub trace_state: Option<String>,
    #[serde(default, rename = "droppedAttributesCount")]
    pub dropped_attributes_count: Option<u32>,
}

/// A trace or span id decoded from its hex form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexId(Vec<u8>);

impl HexId {
    /// Parses hex digits with an optional `0x` prefix into exactly `len` bytes.
    pub fn parse(text: &str, len: usize) -> Result<Self, String> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        let bytes = hex::decode(digits).map_err(|e| e.to_string())?;
        if bytes.len() != len {
            return Err(format!("expected {} bytes, got {}", len, bytes.len()));
        }
        Ok(Self(bytes))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for HexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl Serialize for HexId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalSpan {
    #[serde(rename = "trace_id")]
    pub trace_id: HexId,
    #[serde(rename = "span_id")]
    pub span_id: HexId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<HexId>,
    pub name: String,
    #[serde(serialize_with = "serialize_span_kind")]
    pub kind: SpanKind,
    pub start_time_unix_nano: u64,
    pub end_time_unix_nano: u64,
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
    pub events: Vec<CanonicalEvent>,
    pub dropped_events_count: u32,
    pub links: Vec<CanonicalLink>,
    pub dropped_links_count: u32,
    pub status: CanonicalStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    pub name: String,
    pub time_unix_nano: u64,
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalLink {
    #[serde(rename = "trace_id")]
    pub trace_id: HexId,
    #[serde(rename = "span_id")]
    pub span_id: HexId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_state: Option<String>,
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CanonicalStatus {
    #[serde(serialize_with = "serialize_status_code")]
    pub code: StatusCode,
}

fn serialize_span_kind<S: Serializer>(kind: &SpanKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.as_str_name())
}

fn serialize_status_code<S: Serializer>(
    code: &StatusCode,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(code.as_str_name())
}

/// `"SpanKind.CLIENT"` -> `"SPAN_KIND_CLIENT"`. The prefix is dropped by
/// length, not matched.
pub fn span_kind_name(kind: &str) -> String {
    format!(
        "SPAN_KIND_{}",
        kind.get(SPAN_KIND_PREFIX_LEN..).unwrap_or_default()
    )
}

/// `"OK"` -> `"STATUS_CODE_OK"`.
pub fn status_code_name(status_code: &str) -> String {
    format!("STATUS_CODE_{}", status_code)
}

/// Converts an ISO 8601 timestamp to nanoseconds since the Unix epoch.
///
/// Accepts the extended and basic calendar forms, reduced time precision
/// (hours or minutes only), a `.` or `,` decimal mark and `Z`, `±HH`,
/// `±HHMM` or `±HH:MM` offsets. Date-only and offset-less timestamps are read
/// as UTC. The result is `floor(seconds * 1e9)` computed in integer
/// arithmetic.
pub fn iso8601_to_unix_nanos(text: &str) -> Result<u64, String> {
    let utc = parse_iso8601(text.trim())
        .ok_or_else(|| format!("{:?} is not an ISO 8601 timestamp", text))?;

    let nanos = utc
        .timestamp_nanos_opt()
        .ok_or_else(|| format!("{:?} is out of range", text))?;
    u64::try_from(nanos).map_err(|_| format!("{:?} is before the Unix epoch", text))
}

const TIME_FORMATS: [&str; 4] = ["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"];

fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    let (date, time) = match text.find(['T', 't', ' ']) {
        Some(position) => (&text[..position], Some(&text[position + 1..])),
        None => (text, None),
    };

    let date = parse_date(date)?;
    let Some(time) = time else {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    };

    let (time, offset) = split_offset(time)?;
    let local = date.and_time(parse_time(time)?);
    let local = offset.from_local_datetime(&local).single()?;
    Some(local.with_timezone(&Utc))
}

/// `YYYY-MM-DD`, `YYYYMMDD`, `YYYY-MM` or `YYYY`.
fn parse_date(text: &str) -> Option<NaiveDate> {
    match text.len() {
        4 => NaiveDate::parse_from_str(&format!("{}-01-01", text), "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d").ok(),
        8 => NaiveDate::parse_from_str(text, "%Y%m%d").ok(),
        10 => NaiveDate::parse_from_str(text, "%Y-%m-%d").ok(),
        _ => None,
    }
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.replacen(',', ".", 1);
    if text.len() == 2 {
        return NaiveTime::from_hms_opt(two_digits(&text)?, 0, 0);
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&text, format).ok())
}

/// Splits a trailing UTC offset off the time part. No offset means UTC.
fn split_offset(time: &str) -> Option<(&str, FixedOffset)> {
    if let Some(local) = time.strip_suffix(['Z', 'z']) {
        return Some((local, FixedOffset::east_opt(0)?));
    }
    let Some(position) = time.rfind(['+', '-']) else {
        return Some((time, FixedOffset::east_opt(0)?));
    };

    let (local, offset) = time.split_at(position);
    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let offset = &offset[1..];
    if !offset.is_ascii() {
        return None;
    }
    let (hours, minutes) = match offset.len() {
        2 => (offset, "00"),
        4 => offset.split_at(2),
        5 if offset.as_bytes()[2] == b':' => (&offset[..2], &offset[3..]),
        _ => return None,
    };

    let hours = two_digits(hours).filter(|h| *h < 24)?;
    let minutes = two_digits(minutes).filter(|m| *m < 60)?;
    let seconds = i32::try_from(hours * 3600 + minutes * 60).ok()?;
    Some((local, FixedOffset::east_opt(sign * seconds)?))
}

fn two_digits(text: &str) -> Option<u32> {
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Resource attributes come either flat or, from newer SDKs, nested under
/// `attributes` next to a `schema_url`.
fn resource_attributes(resource: &Map<String, Value>) -> &Map<String, Value> {
    match resource.get("attributes") {
        Some(Value::Object(nested)) => nested,
        _ => resource,
    }
}

/// Parses a log line and converts it into its resource and canonical span.
pub fn transform(message: &str) -> Result<(Resource, CanonicalSpan), TransformError> {
    let value: Value = serde_json::from_str(message).map_err(|e| TransformError::NotJson {
        message: message.to_string(),
        reason: e.to_string(),
    })?;

    let raw: RawSpanRecord =
        serde_json::from_value(value).map_err(|e| TransformError::NotSpan {
            message: message.to_string(),
            reason: e.to_string(),
        })?;

    project_span(raw, message)
}

/// Builds the canonical span from the recognized fields of a raw record.
pub fn project_span(
    raw: RawSpanRecord,
    message: &str,
) -> Result<(Resource, CanonicalSpan), TransformError> {
    let invalid = |field: &'static str, reason: String| TransformError::InvalidField {
        message: message.to_string(),
        field,
        reason,
    };

    let resource = Resource {
        attributes: coerce_attributes(resource_attributes(&raw.resource)),
    };

    let trace_id = HexId::parse(&raw.context.trace_id, TRACE_ID_LEN)
        .map_err(|e| invalid("context.trace_id", e))?;
    let span_id = HexId::parse(&raw.context.span_id, SPAN_ID_LEN)
        .map_err(|e| invalid("context.span_id", e))?;
    let parent_span_id = raw
        .parent_id
        .as_deref()
        .map(|id| HexId::parse(id, SPAN_ID_LEN))
        .transpose()
        .map_err(|e| invalid("parent_id", e))?;

    let kind_name = span_kind_name(&raw.kind);
    let kind = SpanKind::from_str_name(&kind_name)
        .ok_or_else(|| invalid("kind", format!("unknown span kind {:?}", raw.kind)))?;

    let code_name = status_code_name(&raw.status.status_code);
    let code = StatusCode::from_str_name(&code_name).ok_or_else(|| {
        invalid(
            "status.status_code",
            format!("unknown status code {:?}", raw.status.status_code),
        )
    })?;

    let start_time_unix_nano =
        iso8601_to_unix_nanos(&raw.start_time).map_err(|e| invalid("start_time", e))?;
    let end_time_unix_nano =
        iso8601_to_unix_nanos(&raw.end_time).map_err(|e| invalid("end_time", e))?;

    let events = raw
        .events
        .into_iter()
        .map(|event| project_event(event).map_err(|e| invalid("events", e)))
        .collect::<Result<Vec<_>, _>>()?;

    let links = raw
        .links
        .into_iter()
        .map(|link| project_link(link).map_err(|e| invalid("links", e)))
        .collect::<Result<Vec<_>, _>>()?;

    let span = CanonicalSpan {
        trace_id,
        span_id,
        trace_state: raw.trace_state,
        parent_span_id,
        name: raw.name,
        kind,
        start_time_unix_nano,
        end_time_unix_nano,
        attributes: coerce_attributes(&raw.attributes),
        dropped_attributes_count: raw.dropped_attributes_count.unwrap_or_default(),
        events,
        dropped_events_count: raw.dropped_events_count.unwrap_or_default(),
        links,
        dropped_links_count: raw.dropped_links_count.unwrap_or_default(),
        status: CanonicalStatus { code },
    };

    Ok((resource, span))
}

/// Keeps `name`, `timeUnixNano`, `attributes` and `droppedAttributesCount`.
pub fn project_event(raw: RawEvent) -> Result<CanonicalEvent, String> {
    Ok(CanonicalEvent {
        time_unix_nano: iso8601_to_unix_nanos(&raw.timestamp)?,
        name: raw.name,
        attributes: coerce_attributes(&raw.attributes),
        dropped_attributes_count: raw.dropped_attributes_count.unwrap_or_default(),
    })
}

/// Keeps `trace_id`, `span_id`, `traceState`, `attributes` and
/// `droppedAttributesCount`. The ids are lifted out of the link's context.
pub fn project_link(raw: RawLink) -> Result<CanonicalLink, String> {
    Ok(CanonicalLink {
        trace_id: HexId::parse(&raw.context.trace_id, TRACE_ID_LEN)?,
        span_id: HexId::parse(&raw.context.span_id, SPAN_ID_LEN)?,
        trace_state: raw.trace_state,
        attributes: coerce_attributes(&raw.attributes),
        dropped_attributes_count: raw.dropped_attributes_count.unwrap_or_default(),
    })
}


#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use super::*;
    use crate::attributes::AttributeValue;
    use chrono::SecondsFormat;
    use serde_json::json;

    fn transform_value(value: Value) -> Result<(Resource, CanonicalSpan), TransformError> {
        transform(&value.to_string())
    }

    #[test]
    fn test_transform_span() {
        let (resource, span) = transform_value(span_json("resize", Some("thumbnail"))).unwrap();

        assert_eq!(span.name, "resize");
        assert_eq!(span.trace_id.to_string(), "5b8aa5a2d2c872e8321cf37308d69df2");
        assert_eq!(span.span_id.to_string(), "051581bf3cb55c13");
        assert_eq!(
            span.parent_span_id.as_ref().map(ToString::to_string).as_deref(),
            Some("5fb397be34d26b51")
        );
        assert_eq!(span.kind, SpanKind::Internal);
        assert_eq!(span.status.code, StatusCode::Unset);
        assert_eq!(span.start_time_unix_nano, 1_654_452_710_887_123_000);
        assert_eq!(span.end_time_unix_nano, 1_654_452_711_013_373_000);
        assert_eq!(span.attributes[0].value, AttributeValue::IntValue(640));
        assert_eq!(span.attributes[1].value, AttributeValue::BoolValue(true));
        assert_eq!(span.events.len(), 1);
        assert_eq!(span.events[0].time_unix_nano, 1_654_452_711_000_001_000);
        assert_eq!(span.events[0].attributes[0].value, AttributeValue::DoubleValue(0.5));

        assert_eq!(resource.attributes[1].key, "service.name");
        assert_eq!(resource.service_name(), "thumbnail");
    }

    #[test]
    fn test_span_kind_rewrite() {
        assert_eq!(span_kind_name("SpanKind.CLIENT"), "SPAN_KIND_CLIENT");
        assert_eq!(span_kind_name("SpanKind.INTERNAL"), "SPAN_KIND_INTERNAL");

        let mut value = span_json("call", None);
        value["kind"] = json!("SpanKind.CLIENT");
        let (_, span) = transform_value(value).unwrap();
        assert_eq!(span.kind, SpanKind::Client);
        assert_eq!(serde_json::to_value(&span).unwrap()["kind"], "SPAN_KIND_CLIENT");
    }

    #[test]
    fn test_unknown_span_kind() {
        let mut value = span_json("call", None);
        value["kind"] = json!("SpanKind.SIDEWAYS");
        let err = transform_value(value).unwrap_err();
        assert!(matches!(err, TransformError::InvalidField { field: "kind", .. }));
    }

    #[test]
    fn test_status_rewrite_drops_description() {
        let mut value = span_json("call", None);
        value["status"] = json!({ "status_code": "OK", "description": "all good" });
        let (_, span) = transform_value(value).unwrap();
        assert_eq!(span.status.code, StatusCode::Ok);
        assert_eq!(
            serde_json::to_value(span.status).unwrap(),
            json!({ "code": "STATUS_CODE_OK" })
        );
    }

    #[test]
    fn test_root_span_has_no_parent() {
        let mut value = span_json("root", None);
        value["parent_id"] = Value::Null;
        let (_, span) = transform_value(value).unwrap();
        assert!(span.parent_span_id.is_none());
    }

    #[test]
    fn test_links_are_hoisted_and_projected() {
        let mut value = span_json("linked", None);
        value["links"] = json!([{
            "context": {
                "trace_id": "0x00000000000000000000000000000001",
                "span_id": "0x0000000000000002",
                "trace_state": "[]"
            },
            "attributes": { "link.kind": "follows" },
            "unexpected": "dropped"
        }]);

        let (_, span) = transform_value(value).unwrap();
        let link = serde_json::to_value(&span.links[0]).unwrap();
        assert_eq!(
            link,
            json!({
                "trace_id": "00000000000000000000000000000001",
                "span_id": "0000000000000002",
                "attributes": [{ "key": "link.kind", "value": { "stringValue": "follows" } }],
                "droppedAttributesCount": 0
            })
        );
    }

    #[test]
    fn test_event_unknown_fields_dropped() {
        let mut value = span_json("evented", None);
        value["events"][0]["severity"] = json!("high");
        let (_, span) = transform_value(value).unwrap();
        let event = serde_json::to_value(&span.events[0]).unwrap();
        let keys: Vec<_> = event.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["name", "timeUnixNano", "attributes", "droppedAttributesCount"]
        );
    }

    #[test]
    fn test_unknown_top_level_fields_dropped() {
        let mut value = span_json("resize", Some("thumbnail"));
        value["some_future_field"] = json!({ "nested": 1 });
        value["traceState"] = json!("vendor=1");

        let (_, span) = transform_value(value).unwrap();
        let exported = serde_json::to_value(&span).unwrap();
        let allowed = [
            "trace_id",
            "span_id",
            "traceState",
            "parentSpanId",
            "name",
            "kind",
            "startTimeUnixNano",
            "endTimeUnixNano",
            "attributes",
            "droppedAttributesCount",
            "events",
            "droppedEventsCount",
            "links",
            "droppedLinksCount",
            "status",
        ];
        for key in exported.as_object().unwrap().keys() {
            assert!(allowed.contains(&key.as_str()), "unexpected key {}", key);
        }
        assert!(exported.get("some_future_field").is_none());
        assert!(exported.get("resource").is_none());
        assert!(exported.get("context").is_none());
        assert_eq!(exported["traceState"], "vendor=1");
    }

    #[test]
    fn test_not_json() {
        let err = transform("START RequestId: c9a31149 Version: $LATEST").unwrap_err();
        assert!(matches!(err, TransformError::NotJson { .. }));
        assert_eq!(err.message(), "START RequestId: c9a31149 Version: $LATEST");
    }

    #[test]
    fn test_json_but_not_span() {
        let err = transform(r#"{"level": "info", "msg": "resizing"}"#).unwrap_err();
        assert!(matches!(err, TransformError::NotSpan { .. }));

        let err = transform("42").unwrap_err();
        assert!(matches!(err, TransformError::NotSpan { .. }));
    }

    #[test]
    fn test_missing_required_field() {
        let mut value = span_json("resize", None);
        value.as_object_mut().unwrap().remove("start_time");
        let err = transform_value(value).unwrap_err();
        assert!(matches!(err, TransformError::NotSpan { .. }));
    }

    #[test]
    fn test_invalid_trace_id() {
        let mut value = span_json("resize", None);
        value["context"]["trace_id"] = json!("0xnothex");
        let err = transform_value(value).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidField { field: "context.trace_id", .. }
        ));
    }

    #[test]
    fn test_invalid_event_timestamp_drops_span() {
        let mut value = span_json("resize", None);
        value["events"][0]["timestamp"] = json!("half past six");
        let err = transform_value(value).unwrap_err();
        assert!(matches!(err, TransformError::InvalidField { field: "events", .. }));
    }

    #[test]
    fn test_invalid_link_id_drops_span() {
        let mut value = span_json("linked", None);
        value["links"] = json!([{
            "context": {
                "trace_id": "0x00000000000000000000000000000001",
                "span_id": "0x02"
            },
            "attributes": {}
        }]);
        let err = transform_value(value).unwrap_err();
        assert!(matches!(err, TransformError::InvalidField { field: "links", .. }));
    }

    #[test]
    fn test_nested_resource_attributes() {
        let mut value = span_json("resize", None);
        value["resource"] = json!({
            "attributes": { "service.name": "nested-svc" },
            "schema_url": ""
        });
        let (resource, _) = transform_value(value).unwrap();
        assert_eq!(resource.service_name(), "nested-svc");
        assert_eq!(resource.attributes.len(), 1);
    }

    #[test]
    fn test_timestamp_conversion() {
        assert_eq!(iso8601_to_unix_nanos("1970-01-01T00:00:00Z").unwrap(), 0);
        assert_eq!(
            iso8601_to_unix_nanos("2022-06-05T18:11:50.887123Z").unwrap(),
            1_654_452_710_887_123_000
        );
        // Offsets resolve to the same instant in UTC.
        assert_eq!(
            iso8601_to_unix_nanos("2022-06-05T20:11:50.887123+02:00").unwrap(),
            1_654_452_710_887_123_000
        );
        assert_eq!(
            iso8601_to_unix_nanos("2022-06-05T20:11:50.887123+0200").unwrap(),
            1_654_452_710_887_123_000
        );
        // No offset is read as UTC.
        assert_eq!(
            iso8601_to_unix_nanos("2022-06-05T18:11:50.887123").unwrap(),
            1_654_452_710_887_123_000
        );
        assert!(iso8601_to_unix_nanos("yesterday").is_err());
        assert!(iso8601_to_unix_nanos("1969-12-31T23:59:59Z").is_err());
    }

    #[test]
    fn test_timestamp_iso8601_forms() {
        let cases = [
            ("2022-06-05T18:11:50,887123Z", 1_654_452_710_887_123_000),
            ("2022-06-05T20:11:50.887123+02", 1_654_452_710_887_123_000),
            ("2022-06-05T15:11:50.887123-03:00", 1_654_452_710_887_123_000),
            ("20220605T181150.887123Z", 1_654_452_710_887_123_000),
            ("20220605T201150,887123+0200", 1_654_452_710_887_123_000),
            ("2022-06-05 18:11:50.887123", 1_654_452_710_887_123_000),
            ("2022-06-05T18:11Z", 1_654_452_660_000_000_000),
            ("20220605T1811", 1_654_452_660_000_000_000),
            ("2022-06-05T18Z", 1_654_452_000_000_000_000),
            ("2022-06-05T19+01", 1_654_452_000_000_000_000),
            ("2022-06-05", 1_654_387_200_000_000_000),
            ("20220605", 1_654_387_200_000_000_000),
        ];
        for (text, expected) in cases {
            assert_eq!(iso8601_to_unix_nanos(text), Ok(expected), "{}", text);
        }
    }

    #[test]
    fn test_timestamp_rejects_malformed() {
        for text in [
            "",
            "2022-06-05T",
            "2022-06-05T25:00Z",
            "2022-06-05T18:11:50Z+01",
            "2022-06-05T18:11:50+2:00",
            "2022-06-05T18:11:50+24:00",
            "2022-13-05",
            "2022-06-05Z",
            "2022-06-05T18:11:50+0é0",
        ] {
            assert!(iso8601_to_unix_nanos(text).is_err(), "{}", text);
        }
    }

    #[test]
    fn test_timestamp_round_trip() {
        for nanos in [0_u64, 1, 1_654_452_710_887_123_456, 1_700_000_000_999_999_999] {
            let secs = (nanos / 1_000_000_000) as i64;
            let subsec = (nanos % 1_000_000_000) as u32;
            let text = DateTime::from_timestamp(secs, subsec)
                .unwrap()
                .to_rfc3339_opts(SecondsFormat::Nanos, true);
            assert_eq!(iso8601_to_unix_nanos(&text).unwrap(), nanos);
        }
    }
}

//! Transport envelope handling.
//!
//! CloudWatch Logs subscriptions deliver to Kinesis, and each Kinesis record
//! carries one gzip-compressed, base64-encoded subscription document in its
//! `data` field. The record is deserialized with `data` kept as text so a single
//! corrupt record cannot fail deserialization of the whole event.

use base64::{Engine, engine::general_purpose};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::error::DecompressionError;

/// Kinesis event as delivered to the function.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransportEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<TransportRecord>,
}

/// One Kinesis record: one unit of decompression work.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRecord {
    pub kinesis: KinesisData,
    #[serde(default, rename = "eventID")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub event_source: Option<String>,
    #[serde(default, rename = "eventSourceARN")]
    pub event_source_arn: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisData {
    /// base64(gzip(subscription document))
    pub data: String,
    #[serde(default)]
    pub partition_key: Option<String>,
    #[serde(default)]
    pub sequence_number: Option<String>,
}

/// Output of [`decompress_records`].
#[derive(Debug, Default)]
pub struct Decompressed {
    /// Decoded documents, in record order.
    pub batches: Vec<String>,
    /// Records that failed base64, gzip or UTF-8 decoding.
    pub failed: usize,
}

/// Unwraps a single envelope into the batch text it carries.
pub fn decode_record(data: &str) -> Result<String, DecompressionError> {
    let compressed = general_purpose::STANDARD.decode(data.trim())?;

    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;

    Ok(String::from_utf8(decompressed)?)
}

/// Decodes every record independently. Failed records are dropped and counted.
pub fn decompress_records(records: &[TransportRecord]) -> Decompressed {
    let mut output = Decompressed::default();

    for record in records {
        match decode_record(&record.kinesis.data) {
            Ok(batch) => output.batches.push(batch),
            Err(e) => {
                tracing::warn!(
                    sequence_number = record.kinesis.sequence_number.as_deref().unwrap_or("unknown"),
                    "Failed to decompress transport record: {}",
                    e
                );
                output.failed += 1;
            }
        }
    }

    if output.batches.is_empty() && output.failed > 0 {
        tracing::warn!(
            "None of {} transport records could be decompressed",
            output.failed
        );
    }

    output
}


#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_record() {
        let encoded = encode_envelope(r#"{"logEvents":[]}"#);
        assert_eq!(decode_record(&encoded).unwrap(), r#"{"logEvents":[]}"#);
    }

    #[test]
    fn test_decode_record_invalid_base64() {
        let result = decode_record("this is *not* base64!");
        assert!(matches!(result, Err(DecompressionError::Base64(_))));
    }

    #[test]
    fn test_decode_record_not_gzip() {
        let plain = general_purpose::STANDARD.encode(b"plain text, no gzip header");
        let result = decode_record(&plain);
        assert!(matches!(result, Err(DecompressionError::Gzip(_))));
    }

    #[test]
    fn test_decompress_records_skips_bad_records() {
        let records = vec![
            transport_record(encode_envelope("first")),
            transport_record("%%%".to_string()),
            transport_record(encode_envelope("third")),
        ];

        let output = decompress_records(&records);
        assert_eq!(output.batches, vec!["first", "third"]);
        assert_eq!(output.failed, 1);
    }

    #[test]
    fn test_transport_event_deserialization() {
        let event = json!({
            "Records": [{
                "kinesis": {
                    "kinesisSchemaVersion": "1.0",
                    "partitionKey": "abc",
                    "sequenceNumber": "49590338271490256608559692538361571095921575989136588898",
                    "data": "H4sIAAAAAAAAAA==",
                    "approximateArrivalTimestamp": 1654452711.123
                },
                "eventSource": "aws:kinesis",
                "eventVersion": "1.0",
                "eventID": "shardId-000000000006:4959",
                "eventName": "aws:kinesis:record",
                "awsRegion": "eu-west-1",
                "eventSourceARN": "arn:aws:kinesis:eu-west-1:123456789012:stream/spans"
            }]
        });

        let event: TransportEvent = serde_json::from_value(event).unwrap();
        assert_eq!(event.records.len(), 1);
        let record = &event.records[0];
        assert_eq!(record.kinesis.data, "H4sIAAAAAAAAAA==");
        assert_eq!(record.kinesis.partition_key.as_deref(), Some("abc"));
        assert_eq!(
            record.event_source_arn.as_deref(),
            Some("arn:aws:kinesis:eu-west-1:123456789012:stream/spans")
        );
    }
}

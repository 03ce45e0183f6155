//! CloudWatch Logs subscription documents.
//!
//! A decompressed envelope looks like:
//!
//! ```json
//! {
//!     "messageType": "DATA_MESSAGE",
//!     "owner": "123456789012",
//!     "logGroup": "/aws/lambda/thumbnail-function",
//!     "logStream": "2022/06/05/[$LATEST]6a7be0ba512e4126be8327ea0ff4e6bc",
//!     "subscriptionFilters": ["spans"],
//!     "logEvents": [
//!         { "id": "3689552834850923846759925598", "timestamp": 1654452710887, "message": "..." }
//!     ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::BatchParseError;

/// `messageType` of the health-check batches CloudWatch sends when a
/// subscription is created.
pub const CONTROL_MESSAGE_TYPE: &str = "CONTROL_MESSAGE";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogBatch {
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub log_group: Option<String>,
    #[serde(default)]
    pub log_stream: Option<String>,
    #[serde(default)]
    pub subscription_filters: Vec<String>,
    pub log_events: Vec<LogEvent>,
}

/// One log line.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: i64,
    pub message: String,
}

impl LogBatch {
    pub fn is_control_message(&self) -> bool {
        self.message_type.as_deref() == Some(CONTROL_MESSAGE_TYPE)
    }

    /// Message strings in delivery order. Control batches carry none.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        let events = if self.is_control_message() {
            &[][..]
        } else {
            &self.log_events[..]
        };
        events.iter().map(|event| event.message.as_str())
    }
}

/// Parses one decompressed document.
pub fn unpack_batch(text: &str) -> Result<LogBatch, BatchParseError> {
    let batch: LogBatch = serde_json::from_str(text)?;

    tracing::debug!(
        "Unpacked {} log events from log group: {}",
        batch.log_events.len(),
        batch.log_group.as_deref().unwrap_or("unknown")
    );

    Ok(batch)
}

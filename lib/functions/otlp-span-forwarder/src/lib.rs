pub mod app_state;
pub mod attributes;
pub mod batch;
pub mod config;
pub mod envelope;
pub mod error;
pub mod headers;
pub mod pipeline;
pub mod processing;
pub mod resource;
pub mod span;
pub mod telemetry;

// Re-export commonly used types
pub use app_state::AppState;
pub use config::ForwarderConfig;
pub use envelope::{TransportEvent, TransportRecord};
pub use error::{
    BatchParseError, ConfigError, DecompressionError, DeliveryError, TransformError,
};
pub use headers::ExportHeaders;
pub use pipeline::{RunSummary, collect_spans, run};
pub use processing::send_telemetry;
pub use resource::{Resource, ResourceAggregator, ResourceGroup};
pub use span::{CanonicalSpan, transform};
pub use telemetry::TelemetryData;

//! Grouping of spans by the service that produced them.
//!
//! OTLP carries one resource block per group of spans, so spans from the same
//! service are collected under a single [`ResourceGroup`].

use serde::Serialize;
use std::collections::HashMap;

use crate::attributes::KeyValue;
use crate::span::CanonicalSpan;

pub const SERVICE_NAME_KEY: &str = "service.name";
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Identity of the process that produced a span.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Resource {
    pub attributes: Vec<KeyValue>,
}

impl Resource {
    /// The `service.name` attribute as text, or `"unknown"`.
    pub fn service_name(&self) -> String {
        self.attributes
            .iter()
            .find(|kv| kv.key == SERVICE_NAME_KEY)
            .map(|kv| kv.value.to_text())
            .unwrap_or_else(|| UNKNOWN_SERVICE.to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceGroup {
    pub service_name: String,
    pub resource: Resource,
    pub spans: Vec<CanonicalSpan>,
}

/// Per-run accumulator. Groups keep first-seen order, spans keep arrival order.
#[derive(Debug, Default)]
pub struct ResourceAggregator {
    groups: Vec<ResourceGroup>,
    index: HashMap<String, usize>,
}

impl ResourceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a span to its service's group.
    ///
    /// The first resource seen for a service name is the one recorded for the
    /// group; later resources with the same name are not merged in.
    pub fn push(&mut self, resource: Resource, span: CanonicalSpan) {
        let service_name = resource.service_name();

        let position = match self.index.get(&service_name) {
            Some(&position) => position,
            None => {
                tracing::debug!("New resource group for service: {}", service_name);
                self.groups.push(ResourceGroup {
                    service_name: service_name.clone(),
                    resource,
                    spans: Vec::new(),
                });
                self.index.insert(service_name, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        self.groups[position].spans.push(span);
    }

    pub fn get(&self, service_name: &str) -> Option<&ResourceGroup> {
        self.index
            .get(service_name)
            .map(|&position| &self.groups[position])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn span_count(&self) -> usize {
        self.groups.iter().map(|group| group.spans.len()).sum()
    }

    pub fn into_groups(self) -> Vec<ResourceGroup> {
        self.groups
    }
}

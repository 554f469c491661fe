//! Event serializers
//!
//! The writer is generic over how an event becomes bytes. `LogEventSerializer`
//! produces the JSON layout the intake expects for log lines; `JsonSerializer`
//! is a plain serde fallback for any other event type.

use std::collections::HashSet;
use std::marker::PhantomData;

use chrono::{TimeZone, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::SpoolResult;
use crate::types::LogEvent;

/// Turns an event into the bytes that get encoded and stored
pub trait EventSerializer<E>: Send + Sync {
    fn serialize(&self, event: &E) -> SpoolResult<Vec<u8>>;
}

/// Serializes any `Serialize` type as compact JSON
pub struct JsonSerializer<E> {
    _marker: PhantomData<fn(&E)>,
}

impl<E> JsonSerializer<E> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for JsonSerializer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Serialize> EventSerializer<E> for JsonSerializer<E> {
    fn serialize(&self, event: &E) -> SpoolResult<Vec<u8>> {
        Ok(serde_json::to_vec(event)?)
    }
}

pub const TAG_MESSAGE: &str = "message";
pub const TAG_SERVICE_NAME: &str = "service";
pub const TAG_STATUS: &str = "status";
pub const TAG_DATE: &str = "date";
pub const TAG_NETWORK: &str = "network";
pub const TAG_TAGS: &str = "ddtags";
pub const TAG_ERROR_KIND: &str = "error.kind";
pub const TAG_ERROR_MESSAGE: &str = "error.message";
pub const TAG_ERROR_STACK: &str = "error.stack";

const RESERVED_ATTRIBUTES: [&str; 9] = [
    TAG_MESSAGE,
    TAG_SERVICE_NAME,
    TAG_STATUS,
    TAG_DATE,
    TAG_NETWORK,
    TAG_TAGS,
    TAG_ERROR_KIND,
    TAG_ERROR_MESSAGE,
    TAG_ERROR_STACK,
];

/// ISO-8601 with milliseconds and a numeric offset
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Serializes [`LogEvent`]s into intake JSON
pub struct LogEventSerializer {
    reserved: HashSet<&'static str>,
}

impl LogEventSerializer {
    pub fn new() -> Self {
        Self {
            reserved: RESERVED_ATTRIBUTES.into_iter().collect(),
        }
    }

    /// Build the JSON object for one event
    pub fn to_json(&self, event: &LogEvent) -> Value {
        let mut root = Map::new();

        root.insert(TAG_MESSAGE.to_string(), json!(event.message));
        root.insert(TAG_SERVICE_NAME.to_string(), json!(event.service_name));
        root.insert(TAG_STATUS.to_string(), json!(event.level.status_name()));

        if let Some(date) = event.timestamp_millis.and_then(format_date) {
            root.insert(TAG_DATE.to_string(), json!(date));
        }

        if let Some(info) = &event.network {
            let mut client = Map::new();
            client.insert("connectivity".to_string(), json!(info.connectivity));
            if let Some(name) = info.carrier_name.as_deref().filter(|n| !n.trim().is_empty()) {
                client.insert("sim_carrier.name".to_string(), json!(name));
            }
            if let Some(id) = info.carrier_id.filter(|id| *id >= 0) {
                client.insert("sim_carrier.id".to_string(), json!(id));
            }
            root.insert(TAG_NETWORK.to_string(), json!({ "client": client }));
        }

        for (key, value) in &event.attributes {
            if key.trim().is_empty() || self.reserved.contains(key.as_str()) {
                continue;
            }
            root.insert(key.clone(), value.clone());
        }

        root.insert(TAG_TAGS.to_string(), json!(event.tags.join(",")));

        if let Some(error) = &event.error {
            root.insert(TAG_ERROR_KIND.to_string(), json!(error.kind));
            root.insert(TAG_ERROR_MESSAGE.to_string(), json!(error.message));
            root.insert(TAG_ERROR_STACK.to_string(), json!(error.stack));
        }

        Value::Object(root)
    }
}

impl Default for LogEventSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSerializer<LogEvent> for LogEventSerializer {
    fn serialize(&self, event: &LogEvent) -> SpoolResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_json(event))?)
    }
}

fn format_date(millis: i64) -> Option<String> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format(DATE_FORMAT).to_string())
}

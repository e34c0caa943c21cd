use crate::models::{HostRecord, ServiceEntry};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Rejection of a single raw host document, naming the offending field.
/// Captured into that host's result by the dispatcher, never fatal to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid field '{field}': {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for crate::models::ErrorInfo {
    fn from(error: ValidationError) -> Self {
        crate::models::ErrorInfo {
            kind: "validation".to_string(),
            message: error.to_string(),
        }
    }
}

/// Validate and normalize one raw host document into a [`HostRecord`].
///
/// Policy for malformed service entries is strict-reject-record: a single bad
/// entry (missing or out-of-range port, non-string descriptive field) rejects
/// the whole host with a field-scoped error, rather than being dropped
/// silently.
pub fn normalize_host(raw: &Value) -> Result<HostRecord, ValidationError> {
    let object = raw
        .as_object()
        .ok_or_else(|| ValidationError::new("host", "host record must be a JSON object"))?;

    let ip = match object.get("ip") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::String(_)) | None => return Err(ValidationError::new("ip", "ip required")),
        Some(_) => return Err(ValidationError::new("ip", "ip must be a string")),
    };

    let services = match object.get("services") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => {
            let mut services = Vec::with_capacity(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                services.push(normalize_service(index, entry)?);
            }
            services
        }
        Some(_) => {
            return Err(ValidationError::new(
                "services",
                "services must be an array",
            ))
        }
    };

    // Everything else travels along as prompt context instead of being
    // discarded.
    let mut metadata = BTreeMap::new();
    for (key, value) in object {
        if key == "ip" || key == "services" || value.is_null() {
            continue;
        }
        metadata.insert(key.clone(), stringify(value));
    }

    Ok(HostRecord {
        ip,
        services,
        metadata,
    })
}

fn normalize_service(index: usize, entry: &Value) -> Result<ServiceEntry, ValidationError> {
    let object = entry.as_object().ok_or_else(|| {
        ValidationError::new(
            format!("services[{}]", index),
            "service entry must be a JSON object",
        )
    })?;

    let port_field = format!("services[{}].port", index);
    let port = match object.get("port") {
        Some(Value::Number(n)) => n
            .as_u64()
            .filter(|p| *p <= u64::from(u16::MAX))
            .ok_or_else(|| {
                ValidationError::new(port_field, "port must be an integer between 0 and 65535")
            })? as u16,
        Some(Value::String(s)) => s.trim().parse::<u16>().map_err(|_| {
            ValidationError::new(port_field, "port must be an integer between 0 and 65535")
        })?,
        Some(_) => {
            return Err(ValidationError::new(
                port_field,
                "port must be an integer between 0 and 65535",
            ))
        }
        None => return Err(ValidationError::new(port_field, "port required")),
    };

    Ok(ServiceEntry {
        port,
        protocol: optional_string(object, index, "protocol")?,
        software: optional_string(object, index, "software")?,
        version: optional_string(object, index, "version")?,
        banner: optional_string(object, index, "banner")?,
    })
}

fn optional_string(
    object: &Map<String, Value>,
    index: usize,
    name: &str,
) -> Result<Option<String>, ValidationError> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(_) => Err(ValidationError::new(
            format!("services[{}].{}", index, name),
            "must be a string",
        )),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One open service observed on a scanned host. Only `port` is mandatory;
/// the descriptive fields are kept when the scan provided them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub port: u16,
    pub protocol: Option<String>,
    pub software: Option<String>,
    pub version: Option<String>,
    pub banner: Option<String>,
}

/// Canonical in-memory form of a scanned host, produced by the normalizer.
///
/// `metadata` holds every top-level field of the raw document that is not
/// `ip` or `services`, stringified. A BTreeMap keeps key order stable so the
/// prompt built from a record is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub ip: String,
    pub services: Vec<ServiceEntry>,
    pub metadata: BTreeMap<String, String>,
}

/// Which summarization backend a request asked for. Fixed per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerChoice {
    Remote,
    Local,
}

impl SummarizerChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummarizerChoice::Remote => "remote",
            SummarizerChoice::Local => "local",
        }
    }
}

impl fmt::Display for SummarizerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummarizerChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(SummarizerChoice::Remote),
            "local" => Ok(SummarizerChoice::Local),
            other => Err(format!(
                "unknown summarizer '{}', expected 'remote' or 'local'",
                other
            )),
        }
    }
}

/// Serialized error detail attached to a failed per-host result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
}

/// Outcome for a single host: either a summary or an error, never both.
/// The private fields plus the `ok`/`failed` constructors enforce that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub host_ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
}

impl SummaryResult {
    pub fn ok(host_ip: impl Into<String>, summary_text: impl Into<String>) -> Self {
        Self {
            host_ip: host_ip.into(),
            summary_text: Some(summary_text.into()),
            error: None,
        }
    }

    pub fn failed(host_ip: impl Into<String>, error: ErrorInfo) -> Self {
        Self {
            host_ip: host_ip.into(),
            summary_text: None,
            error: Some(error),
        }
    }

    pub fn summary_text(&self) -> Option<&str> {
        self.summary_text.as_deref()
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.summary_text.is_some()
    }
}

/// Wire shape of a batch request. Hosts arrive as raw JSON documents and are
/// normalized one by one inside the dispatcher, so one malformed host cannot
/// reject the whole batch at the deserialization boundary.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub hosts: Vec<serde_json::Value>,
    pub summarizer: SummarizerChoice,
}

/// Wire shape of a batch response. `results[i]` corresponds to `hosts[i]` of
/// the request, same length and order.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub summarizer_used: SummarizerChoice,
    pub results: Vec<SummaryResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_result_is_success_xor_failure() {
        let ok = SummaryResult::ok("10.0.0.1", "fine");
        assert!(ok.summary_text().is_some());
        assert!(ok.error().is_none());

        let failed = SummaryResult::failed(
            "10.0.0.2",
            ErrorInfo {
                kind: "validation".into(),
                message: "ip required".into(),
            },
        );
        assert!(failed.summary_text().is_none());
        assert!(failed.error().is_some());
    }

    #[test]
    fn summarizer_choice_parses_known_values_only() {
        assert_eq!(
            "remote".parse::<SummarizerChoice>(),
            Ok(SummarizerChoice::Remote)
        );
        assert_eq!(
            "local".parse::<SummarizerChoice>(),
            Ok(SummarizerChoice::Local)
        );
        assert!("huggingface".parse::<SummarizerChoice>().is_err());
        assert!("Remote".parse::<SummarizerChoice>().is_err());
    }

    #[test]
    fn summarizer_choice_wire_format_is_lowercase() {
        let request: BatchRequest = serde_json::from_value(serde_json::json!({
            "hosts": [{"ip": "1.2.3.4"}],
            "summarizer": "local"
        }))
        .unwrap();
        assert_eq!(request.summarizer, SummarizerChoice::Local);

        let unknown = serde_json::from_value::<BatchRequest>(serde_json::json!({
            "hosts": [{"ip": "1.2.3.4"}],
            "summarizer": "unknown"
        }));
        assert!(unknown.is_err());
    }

    #[test]
    fn failed_result_omits_summary_field_on_the_wire() {
        let failed = SummaryResult::failed(
            "10.0.0.2",
            ErrorInfo {
                kind: "network_error".into(),
                message: "connection refused".into(),
            },
        );
        let json = serde_json::to_value(&failed).unwrap();
        assert!(json.get("summary_text").is_none());
        assert_eq!(json["error"]["kind"], "network_error");
    }
}

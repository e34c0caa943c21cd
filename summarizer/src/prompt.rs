use crate::models::{HostRecord, ServiceEntry};

const PREAMBLE: &str =
    "You are a cybersecurity analyst reviewing internet scan data for a single host.";

const COVERAGE: &str = "Cover exactly these five areas: identifying information, \
open services and ports, software versions, security observations, \
and anything notable about the host configuration.";

const LENGTH_CONSTRAINT: &str = "Respond in 2 to 3 sentences.";

/// Build the summarization prompt for one normalized host record.
///
/// Pure and deterministic: identical records produce byte-identical prompts,
/// and every strategy consumes the same template. Fixed section order:
/// role preamble, structured host facts (only non-empty fields, services in
/// list order, metadata in key order), coverage instruction, length
/// constraint.
pub fn build_prompt(record: &HostRecord) -> String {
    let mut prompt = String::new();
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");

    prompt.push_str(&format!("Host IP: {}\n", record.ip));
    for (index, service) in record.services.iter().enumerate() {
        prompt.push_str(&format!(
            "Service {}: {}\n",
            index + 1,
            describe_service(service)
        ));
    }
    for (key, value) in &record.metadata {
        prompt.push_str(&format!("Metadata {}: {}\n", key, value));
    }

    prompt.push('\n');
    prompt.push_str(COVERAGE);
    prompt.push('\n');
    prompt.push_str(LENGTH_CONSTRAINT);
    prompt
}

fn describe_service(service: &ServiceEntry) -> String {
    let mut parts = vec![format!("port {}", service.port)];
    if let Some(protocol) = &service.protocol {
        parts.push(format!("protocol {}", protocol));
    }
    if let Some(software) = &service.software {
        parts.push(format!("software {}", software));
    }
    if let Some(version) = &service.version {
        parts.push(format!("version {}", version));
    }
    if let Some(banner) = &service.banner {
        parts.push(format!("banner {:?}", banner));
    }
    parts.join(", ")
}

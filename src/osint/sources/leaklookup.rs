// src/osint/sources/leaklookup.rs
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::core::{Target, TargetKind};
use crate::error::{LeakerError, LeakerResult};
use crate::osint::{flatten_fields, Credentials, FindingSender, LeakSource};
use crate::utils::Session;

const API_URL: &str = "https://leak-lookup.com/api/search";
const FIELDS: &[&str] = &[
    "email_address",
    "email",
    "username",
    "password",
    "hash",
    "phone",
    "ip_address",
    "fullname",
];

/// Leak-Lookup search API
#[derive(Default)]
pub struct LeakLookup {
    credentials: Credentials,
}

impl LeakLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upstream has no phone lookup; an empty type lets the API decide
    fn search_type(kind: TargetKind) -> &'static str {
        match kind {
            TargetKind::Email => "email_address",
            TargetKind::Username => "username",
            TargetKind::Domain => "domain",
            TargetKind::Keyword => "password",
            TargetKind::Phone => "",
        }
    }
}

/// `message` is either an error string or a map of breach name to records.
///
/// Public keys only get breach names back, so an empty record list still
/// reports the breach.
fn parse_response(body: &str) -> LeakerResult<Vec<String>> {
    let response: Value = serde_json::from_str(body)?;

    if response.get("error").and_then(Value::as_str) == Some("true") {
        let message = match response.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => "unknown error".to_string(),
        };
        return Err(LeakerError::source_error("leaklookup", message));
    }

    let Some(breaches) = response.get("message").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let mut values = Vec::new();
    for (breach, records) in breaches {
        let records = match records.as_array() {
            Some(records) if !records.is_empty() => records,
            _ => {
                values.push(format!("breach:{}", breach));
                continue;
            }
        };

        for record in records.iter().filter_map(Value::as_object) {
            let mut parts = vec![format!("breach:{}", breach)];
            parts.extend(flatten_fields(record, FIELDS));
            values.push(parts.join(", "));
        }
    }

    Ok(values)
}

#[async_trait]
impl LeakSource for LeakLookup {
    fn name(&self) -> &'static str {
        "leaklookup"
    }

    fn add_credentials(&mut self, credentials: Vec<String>) {
        self.credentials = Credentials::from_raw(credentials);
    }

    fn rate_limit(&self) -> u32 {
        1
    }

    async fn search(&self, target: &Target, session: &Session, results: &FindingSender) -> LeakerResult<()> {
        let Some(api_key) = self.credentials.pick(self.name()) else {
            return Ok(());
        };

        let request = session.post(API_URL).form(&[
            ("key", api_key.as_str()),
            ("type", Self::search_type(target.kind())),
            ("query", target.value()),
        ]);

        debug!("Sending a request in Leak-Lookup source for {}", target);
        let response = session.execute(self.name(), request).await?.ensure_ok(self.name())?;

        results.emit_all(parse_response(&response.body)?).await
    }
}

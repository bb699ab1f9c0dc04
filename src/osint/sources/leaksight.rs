// src/osint/sources/leaksight.rs
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::core::{Target, TargetKind};
use crate::error::LeakerResult;
use crate::osint::{flatten_fields, Credentials, FindingSender, LeakSource};
use crate::utils::Session;

const API_URL: &str = "https://api.leaksight.com/osint";
const COMBO_FIELDS: &[&str] = &["host", "user", "pass", "path"];
const RECORD_FIELDS: &[&str] = &["email", "username", "user", "password", "pass", "host", "url"];
const SECTIONS: &[&str] = &["stealer_json", "database_url", "bigcomboCombolist"];

/// LeakSight OSINT API
#[derive(Default)]
pub struct LeakSight {
    credentials: Credentials,
}

impl LeakSight {
    pub fn new() -> Self {
        Self::default()
    }

    fn endpoint(kind: TargetKind) -> &'static str {
        match kind {
            TargetKind::Email | TargetKind::Username => "username",
            TargetKind::Domain => "url",
            TargetKind::Keyword => "password",
            TargetKind::Phone => "number",
        }
    }
}

/// Either a flat `success` array of combo rows, or one array per section
fn parse_response(body: &str) -> LeakerResult<Vec<String>> {
    let response: Value = serde_json::from_str(body)?;
    let mut values = Vec::new();

    if let Some(rows) = response.get("success").and_then(Value::as_array) {
        for row in rows.iter().filter_map(Value::as_object) {
            let parts = flatten_fields(row, COMBO_FIELDS);
            if !parts.is_empty() {
                values.push(parts.join(", "));
            }
        }
        return Ok(values);
    }

    for section in SECTIONS {
        let Some(items) = response.get(*section).and_then(Value::as_array) else {
            continue;
        };

        for item in items {
            match item {
                Value::Object(record) => {
                    let mut parts = vec![format!("source:{}", section)];
                    parts.extend(flatten_fields(record, RECORD_FIELDS));
                    if parts.len() > 1 {
                        values.push(parts.join(", "));
                    }
                }
                Value::String(line) if !line.is_empty() => values.push(format!("{}:{}", section, line)),
                _ => {}
            }
        }
    }

    Ok(values)
}

#[async_trait]
impl LeakSource for LeakSight {
    fn name(&self) -> &'static str {
        "leaksight"
    }

    fn add_credentials(&mut self, credentials: Vec<String>) {
        self.credentials = Credentials::from_raw(credentials);
    }

    fn rate_limit(&self) -> u32 {
        2
    }

    async fn search(&self, target: &Target, session: &Session, results: &FindingSender) -> LeakerResult<()> {
        let Some(token) = self.credentials.pick(self.name()) else {
            return Ok(());
        };

        let url = format!("{}/{}", API_URL, Self::endpoint(target.kind()));
        let request = session
            .get(url)
            .query(&[("token", token.as_str()), ("text", target.value())]);

        debug!("Sending a request in LeakSight source for {}", target);
        let response = session.execute(self.name(), request).await?.ensure_ok(self.name())?;

        results.emit_all(parse_response(&response.body)?).await
    }
}
